/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 优化器注册表与构建入口
 *
 * 每个任务（track / vos）各有一张注册表：优化器名称 → 默认超参 + 底层优化器工厂。
 * build() 读取配置节点，完成“创建封装 → 设置超参 → 设置模型 → 构建策略 → 分组 → 构造底层优化器”全流程。
 */


use std::collections::BTreeMap;
use std::fmt::{self, Display};

use log::info;
use serde_json::{Map, Value};

use crate::config::{ConfigNode, HyperParams};
use crate::errors::OptimError;
use crate::optimizer::{OptimizerWrapper, ParamGroup, SharedModule, SharedOptimizer};

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Task {
    /// 单目标跟踪
    Track,
    /// 视频目标分割
    Vos,
}

impl Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Track => "track",
            Self::Vos => "vos",
        };
        write!(f, "{name}")
    }
}

/// 底层优化器工厂：参数组 + 超参 → 底层优化器
pub type OptimizerFactory<P> =
    Box<dyn Fn(Vec<ParamGroup<P>>, &HyperParams) -> Result<SharedOptimizer<P>, OptimError>>;

/// 一种已注册的优化器
pub struct OptimizerKind<P> {
    name: String,
    default_hyper_params: HyperParams,
    factory: OptimizerFactory<P>,
}

impl<P> fmt::Debug for OptimizerKind<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizerKind")
            .field("name", &self.name)
            .field("default_hyper_params", &self.default_hyper_params)
            .finish_non_exhaustive()
    }
}

impl<P> OptimizerKind<P> {
    pub fn new(
        name: impl Into<String>,
        default_hyper_params: HyperParams,
        factory: OptimizerFactory<P>,
    ) -> Self {
        Self {
            name: name.into(),
            default_hyper_params,
            factory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn default_hyper_params(&self) -> &HyperParams {
        &self.default_hyper_params
    }
}

/// 按任务划分的优化器注册表
pub struct OptimizerRegistry<P> {
    tasks: BTreeMap<Task, BTreeMap<String, OptimizerKind<P>>>,
}

impl<P> Default for OptimizerRegistry<P> {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
        }
    }
}

impl<P> OptimizerRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: Task, kind: OptimizerKind<P>) -> Result<(), OptimError> {
        let kinds = self.tasks.entry(task).or_default();
        if kinds.contains_key(kind.name()) {
            return Err(OptimError::DuplicateOptimizer(kind.name));
        }
        kinds.insert(kind.name.clone(), kind);
        Ok(())
    }

    pub fn get(&self, task: Task, name: &str) -> Result<&OptimizerKind<P>, OptimError> {
        self.tasks
            .get(&task)
            .and_then(|kinds| kinds.get(name))
            .ok_or_else(|| OptimError::UnknownOptimizer(format!("{task}/{name}")))
    }

    /// 某任务下已注册的优化器名称（按名称排序）
    pub fn names(&self, task: Task) -> Vec<&str> {
        self.tasks
            .get(&task)
            .map(|kinds| kinds.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// 某任务的默认配置节点：`{"name": "", <优化器名>: <完整默认超参>, ...}`
pub fn get_config<P: Clone + 'static>(
    registry: &OptimizerRegistry<P>,
    task: Task,
) -> ConfigNode {
    let mut node = Map::new();
    node.insert("name".to_string(), Value::String(String::new()));
    if let Some(kinds) = registry.tasks.get(&task) {
        for (name, kind) in kinds {
            let mut hps = OptimizerWrapper::<P>::default_hyper_params();
            hps.merge(kind.default_hyper_params());
            let hps: Map<String, Value> = hps
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            node.insert(name.clone(), Value::Object(hps));
        }
    }
    ConfigNode::new(Value::Object(node))
}

/// 按配置构建优化器封装，并挂接构造好的底层优化器
///
/// # 参数
/// - `task`: 任务类型
/// - `cfg`: 优化器配置节点（含`name`与同名超参子节点）
/// - `model`: 待优化的模型
/// - `registry`: 优化器注册表
pub fn build<P: Clone + 'static>(
    task: Task,
    cfg: &ConfigNode,
    model: SharedModule<P>,
    registry: &OptimizerRegistry<P>,
) -> Result<OptimizerWrapper<P>, OptimError> {
    let name = cfg.name()?;
    let kind = registry.get(task, name)?;

    let mut wrapper = OptimizerWrapper::with_defaults(cfg.clone(), kind.default_hyper_params());
    if let Some(node) = cfg.child(name) {
        wrapper.set_hps(&node.to_hyper_params()?)?;
    }
    wrapper.set_model(model);
    wrapper.update_params()?;
    wrapper.build_optimizer()?;

    let groups = wrapper.take_param_groups().unwrap_or_default();
    let optimizer = (kind.factory)(groups, wrapper.get_hps())?;
    wrapper.set_optimizer(optimizer);
    info!("已构建优化器`{task}/{name}`");
    Ok(wrapper)
}
