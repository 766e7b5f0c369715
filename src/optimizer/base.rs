/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 底层优化器 trait 与参数组、状态字典
 *
 * 数值更新规则（SGD、Adam 等）由调用方实现，本模块只定义封装层依赖的接口。
 */

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::OptimError;

/// 参数组：共享同一学习率的一组参数
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGroup<P> {
    /// 组名（来自学习率倍率规则），整体分组时为 `None`
    pub name: Option<String>,
    /// 组内参数句柄
    pub params: Vec<P>,
    /// 当前学习率
    pub lr: f64,
    /// 创建时的基础学习率（未乘倍率；无学习率策略时，倍率以它为基准）
    pub initial_lr: f64,
}

impl<P> ParamGroup<P> {
    pub const fn new(params: Vec<P>, lr: f64) -> Self {
        Self {
            name: None,
            params,
            lr,
            initial_lr: lr,
        }
    }

    pub fn named(name: impl Into<String>, params: Vec<P>, lr: f64) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(params, lr)
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// 单个参数组的可序列化状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGroupState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub lr: f64,
    pub initial_lr: f64,
    pub num_params: usize,
}

/// 优化器状态字典
///
/// `state` 存放具体优化器自己的缓冲区（如动量），键由实现方决定。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDict {
    pub param_groups: Vec<ParamGroupState>,
    #[serde(default)]
    pub state: BTreeMap<String, Value>,
}

impl StateDict {
    pub fn from_groups<P>(groups: &[ParamGroup<P>]) -> Self {
        let param_groups = groups
            .iter()
            .map(|g| ParamGroupState {
                name: g.name.clone(),
                lr: g.lr,
                initial_lr: g.initial_lr,
                num_params: g.len(),
            })
            .collect();
        Self {
            param_groups,
            state: BTreeMap::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), OptimError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptimError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// 底层优化器 trait（PyTorch 风格）
///
/// # 使用示例
/// ```ignore
/// // 训练循环（由封装层转发）
/// optimizer.zero_grad()?;
/// // ... 调用方计算梯度 ...
/// optimizer.step()?;
/// ```
pub trait Optimizer<P> {
    /// 清零所有参数的梯度
    fn zero_grad(&mut self) -> Result<(), OptimError>;

    /// 更新参数
    fn step(&mut self) -> Result<(), OptimError>;

    /// 参数组（只读）
    fn param_groups(&self) -> &[ParamGroup<P>];

    /// 参数组（可写，学习率调度通过它修改各组学习率）
    fn param_groups_mut(&mut self) -> &mut [ParamGroup<P>];

    /// 导出状态字典
    ///
    /// 默认只包含参数组信息；有内部缓冲区的优化器应覆盖此方法并填充 `state`。
    fn state_dict(&self) -> StateDict {
        StateDict::from_groups(self.param_groups())
    }

    /// 从状态字典恢复
    ///
    /// 默认恢复各组学习率；组数或组内参数数量不一致时报错且不做修改。
    fn load_state_dict(&mut self, state_dict: &StateDict) -> Result<(), OptimError> {
        let groups = self.param_groups_mut();
        if groups.len() != state_dict.param_groups.len() {
            return Err(OptimError::GroupCountMismatch {
                expected: groups.len(),
                got: state_dict.param_groups.len(),
            });
        }
        if let Some((g, s)) = groups
            .iter()
            .zip(&state_dict.param_groups)
            .find(|(g, s)| g.len() != s.num_params)
        {
            return Err(OptimError::InvalidConfig(format!(
                "参数组`{}`的参数数量不一致：当前{}个，状态字典中{}个",
                g.name.as_deref().unwrap_or("default"),
                g.len(),
                s.num_params
            )));
        }
        for (g, s) in groups.iter_mut().zip(&state_dict.param_groups) {
            g.lr = s.lr;
            g.initial_lr = s.initial_lr;
        }
        Ok(())
    }

    /// 获取学习率（第一个参数组的学习率）
    fn learning_rate(&self) -> Option<f64> {
        self.param_groups().first().map(|g| g.lr)
    }

    /// 设置学习率（所有参数组）
    fn set_learning_rate(&mut self, lr: f64) {
        for group in self.param_groups_mut() {
            group.lr = lr;
        }
    }
}
