/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 配置驱动的优化器封装
 *
 * 核心特性：
 * - 超参表由默认值确定键集合，set_hps 拒绝未注册的键
 * - update_params 按超参懒构建学习率策略与分组学习率倍率
 * - build_optimizer 计算交给底层优化器的参数组
 * - zero_grad / step / state_dict 原样转发给底层优化器
 * - 模型与底层优化器都由调用方持有，这里只保存 Rc<RefCell<..>> 句柄
 */

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use serde::Serialize;
use serde_json::json;

use super::{Optimizer, ParamGroup, StateDict};
use crate::config::{ConfigNode, HyperParams};
use crate::errors::OptimError;
use crate::lr_multiplier::{self, LrMultiplier};
use crate::lr_policy::{self, LrPolicy, LrSchedule};
use crate::module::Module;

/// 模型句柄（调用方持有）
pub type SharedModule<P> = Rc<RefCell<dyn Module<P>>>;
/// 底层优化器句柄（调用方持有）
pub type SharedOptimizer<P> = Rc<RefCell<dyn Optimizer<P>>>;

/// 由超参懒构建的内部状态，各项均可能缺失
#[derive(Debug)]
pub struct OptimizerState<P> {
    lr_policy: Option<LrPolicy>,
    lr_multiplier: Option<LrMultiplier>,
    params: Option<Vec<ParamGroup<P>>>,
}

impl<P> Default for OptimizerState<P> {
    fn default() -> Self {
        Self {
            lr_policy: None,
            lr_multiplier: None,
            params: None,
        }
    }
}

impl<P> OptimizerState<P> {
    pub const fn lr_policy(&self) -> Option<&LrPolicy> {
        self.lr_policy.as_ref()
    }

    pub const fn lr_multiplier(&self) -> Option<&LrMultiplier> {
        self.lr_multiplier.as_ref()
    }

    pub fn params(&self) -> Option<&[ParamGroup<P>]> {
        self.params.as_deref()
    }

    /// 当前存在的状态项名称
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.lr_policy.is_some() {
            keys.push("lr_policy");
        }
        if self.lr_multiplier.is_some() {
            keys.push("lr_multiplier");
        }
        if self.params.is_some() {
            keys.push("params");
        }
        keys
    }
}

/// 一次 schedule 调用实际应用的内容
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleInfo {
    /// 学习率策略给出的学习率
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lr: Option<f64>,
    /// 应用倍率后各参数组的学习率
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_lrs: Option<Vec<f64>>,
}

impl ScheduleInfo {
    pub const fn is_empty(&self) -> bool {
        self.lr.is_none() && self.group_lrs.is_none()
    }
}

/// 配置驱动的优化器封装
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = OptimizerWrapper::new(cfg);
/// optimizer.set_hps(&user_hps)?;
/// optimizer.set_model(model.clone());
/// optimizer.update_params()?;
/// optimizer.build_optimizer()?;
/// let groups = optimizer.take_param_groups().unwrap_or_default();
/// optimizer.set_optimizer(Rc::new(RefCell::new(MySgd::new(groups))));
///
/// for epoch in 0..max_epoch {
///     for iteration in 0..max_iter {
///         let info = optimizer.schedule(epoch, iteration)?;
///         optimizer.zero_grad()?;
///         // ... 前向、反向 ...
///         optimizer.step()?;
///     }
/// }
/// ```
pub struct OptimizerWrapper<P: Clone + 'static> {
    hyper_params: HyperParams,
    state: OptimizerState<P>,
    cfg: ConfigNode,
    model: Option<SharedModule<P>>,
    optimizer: Option<SharedOptimizer<P>>,
}

impl<P: Clone + fmt::Debug + 'static> fmt::Debug for OptimizerWrapper<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizerWrapper")
            .field("hyper_params", &self.hyper_params)
            .field("state", &self.state)
            .field("cfg", &self.cfg)
            .field("has_model", &self.model.is_some())
            .field("has_optimizer", &self.optimizer.is_some())
            .finish()
    }
}

impl<P: Clone + 'static> OptimizerWrapper<P> {
    /// 所有优化器共有的默认超参
    pub fn default_hyper_params() -> HyperParams {
        [("lr_policy", json!([])), ("lr_multiplier", json!([]))]
            .into_iter()
            .collect()
    }

    pub fn new(cfg: ConfigNode) -> Self {
        Self::with_defaults(cfg, &HyperParams::new())
    }

    /// 在共有默认超参之上追加具体优化器的默认超参
    pub fn with_defaults(cfg: ConfigNode, extra_defaults: &HyperParams) -> Self {
        let mut hyper_params = Self::default_hyper_params();
        hyper_params.merge(extra_defaults);
        Self {
            hyper_params,
            state: OptimizerState::default(),
            cfg,
            model: None,
            optimizer: None,
        }
    }

    pub const fn cfg(&self) -> &ConfigNode {
        &self.cfg
    }

    pub const fn get_hps(&self) -> &HyperParams {
        &self.hyper_params
    }

    /// 设置超参，键必须已在默认超参中注册
    pub fn set_hps(&mut self, hps: &HyperParams) -> Result<(), OptimError> {
        self.hyper_params.update_from(hps)
    }

    pub const fn state(&self) -> &OptimizerState<P> {
        &self.state
    }

    /// 每个 epoch 的迭代数：`nr_image_per_epoch / minibatch`，缺省为1
    ///
    /// 两个超参存在但不是非负整数时返回`InvalidConfig`。
    pub fn max_iter(&self) -> Result<usize, OptimError> {
        let nr_image = self.hyper_params.try_get_usize("nr_image_per_epoch")?;
        let minibatch = self.hyper_params.try_get_usize("minibatch")?;
        Ok(match (nr_image, minibatch) {
            (Some(nr_image), Some(minibatch)) if minibatch > 0 => (nr_image / minibatch).max(1),
            _ => 1,
        })
    }

    /// 按超参构建学习率策略与分组学习率倍率
    ///
    /// 对应列表为空时不构建，状态中也不会出现该项。
    pub fn update_params(&mut self) -> Result<(), OptimError> {
        let lr_policy_cfg = self.hyper_params.get_list("lr_policy")?;
        if !lr_policy_cfg.is_empty() {
            let policy = lr_policy::build(lr_policy_cfg, self.max_iter()?)?;
            self.state.lr_policy = Some(policy);
        }
        let lr_multiplier_cfg = self.hyper_params.get_list("lr_multiplier")?;
        if !lr_multiplier_cfg.is_empty() {
            let multiplier = lr_multiplier::build(lr_multiplier_cfg)?;
            self.state.lr_multiplier = Some(multiplier);
        }
        debug!("update_params 完成，状态项：{:?}", self.state.keys());
        Ok(())
    }

    /// 注册待优化的模型
    pub fn set_model(&mut self, model: SharedModule<P>) {
        self.model = Some(model);
    }

    /// 计算交给底层优化器的参数组
    ///
    /// 有分组学习率倍率时按倍率规则分组，否则模型全部参数为一组。
    /// 各组初始学习率取超参`lr`（缺省为0）。
    pub fn build_optimizer(&mut self) -> Result<(), OptimError> {
        let model = self.model.as_ref().ok_or(OptimError::ModelNotSet)?;
        let model = model.borrow();
        let base_lr = self.hyper_params.get_f64("lr").unwrap_or(0.0);
        let groups = match &self.state.lr_multiplier {
            Some(multiplier) => multiplier.divide_into_param_groups(&*model, base_lr),
            None => vec![ParamGroup::new(model.parameters(), base_lr)],
        };
        debug!(
            "build_optimizer：{}个参数组，共{}个参数",
            groups.len(),
            groups.iter().map(ParamGroup::len).sum::<usize>()
        );
        self.state.params = Some(groups);
        Ok(())
    }

    /// 取走已构建的参数组（用于构造底层优化器）
    pub fn take_param_groups(&mut self) -> Option<Vec<ParamGroup<P>>> {
        self.state.params.take()
    }

    /// 挂接底层优化器
    pub fn set_optimizer(&mut self, optimizer: SharedOptimizer<P>) {
        self.optimizer = Some(optimizer);
    }

    pub const fn optimizer(&self) -> Option<&SharedOptimizer<P>> {
        self.optimizer.as_ref()
    }

    fn require_optimizer(&self) -> Result<&SharedOptimizer<P>, OptimError> {
        self.optimizer.as_ref().ok_or(OptimError::OptimizerNotSet)
    }

    pub fn zero_grad(&self) -> Result<(), OptimError> {
        self.require_optimizer()?.borrow_mut().zero_grad()
    }

    pub fn step(&self) -> Result<(), OptimError> {
        self.require_optimizer()?.borrow_mut().step()
    }

    pub fn state_dict(&self) -> Result<StateDict, OptimError> {
        Ok(self.require_optimizer()?.borrow().state_dict())
    }

    pub fn load_state_dict(&self, state_dict: &StateDict) -> Result<(), OptimError> {
        self.require_optimizer()?
            .borrow_mut()
            .load_state_dict(state_dict)
    }

    /// 按训练进度调度底层优化器（调整学习率）
    ///
    /// - 有学习率策略：计算学习率并写入所有参数组
    /// - 有分组学习率倍率：在此基础上按组乘以倍率
    ///
    /// 两者都没有时返回空报告，且不要求已挂接底层优化器。
    pub fn schedule(&self, epoch: usize, iteration: usize) -> Result<ScheduleInfo, OptimError> {
        let mut info = ScheduleInfo::default();
        if self.state.lr_policy.is_none() && self.state.lr_multiplier.is_none() {
            return Ok(info);
        }
        let mut optimizer = self.require_optimizer()?.borrow_mut();

        let lr = self
            .state
            .lr_policy
            .as_ref()
            .map(|policy| policy.get_lr(epoch, iteration))
            .transpose()?;
        if let Some(multiplier) = &self.state.lr_multiplier {
            let got = optimizer.param_groups().len();
            if got != multiplier.rules().len() {
                return Err(OptimError::GroupCountMismatch {
                    expected: multiplier.rules().len(),
                    got,
                });
            }
        }

        if let Some(lr) = lr {
            lr_policy::schedule_lr(&mut *optimizer, lr);
            info.lr = Some(lr);
        }
        if let Some(multiplier) = &self.state.lr_multiplier {
            info.group_lrs = Some(multiplier.multiply_lr(&mut *optimizer, lr)?);
        }
        trace!("schedule(epoch={epoch}, iteration={iteration})：{info:?}");
        Ok(info)
    }
}
