//! 单元测试共用的模型与优化器替身

use crate::errors::OptimError;
use crate::module::Module;
use crate::optimizer::{Optimizer, ParamGroup};

/// 以 usize 作为参数句柄的模型
pub(crate) struct NamedModel {
    params: Vec<(String, usize)>,
}

impl NamedModel {
    pub(crate) fn new(names: &[&str]) -> Self {
        Self {
            params: names
                .iter()
                .enumerate()
                .map(|(id, name)| (name.to_string(), id))
                .collect(),
        }
    }

    /// 跟踪器常见结构：骨干网络 + 头部
    pub(crate) fn tracker() -> Self {
        Self::new(&[
            "basemodel.conv1.weight",
            "basemodel.conv1.bias",
            "basemodel.conv2.weight",
            "head.cls.weight",
            "head.reg.weight",
        ])
    }
}

impl Module<usize> for NamedModel {
    fn named_parameters(&self) -> Vec<(String, usize)> {
        self.params.clone()
    }
}

/// 只记录调用次数的优化器
pub(crate) struct CountingOptimizer {
    groups: Vec<ParamGroup<usize>>,
    pub(crate) zero_grad_calls: usize,
    pub(crate) step_calls: usize,
}

impl CountingOptimizer {
    pub(crate) const fn new(groups: Vec<ParamGroup<usize>>) -> Self {
        Self {
            groups,
            zero_grad_calls: 0,
            step_calls: 0,
        }
    }

    pub(crate) fn group_lrs(&self) -> Vec<f64> {
        self.groups.iter().map(|g| g.lr).collect()
    }
}

impl Optimizer<usize> for CountingOptimizer {
    fn zero_grad(&mut self) -> Result<(), OptimError> {
        self.zero_grad_calls += 1;
        Ok(())
    }

    fn step(&mut self) -> Result<(), OptimError> {
        self.step_calls += 1;
        Ok(())
    }

    fn param_groups(&self) -> &[ParamGroup<usize>] {
        &self.groups
    }

    fn param_groups_mut(&mut self) -> &mut [ParamGroup<usize>] {
        &mut self.groups
    }
}
