use std::f64::consts::PI;

use super::LrSchedule;
use crate::errors::OptimError;

/// 过渡曲线的形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// 线性插值
    Linear,
    /// 对数空间内线性插值（即指数衰减/增长）
    Exponential,
    /// 余弦曲线：`(1 - cos(πt)) / 2`
    Cosine,
}

impl TransitionKind {
    fn pre(self, x: f64) -> f64 {
        match self {
            Self::Exponential => x.ln(),
            Self::Linear | Self::Cosine => x,
        }
    }

    fn post(self, x: f64) -> f64 {
        match self {
            Self::Exponential => x.exp(),
            Self::Linear | Self::Cosine => x,
        }
    }

    fn ratio(self, t: f64) -> f64 {
        match self {
            Self::Cosine => (1.0 - (t * PI).cos()) / 2.0,
            Self::Linear | Self::Exponential => t,
        }
    }
}

/// 过渡型学习率：在 `max_epoch * max_iter` 次迭代内从 `start_lr` 过渡到 `end_lr`
///
/// 进度 t = (epoch * max_iter + iteration) / (max_epoch * max_iter)，取值 [0, 1)。
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionLr {
    kind: TransitionKind,
    start_lr: f64,
    end_lr: f64,
    max_epoch: usize,
    max_iter: usize,
}

impl TransitionLr {
    pub fn new(
        kind: TransitionKind,
        start_lr: f64,
        end_lr: f64,
        max_epoch: usize,
        max_iter: usize,
    ) -> Result<Self, OptimError> {
        if max_epoch == 0 || max_iter == 0 {
            return Err(OptimError::InvalidConfig(format!(
                "max_epoch与max_iter须大于0，实际为{max_epoch}与{max_iter}"
            )));
        }
        if max_epoch.checked_mul(max_iter).is_none() {
            return Err(OptimError::InvalidConfig(format!(
                "max_epoch * max_iter 溢出：{max_epoch} * {max_iter}"
            )));
        }
        if kind == TransitionKind::Exponential && (start_lr <= 0.0 || end_lr <= 0.0) {
            return Err(OptimError::InvalidConfig(format!(
                "ExponentialLR的起止学习率须为正数，实际为{start_lr}与{end_lr}"
            )));
        }
        Ok(Self {
            kind,
            start_lr,
            end_lr,
            max_epoch,
            max_iter,
        })
    }

    pub const fn max_iter(&self) -> usize {
        self.max_iter
    }
}

impl LrSchedule for TransitionLr {
    fn get_lr(&self, epoch: usize, iteration: usize) -> Result<f64, OptimError> {
        if epoch >= self.max_epoch || iteration >= self.max_iter {
            return Err(OptimError::LrOutOfRange {
                epoch,
                iteration,
                message: format!(
                    "须满足 epoch < {} 且 iteration < {}",
                    self.max_epoch, self.max_iter
                ),
            });
        }
        let start = self.kind.pre(self.start_lr);
        let end = self.kind.pre(self.end_lr);
        let progress = (epoch * self.max_iter + iteration) as f64
            / (self.max_epoch * self.max_iter) as f64;
        let ratio = self.kind.ratio(progress);
        Ok(self.kind.post(start + (end - start) * ratio))
    }

    fn max_epoch(&self) -> usize {
        self.max_epoch
    }
}
