use super::{LrPolicy, LrSchedule};
use crate::errors::OptimError;

/// 串联多个阶段的学习率策略
///
/// 全局 epoch 先定位到所在阶段，再换算为该阶段内的相对 epoch。
#[derive(Debug, Clone, PartialEq)]
pub struct ListLr {
    phases: Vec<LrPolicy>,
}

impl ListLr {
    pub const fn new(phases: Vec<LrPolicy>) -> Self {
        Self { phases }
    }

    pub fn phases(&self) -> &[LrPolicy] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

impl LrSchedule for ListLr {
    fn get_lr(&self, epoch: usize, iteration: usize) -> Result<f64, OptimError> {
        let mut relative_epoch = epoch;
        for phase in &self.phases {
            let phase_epochs = phase.max_epoch();
            if relative_epoch < phase_epochs {
                return phase.get_lr(relative_epoch, iteration);
            }
            relative_epoch -= phase_epochs;
        }
        Err(OptimError::LrOutOfRange {
            epoch,
            iteration,
            message: format!("超出全部阶段（共{}个epoch）", self.max_epoch()),
        })
    }

    fn max_epoch(&self) -> usize {
        self.phases
            .iter()
            .map(LrSchedule::max_epoch)
            .fold(0, usize::saturating_add)
    }
}
