use super::LrSchedule;
use crate::errors::OptimError;

/// 分段常数学习率
///
/// `lr_stages = [(e1, lr1), (e2, lr2), ...]`：epoch < e1 时为 lr1，e1 <= epoch < e2 时为 lr2，依此类推。
#[derive(Debug, Clone, PartialEq)]
pub struct MultiStageLr {
    lr_stages: Vec<(usize, f64)>,
}

impl MultiStageLr {
    pub fn new(lr_stages: Vec<(usize, f64)>) -> Result<Self, OptimError> {
        if lr_stages.is_empty() {
            return Err(OptimError::InvalidConfig("MultiStageLR至少需要1个阶段".to_string()));
        }
        // 首个阶段的 epoch 也须大于0，否则该阶段永远不会生效
        let mut prev = 0;
        for &(stage_epoch, _) in &lr_stages {
            if stage_epoch <= prev {
                return Err(OptimError::InvalidConfig(format!(
                    "MultiStageLR的阶段epoch须严格递增且大于0：{lr_stages:?}"
                )));
            }
            prev = stage_epoch;
        }
        Ok(Self { lr_stages })
    }
}

impl LrSchedule for MultiStageLr {
    fn get_lr(&self, epoch: usize, iteration: usize) -> Result<f64, OptimError> {
        self.lr_stages
            .iter()
            .find(|(stage_epoch, _)| epoch < *stage_epoch)
            .map(|&(_, lr)| lr)
            .ok_or_else(|| OptimError::LrOutOfRange {
                epoch,
                iteration,
                message: format!("须满足 epoch < {}", self.max_epoch()),
            })
    }

    fn max_epoch(&self) -> usize {
        self.lr_stages.last().map_or(0, |&(e, _)| e)
    }
}
