/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 学习率策略：训练进度（epoch, iteration）→ 学习率
 *
 * 配置为阶段列表，每个阶段是一个 JSON 对象（或 JSON 字符串），按顺序串联：
 * ```json
 * [
 *     {"name": "LinearLR", "start_lr": 1e-6, "end_lr": 0.08, "max_epoch": 1},
 *     {"name": "CosineLR", "start_lr": 0.08, "end_lr": 1e-6, "max_epoch": 19}
 * ]
 * ```
 */

mod list;
mod multi_stage;
mod transition;

#[cfg(test)]
mod tests;

pub use list::ListLr;
pub use multi_stage::MultiStageLr;
pub use transition::{TransitionKind, TransitionLr};

use enum_dispatch::enum_dispatch;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::OptimError;
use crate::optimizer::Optimizer;

/// 学习率策略 trait
#[enum_dispatch]
pub trait LrSchedule {
    /// 计算给定 epoch / iteration 处的学习率（epoch 相对于本策略的起点）
    fn get_lr(&self, epoch: usize, iteration: usize) -> Result<f64, OptimError>;

    /// 本策略覆盖的 epoch 数
    fn max_epoch(&self) -> usize;
}

/// 所有学习率策略
#[enum_dispatch(LrSchedule)]
#[derive(Debug, Clone, PartialEq)]
pub enum LrPolicy {
    Transition(TransitionLr),
    MultiStage(MultiStageLr),
    List(ListLr),
}

#[derive(Deserialize)]
struct TransitionConfig {
    #[serde(default)]
    start_lr: f64,
    #[serde(default)]
    end_lr: f64,
    #[serde(default = "default_max_epoch")]
    max_epoch: usize,
    max_iter: Option<usize>,
}

const fn default_max_epoch() -> usize {
    1
}

#[derive(Deserialize)]
struct MultiStageConfig {
    lr_stages: Vec<(usize, f64)>,
}

/// 将配置项（对象或 JSON 字符串）统一解析为对象
pub(crate) fn parse_entry(entry: &Value) -> Result<Value, OptimError> {
    let value = match entry {
        Value::String(s) => serde_json::from_str(s)?,
        other => other.clone(),
    };
    if value.is_object() {
        Ok(value)
    } else {
        Err(OptimError::InvalidConfig(format!(
            "配置项须为 JSON 对象，实际为`{value}`"
        )))
    }
}

fn build_phase(entry: &Value, max_iter: usize) -> Result<LrPolicy, OptimError> {
    let phase = parse_entry(entry)?;
    let name = phase
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| OptimError::InvalidConfig(format!("学习率策略缺少`name`：{phase}")))?
        .to_string();
    let invalid = |e: serde_json::Error| OptimError::InvalidConfig(format!("学习率策略`{name}`：{e}"));

    let kind = match name.as_str() {
        "LinearLR" => TransitionKind::Linear,
        "ExponentialLR" => TransitionKind::Exponential,
        "CosineLR" => TransitionKind::Cosine,
        "MultiStageLR" => {
            let cfg: MultiStageConfig = serde_json::from_value(phase).map_err(invalid)?;
            return Ok(MultiStageLr::new(cfg.lr_stages)?.into());
        }
        _ => return Err(OptimError::UnknownPolicy(name.clone())),
    };
    let cfg: TransitionConfig = serde_json::from_value(phase).map_err(invalid)?;
    let policy = TransitionLr::new(
        kind,
        cfg.start_lr,
        cfg.end_lr,
        cfg.max_epoch,
        cfg.max_iter.unwrap_or(max_iter),
    )?;
    Ok(policy.into())
}

/// 按配置构建学习率策略
///
/// # 参数
/// - `cfg`: 阶段列表
/// - `max_iter`: 每个 epoch 的迭代数（阶段自身未指定`max_iter`时使用）
pub fn build(cfg: &[Value], max_iter: usize) -> Result<LrPolicy, OptimError> {
    let phases = cfg
        .iter()
        .map(|entry| build_phase(entry, max_iter))
        .collect::<Result<Vec<_>, _>>()?;
    let policy = ListLr::new(phases);
    debug!(
        "构建学习率策略：{}个阶段，共{}个epoch",
        policy.len(),
        policy.max_epoch()
    );
    Ok(policy.into())
}

/// 将学习率写入底层优化器的所有参数组
pub fn schedule_lr<P, O: Optimizer<P> + ?Sized>(optimizer: &mut O, lr: f64) {
    optimizer.set_learning_rate(lr);
}
