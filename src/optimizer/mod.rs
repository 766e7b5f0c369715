/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 优化器模块：底层优化器接口与配置驱动的优化器封装
 */

mod base;
mod wrapper;

#[cfg(test)]
mod tests;

pub use base::{Optimizer, ParamGroup, ParamGroupState, StateDict};
pub use wrapper::{
    OptimizerState, OptimizerWrapper, ScheduleInfo, SharedModule, SharedOptimizer,
};
