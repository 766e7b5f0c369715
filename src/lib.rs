//! # Track Optim
//!
//! `track_optim`是训练框架中的优化器封装层：它本身不实现梯度计算与数值更新规则，
//! 而是负责
//! - 注册并校验超参（只能修改已注册的键）
//! - 按配置构建学习率策略（`LinearLR`、`CosineLR`、`MultiStageLR`等阶段串联）
//! - 按参数名正则划分参数组，并为各组设置学习率倍率
//! - 将`zero_grad`/`step`/`state_dict`转发给调用方提供的底层优化器
//!

pub mod builder;
pub mod config;
pub mod errors;
pub mod lr_multiplier;
pub mod lr_policy;
pub mod module;
pub mod optimizer;
pub mod utils;

pub use builder::{OptimizerKind, OptimizerRegistry, Task};
pub use config::{ConfigNode, HyperParams};
pub use errors::OptimError;
pub use lr_multiplier::LrMultiplier;
pub use lr_policy::{LrPolicy, LrSchedule};
pub use module::Module;
pub use optimizer::{Optimizer, OptimizerWrapper, ParamGroup, ScheduleInfo, StateDict};
