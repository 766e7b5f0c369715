/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 优化器封装的统一错误类型
 */

use thiserror::Error;

/// 优化器封装的错误类型
#[derive(Error, Debug)]
pub enum OptimError {
    // 超参
    #[error("未知的超参`{key}`：只能设置已注册的默认超参")]
    UnknownHyperParam { key: String },
    #[error("配置无效：{0}")]
    InvalidConfig(String),

    // 学习率策略 / 倍率
    #[error("未知的学习率策略`{0}`")]
    UnknownPolicy(String),
    #[error("学习率倍率`{name}`的正则表达式无效：{source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("学习率策略越界：epoch={epoch}，iteration={iteration}，{message}")]
    LrOutOfRange {
        epoch: usize,
        iteration: usize,
        message: String,
    },
    #[error("参数组数量不一致：预期{expected}组，实际{got}组")]
    GroupCountMismatch { expected: usize, got: usize },

    // 注册表
    #[error("未知的优化器`{0}`")]
    UnknownOptimizer(String),
    #[error("优化器`{0}`已注册")]
    DuplicateOptimizer(String),

    // 生命周期
    #[error("尚未通过set_model设置模型")]
    ModelNotSet,
    #[error("尚未设置底层优化器")]
    OptimizerNotSet,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
