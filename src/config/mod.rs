/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 配置节点与超参表
 *
 * 优化器配置节点的格式：
 * ```json
 * {
 *     "name": "SGD",
 *     "SGD": { "lr": 0.1, "lr_policy": [...], "lr_multiplier": [...] }
 * }
 * ```
 */

mod hyper_params;


pub use hyper_params::HyperParams;

use std::path::Path;

use serde_json::Value;

use crate::errors::OptimError;

/// 配置节点（JSON 文档）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigNode {
    value: Value,
}

impl ConfigNode {
    pub const fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn from_json(json: &str) -> Result<Self, OptimError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OptimError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, OptimError> {
        Ok(serde_json::to_string_pretty(&self.value)?)
    }

    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// 获取子节点，不存在时返回 `None`
    pub fn child(&self, key: &str) -> Option<Self> {
        self.value.get(key).map(|v| Self::new(v.clone()))
    }

    /// 读取`name`字段（所选优化器的名称）
    pub fn name(&self) -> Result<&str, OptimError> {
        self.value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| OptimError::InvalidConfig("配置节点缺少字符串字段`name`".to_string()))
    }

    /// 将当前节点（须为 JSON 对象）转为超参表
    ///
    /// 不存在的节点视为空表。
    pub fn to_hyper_params(&self) -> Result<HyperParams, OptimError> {
        match &self.value {
            Value::Null => Ok(HyperParams::new()),
            Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            other => Err(OptimError::InvalidConfig(format!(
                "超参节点须为对象，实际为`{other}`"
            ))),
        }
    }
}

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
