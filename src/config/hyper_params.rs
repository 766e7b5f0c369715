use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::OptimError;

/// 超参表：超参名 → 取值（标量或列表）
///
/// 键集合在创建时由默认值确定，之后只能通过 [`HyperParams::update_from`] 修改已有键的值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperParams {
    values: BTreeMap<String, Value>,
}

impl HyperParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.values
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
    }

    /// 读取可选的非负整数超参：键缺失为`None`，存在但不是非负整数则报错
    pub fn try_get_usize(&self, key: &str) -> Result<Option<usize>, OptimError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| {
                    OptimError::InvalidConfig(format!(
                        "超参`{key}`须为非负整数，实际为`{value}`"
                    ))
                }),
        }
    }

    /// 读取列表型超参（如`lr_policy`、`lr_multiplier`）
    pub fn get_list(&self, key: &str) -> Result<&[Value], OptimError> {
        match self.values.get(key) {
            Some(Value::Array(list)) => Ok(list),
            Some(other) => Err(OptimError::InvalidConfig(format!(
                "超参`{key}`须为列表，实际为`{other}`"
            ))),
            None => Err(OptimError::InvalidConfig(format!("缺少超参`{key}`"))),
        }
    }

    /// 追加/覆盖默认值（用于子类型在基础默认值上扩展自己的超参）
    pub fn merge(&mut self, defaults: &Self) {
        for (k, v) in &defaults.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    /// 用`other`更新已有键的值
    ///
    /// 任一键未注册则返回 [`OptimError::UnknownHyperParam`]，且不做任何修改。
    pub fn update_from(&mut self, other: &Self) -> Result<(), OptimError> {
        if let Some(key) = other.keys().find(|k| !self.contains_key(k)) {
            return Err(OptimError::UnknownHyperParam {
                key: key.to_string(),
            });
        }
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for HyperParams {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
