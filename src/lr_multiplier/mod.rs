/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 分组学习率倍率：按参数名正则将参数划分为若干组，各组学习率乘以各自的倍率
 *
 * 配置示例（如骨干网络以 1/10 学习率微调）：
 * ```json
 * [
 *     {"name": "backbone", "regex": "basemodel", "ratio": 0.1},
 *     {"name": "head", "regex": "head", "ratio": 1}
 * ]
 * ```
 */

#[cfg(test)]
mod tests;

use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::OptimError;
use crate::lr_policy::parse_entry;
use crate::module::Module;
use crate::optimizer::{Optimizer, ParamGroup};

#[derive(Deserialize)]
struct RuleConfig {
    name: String,
    regex: String,
    ratio: f64,
}

/// 单条倍率规则
#[derive(Debug, Clone)]
pub struct MultiplierRule {
    pub name: String,
    pub regex: Regex,
    pub ratio: f64,
}

/// 分组学习率倍率
#[derive(Debug, Clone)]
pub struct LrMultiplier {
    rules: Vec<MultiplierRule>,
}

impl LrMultiplier {
    pub const fn new(rules: Vec<MultiplierRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[MultiplierRule] {
        &self.rules
    }

    pub fn ratios(&self) -> Vec<f64> {
        self.rules.iter().map(|r| r.ratio).collect()
    }

    /// 按规则顺序将模型参数划分为参数组（每条规则一组）
    ///
    /// 参数归入第一条匹配（正则搜索）其名称的规则；不匹配任何规则的参数不参与优化。
    pub fn divide_into_param_groups<P: Clone, M: Module<P> + ?Sized>(
        &self,
        model: &M,
        base_lr: f64,
    ) -> Vec<ParamGroup<P>> {
        let mut groups: Vec<ParamGroup<P>> = self
            .rules
            .iter()
            .map(|r| ParamGroup {
                lr: base_lr * r.ratio,
                ..ParamGroup::named(r.name.clone(), Vec::new(), base_lr)
            })
            .collect();
        for (param_name, param) in model.named_parameters() {
            match self.rules.iter().position(|r| r.regex.is_match(&param_name)) {
                Some(ith) => groups[ith].params.push(param),
                None => warn!("参数`{param_name}`不匹配任何学习率倍率规则，将不参与优化"),
            }
        }
        for group in &groups {
            debug!(
                "参数组`{}`：{}个参数",
                group.name.as_deref().unwrap_or_default(),
                group.len()
            );
        }
        groups
    }

    /// 将倍率应用到底层优化器的各参数组
    ///
    /// 第 i 组的学习率设为 `base * ratio_i`。`base_lr` 为 `None` 时以各组的 `initial_lr` 为基准，
    /// 因此重复调用不会累乘。组数与规则数不一致时报错且不做修改。
    pub fn multiply_lr<P, O: Optimizer<P> + ?Sized>(
        &self,
        optimizer: &mut O,
        base_lr: Option<f64>,
    ) -> Result<Vec<f64>, OptimError> {
        let groups = optimizer.param_groups_mut();
        if groups.len() != self.rules.len() {
            return Err(OptimError::GroupCountMismatch {
                expected: self.rules.len(),
                got: groups.len(),
            });
        }
        let lrs = groups
            .iter_mut()
            .zip(&self.rules)
            .map(|(group, rule)| {
                group.lr = base_lr.unwrap_or(group.initial_lr) * rule.ratio;
                group.lr
            })
            .collect();
        Ok(lrs)
    }
}

/// 按配置构建分组学习率倍率
pub fn build(cfg: &[Value]) -> Result<LrMultiplier, OptimError> {
    let rules = cfg
        .iter()
        .map(|entry| {
            let value = parse_entry(entry)?;
            let rule: RuleConfig = serde_json::from_value(value)
                .map_err(|e| OptimError::InvalidConfig(format!("学习率倍率：{e}")))?;
            let regex = Regex::new(&rule.regex).map_err(|source| OptimError::InvalidRegex {
                name: rule.name.clone(),
                source,
            })?;
            Ok(MultiplierRule {
                name: rule.name,
                regex,
                ratio: rule.ratio,
            })
        })
        .collect::<Result<Vec<_>, OptimError>>()?;
    debug!("构建学习率倍率：{}条规则", rules.len());
    Ok(LrMultiplier::new(rules))
}
