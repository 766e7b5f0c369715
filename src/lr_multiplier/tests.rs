use approx::assert_abs_diff_eq;
use serde_json::json;

use super::*;
use crate::assert_err;
use crate::utils::test_fixtures::{CountingOptimizer, NamedModel};

fn backbone_head_cfg() -> Vec<Value> {
    vec![
        json!({"name": "backbone", "regex": "basemodel", "ratio": 0.1}),
        json!(r#"{"name": "head", "regex": "head", "ratio": 1}"#),
    ]
}

#[test]
fn test_build_multiplier() {
    let multiplier = build(&backbone_head_cfg()).unwrap();
    assert_eq!(multiplier.rules().len(), 2);
    assert_eq!(multiplier.rules()[0].name, "backbone");
    assert_eq!(multiplier.ratios(), vec![0.1, 1.0]);
}

#[test]
fn test_build_multiplier_errors() {
    let cfg = vec![json!({"name": "bad", "regex": "(", "ratio": 1})];
    assert_err!(build(&cfg), OptimError::InvalidRegex { name, .. } if name == "bad");

    let cfg = vec![json!({"name": "no_ratio", "regex": "head"})];
    assert_err!(build(&cfg), OptimError::InvalidConfig(_));
}

#[test]
fn test_divide_into_param_groups() {
    let multiplier = build(&backbone_head_cfg()).unwrap();
    let groups = multiplier.divide_into_param_groups(&NamedModel::tracker(), 0.08);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name.as_deref(), Some("backbone"));
    assert_eq!(groups[0].params, vec![0, 1, 2]);
    assert_abs_diff_eq!(groups[0].lr, 0.008, epsilon = 1e-12);
    assert_abs_diff_eq!(groups[0].initial_lr, 0.08, epsilon = 1e-12);
    assert_eq!(groups[1].params, vec![3, 4]);
    assert_abs_diff_eq!(groups[1].lr, 0.08, epsilon = 1e-12);
}

#[test]
fn test_divide_first_match_wins_and_unmatched_dropped() {
    let cfg = vec![
        json!({"name": "conv1", "regex": r"conv1\.", "ratio": 0.0}),
        json!({"name": "basemodel", "regex": "basemodel", "ratio": 0.1}),
    ];
    let multiplier = build(&cfg).unwrap();
    let groups = multiplier.divide_into_param_groups(&NamedModel::tracker(), 1.0);

    assert_eq!(groups[0].params, vec![0, 1]);
    assert_eq!(groups[1].params, vec![2]);
    // head.* 不匹配任何规则
    let total: usize = groups.iter().map(ParamGroup::len).sum();
    assert_eq!(total, 3);
}

#[test]
fn test_multiply_lr_does_not_compound() {
    let multiplier = build(&backbone_head_cfg()).unwrap();
    let groups = multiplier.divide_into_param_groups(&NamedModel::tracker(), 0.5);
    let mut optimizer = CountingOptimizer::new(groups);

    // 无学习率策略：以 initial_lr 为基准，重复调用结果不变
    for _ in 0..3 {
        let lrs = multiplier.multiply_lr(&mut optimizer, None).unwrap();
        assert_abs_diff_eq!(lrs[0], 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(lrs[1], 0.5, epsilon = 1e-12);
    }

    // 有学习率策略：以策略给出的学习率为基准
    let lrs = multiplier.multiply_lr(&mut optimizer, Some(0.2)).unwrap();
    assert_abs_diff_eq!(lrs[0], 0.02, epsilon = 1e-12);
    assert_abs_diff_eq!(lrs[1], 0.2, epsilon = 1e-12);
    assert_eq!(optimizer.group_lrs(), lrs);
}

#[test]
fn test_multiply_lr_group_count_mismatch() {
    let multiplier = build(&backbone_head_cfg()).unwrap();
    let mut optimizer = CountingOptimizer::new(vec![ParamGroup::new(vec![0, 1, 2], 0.3)]);
    assert_err!(
        multiplier.multiply_lr(&mut optimizer, Some(1.0)),
        OptimError::GroupCountMismatch(2, 1)
    );
    assert_eq!(optimizer.group_lrs(), vec![0.3]);
}
