use approx::assert_abs_diff_eq;
use serde_json::json;

use super::*;
use crate::assert_err;
use crate::optimizer::ParamGroup;
use crate::utils::test_fixtures::CountingOptimizer;

#[test]
fn test_linear_lr() {
    let lr = TransitionLr::new(TransitionKind::Linear, 0.1, 0.0, 2, 10).unwrap();
    assert_abs_diff_eq!(lr.get_lr(0, 0).unwrap(), 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(lr.get_lr(1, 0).unwrap(), 0.05, epsilon = 1e-12);
    assert_abs_diff_eq!(lr.get_lr(1, 9).unwrap(), 0.005, epsilon = 1e-12);
    assert_eq!(lr.max_epoch(), 2);
}

#[test]
fn test_exponential_lr_midpoint() {
    let lr = TransitionLr::new(TransitionKind::Exponential, 1.0, 0.01, 1, 2).unwrap();
    assert_abs_diff_eq!(lr.get_lr(0, 0).unwrap(), 1.0, epsilon = 1e-12);
    // 对数空间的中点：sqrt(1.0 * 0.01)
    assert_abs_diff_eq!(lr.get_lr(0, 1).unwrap(), 0.1, epsilon = 1e-12);
}

#[test]
fn test_cosine_lr() {
    let lr = TransitionLr::new(TransitionKind::Cosine, 0.0, 1.0, 1, 4).unwrap();
    assert_abs_diff_eq!(lr.get_lr(0, 0).unwrap(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(lr.get_lr(0, 1).unwrap(), 0.146_446_609, epsilon = 1e-8);
    assert_abs_diff_eq!(lr.get_lr(0, 2).unwrap(), 0.5, epsilon = 1e-12);
}

#[test]
fn test_transition_out_of_range() {
    let lr = TransitionLr::new(TransitionKind::Linear, 0.1, 0.0, 2, 10).unwrap();
    assert_err!(lr.get_lr(2, 0), OptimError::LrOutOfRange { epoch: 2, .. });
    assert_err!(lr.get_lr(0, 10), OptimError::LrOutOfRange { iteration: 10, .. });
}

#[test]
fn test_transition_invalid_args() {
    assert_err!(
        TransitionLr::new(TransitionKind::Linear, 0.1, 0.0, 0, 10),
        OptimError::InvalidConfig(_)
    );
    assert_err!(
        TransitionLr::new(TransitionKind::Exponential, 0.0, 0.1, 1, 10),
        OptimError::InvalidConfig(_)
    );
}

#[test]
fn test_transition_rejects_overflowing_iteration_count() {
    assert_err!(
        TransitionLr::new(TransitionKind::Linear, 0.1, 0.0, usize::MAX, 2),
        OptimError::InvalidConfig(_)
    );
    assert_err!(
        build(
            &[json!({
                "name": "LinearLR",
                "start_lr": 0.1,
                "end_lr": 0.0,
                "max_epoch": u64::MAX,
                "max_iter": 2
            })],
            1
        ),
        OptimError::InvalidConfig(_)
    );
    // 单独巨大的 max_epoch 不溢出时仍可正常计算
    let lr = TransitionLr::new(TransitionKind::Linear, 0.1, 0.0, usize::MAX, 1).unwrap();
    assert_abs_diff_eq!(lr.get_lr(0, 0).unwrap(), 0.1, epsilon = 1e-12);
}

#[test]
fn test_multi_stage_lr() {
    let lr = MultiStageLr::new(vec![(2, 0.1), (4, 0.01)]).unwrap();
    assert_eq!(lr.get_lr(0, 0).unwrap(), 0.1);
    assert_eq!(lr.get_lr(1, 99).unwrap(), 0.1);
    assert_eq!(lr.get_lr(2, 0).unwrap(), 0.01);
    assert_eq!(lr.max_epoch(), 4);
    assert_err!(lr.get_lr(4, 0), OptimError::LrOutOfRange { .. });
}

#[test]
fn test_multi_stage_invalid_stages() {
    assert_err!(MultiStageLr::new(vec![]), OptimError::InvalidConfig(_));
    assert_err!(
        MultiStageLr::new(vec![(2, 0.1), (2, 0.01)]),
        OptimError::InvalidConfig(_)
    );
    assert_err!(MultiStageLr::new(vec![(0, 0.1)]), OptimError::InvalidConfig(_));
}

#[test]
fn test_build_list_lr_maps_epochs_to_phases() {
    let cfg = vec![
        json!({"name": "LinearLR", "start_lr": 0.0, "end_lr": 1.0, "max_epoch": 1}),
        // 字符串形式的阶段配置
        json!(r#"{"name": "MultiStageLR", "lr_stages": [[2, 0.1], [4, 0.01]]}"#),
    ];
    let policy = build(&cfg, 10).unwrap();
    assert_eq!(policy.max_epoch(), 5);
    assert_abs_diff_eq!(policy.get_lr(0, 5).unwrap(), 0.5, epsilon = 1e-12);
    assert_eq!(policy.get_lr(1, 0).unwrap(), 0.1);
    assert_eq!(policy.get_lr(2, 0).unwrap(), 0.1);
    assert_eq!(policy.get_lr(3, 0).unwrap(), 0.01);
    assert_eq!(policy.get_lr(4, 3).unwrap(), 0.01);
    assert_err!(policy.get_lr(5, 0), OptimError::LrOutOfRange { epoch: 5, .. });
}

#[test]
fn test_build_phase_max_iter_override() {
    let cfg = vec![json!({"name": "LinearLR", "start_lr": 1.0, "end_lr": 0.0, "max_iter": 4})];
    let policy = build(&cfg, 100).unwrap();
    match &policy {
        LrPolicy::List(list) => match &list.phases()[0] {
            LrPolicy::Transition(t) => assert_eq!(t.max_iter(), 4),
            other => panic!("预期 TransitionLr，实际得到 {other:?}"),
        },
        other => panic!("预期 ListLr，实际得到 {other:?}"),
    }
    assert_abs_diff_eq!(policy.get_lr(0, 2).unwrap(), 0.5, epsilon = 1e-12);
}

#[test]
fn test_build_errors() {
    assert_err!(
        build(&[json!({"name": "StepLR"})], 1),
        OptimError::UnknownPolicy("StepLR")
    );
    assert_err!(build(&[json!({"start_lr": 0.1})], 1), OptimError::InvalidConfig(_));
    assert_err!(
        build(&[json!({"name": "MultiStageLR"})], 1),
        OptimError::InvalidConfig(_)
    );
    assert_err!(build(&[json!(42)], 1), OptimError::InvalidConfig(_));
    assert_err!(build(&[json!("not json")], 1), OptimError::Json(_));
}

#[test]
fn test_schedule_lr_sets_all_groups() {
    let mut optimizer = CountingOptimizer::new(vec![
        ParamGroup::new(vec![0, 1], 0.1),
        ParamGroup::new(vec![2], 0.2),
    ]);
    schedule_lr(&mut optimizer, 0.05);
    assert_eq!(optimizer.group_lrs(), vec![0.05, 0.05]);
}
