//! 내장 전략 점수의 불변 조건 속성 테스트.

use proptest::prelude::*;

use screener_analytics::{BuiltinStrategy, ScoreEngine, StrategyConfig, MAX_TOTAL_SCORE};
use screener_core::{SubScoreKind, TickerMetricRow};

const EPS: f64 = 1e-9;

fn row_from(config: &StrategyConfig, values: &[Option<f64>]) -> TickerMetricRow {
    let codes = config.required_metrics();
    TickerMetricRow::new(
        "PROP",
        None,
        codes.into_iter().zip(values.iter().copied()),
    )
}

fn metric_value() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        1 => Just(Some(f64::NAN)),
        6 => (-3.0f64..3.0).prop_map(Some),
        2 => (-500.0f64..500.0).prop_map(Some),
    ]
}

fn any_builtin() -> impl Strategy<Value = BuiltinStrategy> {
    prop::sample::select(BuiltinStrategy::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_subtotals_within_caps(
        which in any_builtin(),
        values in prop::collection::vec(metric_value(), 64),
    ) {
        let config = which.load().unwrap();
        let row = row_from(&config, &values);
        let result = ScoreEngine::evaluate(&row, &config);

        for kind in SubScoreKind::ALL {
            let sub = result.subtotals.get(kind);
            prop_assert!(sub >= 0.0);
            prop_assert!(sub <= config.scorers.get(kind).cap + EPS);
        }
        prop_assert!(result.total_score >= 0.0);
        prop_assert!(result.total_score <= MAX_TOTAL_SCORE);
        if !result.gate_passed {
            prop_assert_eq!(result.total_score, 0.0);
        }
    }

    #[test]
    fn test_scoring_is_deterministic(
        which in any_builtin(),
        values in prop::collection::vec(metric_value(), 64),
    ) {
        let config = which.load().unwrap();
        let row = row_from(&config, &values);
        prop_assert_eq!(
            ScoreEngine::evaluate(&row, &config),
            ScoreEngine::evaluate(&row, &config)
        );
    }

    #[test]
    fn test_null_rule_inputs_contribute_nothing(which in any_builtin()) {
        let config = which.load().unwrap();
        let row = TickerMetricRow::empty("NULL");
        for c in ScoreEngine::explain(&row, &config) {
            prop_assert_eq!(c.points, 0.0);
        }
        prop_assert!(!ScoreEngine::evaluate(&row, &config).gate_passed);
    }
}
