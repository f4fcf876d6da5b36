//! 내장 약세 전략(Bearish, Breakout-Down)의 손 계산 점수 시나리오.

use screener_analytics::{BuiltinStrategy, ScoreEngine};
use screener_core::{Subtotals, TickerMetricRow};

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPS,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}

fn assert_subtotals(actual: &Subtotals, price: f64, volume: f64, volatility: f64, drawdown: f64) {
    assert_close(actual.price, price, "price");
    assert_close(actual.volume, volume, "volume");
    assert_close(actual.volatility, volatility, "volatility");
    assert_close(actual.drawdown, drawdown, "drawdown");
}

fn bearish_row() -> TickerMetricRow {
    TickerMetricRow::builder("BEAR")
        .sector("Energy")
        // 게이트
        .metric("10_day_ret", -0.05)
        .metric("60_day_ret", -0.10)
        .metric("abn_vol_60d", 1.0)
        .metric("60d_price_dollarVolume_correlation", -0.5)
        // 가격
        .metric("moving_avg_20d", 95.0)
        .metric("moving_avg_50d", 100.0)
        .metric("moving_avg_200d", 125.0)
        .metric("5_day_range_pos", 0.25)
        .metric("change_10dayret", -0.01)
        .metric("slope_over60_of_logprice", 0.001)
        .metric("prior_slope_over60_of_logprice", 0.002)
        .metric("300_day_ret", -0.25)
        // 거래량
        .metric("252d_dollar_volume_accel", 0.1)
        .metric("60d_dollar_volume_SMA", 110.0)
        .metric("252d_dollar_volume_SMA", 100.0)
        // 변동성 (slope_over60_of_252d_volatility 없음)
        .metric("252d_upsidevolatility", 0.2)
        .metric("252d_downsidedeviation", 0.25)
        .metric("slope_over20_of_60d_volatility", 0.0)
        .metric("5d_EMA_15dayvolatility", 0.3)
        .metric("60d_volatility", 0.25)
        // 낙폭
        .metric("750d_drawdown", -0.2)
        .metric("drawdown_percent", -0.1)
        .build()
}

/// 여섯 게이트 그룹을 모두 통과하는 행.
fn breakout_down_row(range_pos: f64) -> TickerMetricRow {
    TickerMetricRow::builder("BRKD")
        .metric("10_day_ret", -0.03)
        .metric("60_day_ret", -0.04)
        .metric("5_day_range_pos", range_pos)
        .metric("moving_avg_20d", 95.0)
        .metric("moving_avg_50d", 100.0)
        .metric("moving_avg_200d", 90.0)
        .metric("abn_vol_60d", 0.925)
        .metric("60d_dollar_volume_SMA", 110.0)
        .metric("252d_dollar_volume_SMA", 100.0)
        .metric("60d_price_dollarVolume_correlation", -0.35)
        .metric("5d_EMA_15dayvolatility", 0.3)
        .metric("60d_volatility", 0.25)
        .metric("slope_over20_of_60d_volatility", 0.005)
        .metric("60_10_highlowrange_zscore", 0.9)
        .metric("slope_over60_of_logprice", 0.001)
        .metric("prior_slope_over60_of_logprice", 0.011)
        .metric("200_day_ret", 0.15)
        .metric("drawdown_percent", -0.05)
        .metric("750d_drawdown", -0.2)
        .build()
}

#[test]
fn test_bearish_scores_by_hand() {
    let config = BuiltinStrategy::Bearish.load().unwrap();
    let result = ScoreEngine::evaluate(&bearish_row(), &config);

    assert!(result.gate_passed);
    assert!(result.failed_gates.is_empty());
    // 가격: 3.0 + 6.0 + 6.0 + 4.0 + 3.0 + 2.5 + 2.4 + 2.0
    // 거래량: 4.0 + 3.5 + 5.0 + 4.0
    // 변동성: 5.0 + 5.0 + 0.0 + 8.0
    // 낙폭: 1.0 + 1.5
    assert_subtotals(&result.subtotals, 28.9, 16.5, 18.0, 2.5);
    assert_close(result.total_score, 65.9, "total");
    assert_eq!(result.sector.as_deref(), Some("Energy"));
}

#[test]
fn test_bearish_rejects_rising_stock() {
    let config = BuiltinStrategy::Bearish.load().unwrap();
    let row = TickerMetricRow::builder("BULL")
        .metric("10_day_ret", 0.05)
        .metric("60_day_ret", -0.10)
        .metric("abn_vol_60d", 1.0)
        .build();
    let result = ScoreEngine::evaluate(&row, &config);

    assert!(!result.gate_passed);
    assert_eq!(result.failed_gates, vec!["short_return".to_string()]);
    assert_eq!(result.total_score, 0.0);
    assert_eq!(result.subtotals, Subtotals::ZERO);
}

#[test]
fn test_breakout_down_scores_by_hand() {
    let config = BuiltinStrategy::BreakoutDown.load().unwrap();
    assert_eq!(config.gate.groups.len(), 6);

    let result = ScoreEngine::evaluate(&breakout_down_row(0.10), &config);

    assert!(result.gate_passed);
    assert!(result.failed_gates.is_empty());
    // 가격: 6.0 + 0.0 + 5.0 + 5.0 + 2.0 + 8.0
    // 거래량: 5.0 + 4.0 + 2.45
    // 변동성: 4.0 + 2.0 + 3.5
    // 낙폭: 4.5 + 2.0
    assert_subtotals(&result.subtotals, 26.0, 11.45, 9.5, 6.5);
    assert_close(result.total_score, 53.45, "total");
    assert_eq!(result.aux_display_fields["range_pos"], Some(0.10));
}

#[test]
fn test_breakout_down_fails_single_clause() {
    let config = BuiltinStrategy::BreakoutDown.load().unwrap();
    let result = ScoreEngine::evaluate(&breakout_down_row(0.16), &config);

    assert!(!result.gate_passed);
    assert_eq!(result.failed_gates, vec!["near_lows".to_string()]);
    assert_eq!(result.total_score, 0.0);
    assert_eq!(result.subtotals, Subtotals::ZERO);
    // 표시 필드는 탈락해도 채워집니다.
    assert_eq!(result.aux_display_fields["range_pos"], Some(0.16));
}

#[test]
fn test_breakout_down_boundary_is_inclusive() {
    let config = BuiltinStrategy::BreakoutDown.load().unwrap();
    let result = ScoreEngine::evaluate(&breakout_down_row(0.15), &config);
    assert!(result.gate_passed);
}
