//! 점수 엔진.
//!
//! 하나의 규칙 해석기로 모든 전략(Bullish, Bearish, Breakout-Down)을 계산합니다.
//! 전략 간 차이는 `StrategyConfig` 데이터(부호, 임계값, 포화 스케일)로만 표현됩니다.
//!
//! # 계산 순서
//!
//! 1. 게이트 판정. 탈락하면 총점과 하위 점수는 모두 0
//! 2. 하위 점수기 4개가 각자 규칙 기여도를 합산하고 자기 상한으로 클램프
//! 3. 하위 점수 합을 `[0, 100]`으로 클램프

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use screener_core::numeric::clamp;
use screener_core::{ScoredResult, SubScoreKind, Subtotals, TickerMetricRow};

use crate::gate::Gatekeeper;
use crate::rule::ScoringRule;
use crate::strategy::StrategyConfig;

/// 총점 상한.
pub const MAX_TOTAL_SCORE: f64 = 100.0;

/// 하위 점수기: 규칙 목록과 상한.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScorer {
    pub cap: f64,
    #[serde(default)]
    pub rules: Vec<ScoringRule>,
}

impl SubScorer {
    pub fn new(cap: f64, rules: Vec<ScoringRule>) -> Self {
        Self { cap, rules }
    }

    /// 규칙 기여도 합을 `[0, cap]`으로 제한합니다.
    pub fn score(&self, row: &TickerMetricRow) -> f64 {
        let raw: f64 = self.rules.iter().map(|r| r.contribution(row)).sum();
        clamp(raw, 0.0, self.cap.max(0.0))
    }
}

/// 4개 하위 점수기 묶음.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerSet {
    pub price: SubScorer,
    pub volume: SubScorer,
    pub volatility: SubScorer,
    pub drawdown: SubScorer,
}

impl ScorerSet {
    pub fn get(&self, kind: SubScoreKind) -> &SubScorer {
        match kind {
            SubScoreKind::Price => &self.price,
            SubScoreKind::Volume => &self.volume,
            SubScoreKind::Volatility => &self.volatility,
            SubScoreKind::Drawdown => &self.drawdown,
        }
    }

    /// 고정 순서(가격, 거래량, 변동성, 낙폭)로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (SubScoreKind, &SubScorer)> {
        SubScoreKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    /// 상한 합계.
    pub fn caps_total(&self) -> f64 {
        self.iter().map(|(_, s)| s.cap).sum()
    }
}

/// 게이트를 통과한 행의 점수.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub subtotals: Subtotals,
}

/// 규칙 하나의 기여도 (진단용).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleContribution {
    pub sub_score: SubScoreKind,
    pub label: String,
    pub points: f64,
    pub max_points: f64,
}

/// 규칙 해석기.
pub struct ScoreEngine;

impl ScoreEngine {
    /// 게이트와 무관하게 점수를 계산합니다.
    ///
    /// 게이트 바닥 규칙은 `evaluate`가 적용합니다.
    pub fn score(row: &TickerMetricRow, config: &StrategyConfig) -> ScoreBreakdown {
        let mut subtotals = Subtotals::ZERO;
        for (kind, scorer) in config.scorers.iter() {
            subtotals.set(kind, scorer.score(row));
        }
        let total = clamp(subtotals.sum(), 0.0, MAX_TOTAL_SCORE);
        ScoreBreakdown { total, subtotals }
    }

    /// 게이트 → 점수 → 보조 표시 필드까지 포함한 결과를 만듭니다.
    pub fn evaluate(row: &TickerMetricRow, config: &StrategyConfig) -> ScoredResult {
        let aux = Self::display_fields(row, config);
        let sector = row.sector().map(str::to_string);

        let gate = Gatekeeper::evaluate(row, &config.gate);
        if !gate.passed {
            let failed = gate.failed_groups().into_iter().map(str::to_string).collect();
            return ScoredResult::gate_failed(row.ticker(), sector, failed, aux);
        }

        let breakdown = Self::score(row, config);
        ScoredResult {
            ticker: row.ticker().to_string(),
            sector,
            gate_passed: true,
            failed_gates: Vec::new(),
            total_score: breakdown.total,
            subtotals: breakdown.subtotals,
            aux_display_fields: aux,
        }
    }

    /// 보조 표시 필드를 계산합니다. 정렬이나 비교에는 쓰지 않습니다.
    pub fn display_fields(
        row: &TickerMetricRow,
        config: &StrategyConfig,
    ) -> BTreeMap<String, Option<f64>> {
        config
            .display
            .iter()
            .map(|(name, expr)| (name.clone(), expr.eval(row)))
            .collect()
    }

    /// 규칙별 기여도를 나열합니다.
    pub fn explain(row: &TickerMetricRow, config: &StrategyConfig) -> Vec<RuleContribution> {
        config
            .scorers
            .iter()
            .flat_map(|(kind, scorer)| {
                scorer.rules.iter().enumerate().map(move |(i, rule)| RuleContribution {
                    sub_score: kind,
                    label: rule
                        .label()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{}#{}", kind, i + 1)),
                    points: rule.contribution(row),
                    max_points: rule.max_points(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::MetricExpr;
    use crate::gate::{Clause, Comparator, GateConfig, GateGroup};

    fn strategy() -> StrategyConfig {
        StrategyConfig {
            name: "test".to_string(),
            version: 1,
            description: String::new(),
            gate: GateConfig::new(vec![GateGroup::new(
                "r10",
                vec![Clause::new(MetricExpr::metric("10_day_ret"), Comparator::Ge, 0.02)],
            )]),
            scorers: ScorerSet {
                price: SubScorer::new(
                    45.0,
                    vec![
                        ScoringRule::proportional(MetricExpr::metric("10_day_ret"), 0.10, 40.0),
                        ScoringRule::proportional(MetricExpr::metric("60_day_ret"), 0.10, 40.0),
                    ],
                ),
                volume: SubScorer::new(
                    28.0,
                    vec![ScoringRule::proportional(MetricExpr::metric("abn_vol_60d"), 2.0, 8.0)],
                ),
                volatility: SubScorer::new(22.0, vec![]),
                drawdown: SubScorer::new(5.0, vec![]),
            },
            display: [("ret10".to_string(), MetricExpr::metric("10_day_ret"))]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_sub_scorer_clamped_to_cap() {
        let row = TickerMetricRow::builder("AAA")
            .metric("10_day_ret", 0.5)
            .metric("60_day_ret", 0.5)
            .build();
        let result = ScoreEngine::score(&row, &strategy());
        assert_eq!(result.subtotals.price, 45.0);
        assert_eq!(result.total, 45.0);
    }

    #[test]
    fn test_gate_floor() {
        let row = TickerMetricRow::builder("AAA")
            .metric("10_day_ret", 0.01)
            .metric("60_day_ret", 0.5)
            .metric("abn_vol_60d", 2.0)
            .build();
        let result = ScoreEngine::evaluate(&row, &strategy());
        assert!(!result.gate_passed);
        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.subtotals, Subtotals::ZERO);
        assert_eq!(result.aux_display_fields["ret10"], Some(0.01));
        assert_eq!(result.failed_gates, vec!["r10".to_string()]);
    }

    #[test]
    fn test_evaluate_passing_row() {
        let row = TickerMetricRow::builder("AAA")
            .sector("Technology")
            .metric("10_day_ret", 0.05)
            .metric("abn_vol_60d", 1.0)
            .build();
        let result = ScoreEngine::evaluate(&row, &strategy());
        assert!(result.gate_passed);
        assert!((result.subtotals.price - 20.0).abs() < 1e-9);
        assert!((result.subtotals.volume - 4.0).abs() < 1e-9);
        assert!((result.total_score - 24.0).abs() < 1e-9);
        assert_eq!(result.sector.as_deref(), Some("Technology"));
        assert!(result.failed_gates.is_empty());
    }

    #[test]
    fn test_explain_labels() {
        let row = TickerMetricRow::builder("AAA").metric("10_day_ret", 0.05).build();
        let parts = ScoreEngine::explain(&row, &strategy());
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].label, "price#1");
        assert_eq!(parts[2].sub_score, SubScoreKind::Volume);
    }
}
