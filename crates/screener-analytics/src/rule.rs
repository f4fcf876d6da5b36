//! 점수 규칙.
//!
//! 하위 점수기는 규칙 목록의 기여도를 합산합니다. 규칙은 세 가지입니다:
//!
//! - **flat_bonus**: 조건 중 하나라도 참이면 고정 점수 (확인 신호)
//! - **proportional**: `points × clamp(sign·x / scale, 0, 1)` (정도에 비례)
//! - **step**: 첫 번째로 맞는 구간의 점수
//!
//! 모든 기여도는 `[0, max_points]`로 제한되고, 참조 값이 null이면 0입니다.

use serde::{Deserialize, Serialize};

use screener_core::numeric::clamp;
use screener_core::TickerMetricRow;

use crate::expr::MetricExpr;
use crate::gate::{Clause, Comparator};

/// 비례 규칙의 방향.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// 양수 크기에 점수
    #[default]
    Positive,
    /// 음수 크기에 점수
    Negative,
}

/// 계단 규칙의 구간.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTier {
    pub op: Comparator,
    pub threshold: f64,
    pub points: f64,
}

/// 점수 규칙.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoringRule {
    /// 조건 중 하나라도 참이면 `points`.
    FlatBonus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        when: Vec<Clause>,
        points: f64,
    },
    /// `points × f`, `f = clamp(sign·x / scale, 0, 1)`. `invert`이면 `1 - f`.
    Proportional {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        expr: MetricExpr,
        scale: f64,
        points: f64,
        #[serde(default)]
        direction: Polarity,
        #[serde(default)]
        invert: bool,
    },
    /// 첫 번째로 맞는 구간의 점수, 없으면 `otherwise`.
    Step {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        expr: MetricExpr,
        tiers: Vec<StepTier>,
        #[serde(default)]
        otherwise: f64,
    },
}

impl ScoringRule {
    pub fn flat_bonus(when: Vec<Clause>, points: f64) -> Self {
        ScoringRule::FlatBonus {
            label: None,
            when,
            points,
        }
    }

    pub fn proportional(expr: MetricExpr, scale: f64, points: f64) -> Self {
        ScoringRule::Proportional {
            label: None,
            expr,
            scale,
            points,
            direction: Polarity::Positive,
            invert: false,
        }
    }

    /// 방향을 바꿉니다. 비례 규칙이 아니면 그대로 반환합니다.
    pub fn negative(mut self) -> Self {
        if let ScoringRule::Proportional { direction, .. } = &mut self {
            *direction = Polarity::Negative;
        }
        self
    }

    /// 역비례로 바꿉니다. 비례 규칙이 아니면 그대로 반환합니다.
    pub fn inverted(mut self) -> Self {
        if let ScoringRule::Proportional { invert, .. } = &mut self {
            *invert = true;
        }
        self
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ScoringRule::FlatBonus { label, .. }
            | ScoringRule::Proportional { label, .. }
            | ScoringRule::Step { label, .. } => label.as_deref(),
        }
    }

    /// 규칙이 줄 수 있는 최대 점수.
    pub fn max_points(&self) -> f64 {
        match self {
            ScoringRule::FlatBonus { points, .. } | ScoringRule::Proportional { points, .. } => {
                *points
            }
            ScoringRule::Step {
                tiers, otherwise, ..
            } => tiers.iter().map(|t| t.points).fold(*otherwise, f64::max),
        }
    }

    /// 행에 대한 기여도. 항상 `[0, max_points]` 안입니다.
    pub fn contribution(&self, row: &TickerMetricRow) -> f64 {
        let raw = match self {
            ScoringRule::FlatBonus { when, points, .. } => {
                if when.iter().any(|c| c.evaluate(row)) {
                    *points
                } else {
                    0.0
                }
            }
            ScoringRule::Proportional {
                expr,
                scale,
                points,
                direction,
                invert,
                ..
            } => match expr.eval(row) {
                None => 0.0,
                Some(x) => {
                    let signed = match direction {
                        Polarity::Positive => x,
                        Polarity::Negative => -x,
                    };
                    let frac = clamp(signed / scale, 0.0, 1.0);
                    let frac = if *invert { 1.0 - frac } else { frac };
                    points * frac
                }
            },
            ScoringRule::Step {
                expr,
                tiers,
                otherwise,
                ..
            } => match expr.eval(row) {
                None => 0.0,
                Some(x) => tiers
                    .iter()
                    .find(|t| t.op.test(x, t.threshold))
                    .map_or(*otherwise, |t| t.points),
            },
        };

        let max = self.max_points().max(0.0);
        if raw.is_finite() {
            clamp(raw, 0.0, max)
        } else {
            0.0
        }
    }

    /// 참조하는 지표 코드 목록.
    pub fn metric_codes(&self) -> Vec<&str> {
        match self {
            ScoringRule::FlatBonus { when, .. } => {
                when.iter().flat_map(|c| c.expr.metric_codes()).collect()
            }
            ScoringRule::Proportional { expr, .. } | ScoringRule::Step { expr, .. } => {
                expr.metric_codes()
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let check_points = |p: f64| -> Result<(), String> {
            if !p.is_finite() || p < 0.0 {
                return Err(format!("points must be finite and non-negative, got {}", p));
            }
            Ok(())
        };

        match self {
            ScoringRule::FlatBonus { when, points, .. } => {
                check_points(*points)?;
                if when.is_empty() {
                    return Err("flat_bonus rule has no conditions".to_string());
                }
                for clause in when {
                    clause.validate()?;
                }
            }
            ScoringRule::Proportional {
                expr,
                scale,
                points,
                ..
            } => {
                check_points(*points)?;
                expr.validate()?;
                if !scale.is_finite() || *scale <= 0.0 {
                    return Err(format!("proportional rule on {} needs scale > 0, got {}", expr, scale));
                }
            }
            ScoringRule::Step {
                expr,
                tiers,
                otherwise,
                ..
            } => {
                expr.validate()?;
                check_points(*otherwise)?;
                if tiers.is_empty() {
                    return Err(format!("step rule on {} has no tiers", expr));
                }
                for tier in tiers {
                    check_points(tier.points)?;
                    if !tier.threshold.is_finite() {
                        return Err(format!("step rule on {} has non-finite threshold", expr));
                    }
                }
            }
        }
        Ok(())
    }
}
