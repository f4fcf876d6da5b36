//! 게이트키퍼.
//!
//! 점수 계산 전에 종목이 전략 대상인지 판정하는 술어입니다.
//!
//! # 결합 규칙
//!
//! - 그룹 안의 조건은 OR (`any_of`)
//! - 그룹 사이는 AND
//! - 참조한 지표가 null인 조건은 항상 false
//!
//! 예: "가격 조건 AND (거래량 조건 A OR 거래량 조건 B)"는
//! 그룹 3개(가격 10일, 가격 60일, 거래량)로 표현합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use screener_core::TickerMetricRow;

use crate::expr::MetricExpr;

/// 비교 연산자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl Comparator {
    /// `value op threshold`를 평가합니다.
    #[inline]
    pub fn test(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Ge => value >= threshold,
            Comparator::Le => value <= threshold,
            Comparator::Gt => value > threshold,
            Comparator::Lt => value < threshold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">=" => Ok(Comparator::Ge),
            "<=" => Ok(Comparator::Le),
            ">" => Ok(Comparator::Gt),
            "<" => Ok(Comparator::Lt),
            other => Err(format!("Unknown comparator: {}", other)),
        }
    }
}

/// 단일 조건 `(expr, op, threshold)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub expr: MetricExpr,
    pub op: Comparator,
    pub threshold: f64,
}

impl Clause {
    pub fn new(expr: MetricExpr, op: Comparator, threshold: f64) -> Self {
        Self { expr, op, threshold }
    }

    /// 조건을 평가합니다. 값이 null이면 false.
    pub fn evaluate(&self, row: &TickerMetricRow) -> bool {
        self.expr
            .eval(row)
            .is_some_and(|v| self.op.test(v, self.threshold))
    }

    pub fn validate(&self) -> Result<(), String> {
        self.expr.validate()?;
        if !self.threshold.is_finite() {
            return Err(format!("clause on {} has non-finite threshold", self.expr));
        }
        Ok(())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expr, self.op, self.threshold)
    }
}

/// 조건 그룹. 하나라도 참이면 통과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateGroup {
    pub name: String,
    pub any_of: Vec<Clause>,
}

impl GateGroup {
    pub fn new(name: impl Into<String>, any_of: Vec<Clause>) -> Self {
        Self {
            name: name.into(),
            any_of,
        }
    }

    pub fn passes(&self, row: &TickerMetricRow) -> bool {
        self.any_of.iter().any(|c| c.evaluate(row))
    }
}

/// 전략의 게이트 정의. 모든 그룹이 통과해야 합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub groups: Vec<GateGroup>,
}

impl GateConfig {
    pub fn new(groups: Vec<GateGroup>) -> Self {
        Self { groups }
    }

    /// 그룹이나 조건이 비어 있으면 에러.
    pub fn validate(&self) -> Result<(), String> {
        if self.groups.is_empty() {
            return Err("gate has no groups".to_string());
        }
        for group in &self.groups {
            if group.any_of.is_empty() {
                return Err(format!("gate group '{}' has no clauses", group.name));
            }
            for clause in &group.any_of {
                clause
                    .validate()
                    .map_err(|e| format!("gate group '{}': {}", group.name, e))?;
            }
        }
        Ok(())
    }

    /// 참조하는 지표 코드 목록 (중복 포함).
    pub fn metric_codes(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.any_of.iter())
            .flat_map(|c| c.expr.metric_codes())
    }
}

/// 그룹별 판정 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupOutcome {
    pub name: String,
    pub passed: bool,
}

/// 게이트 진단 보고서.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateReport {
    pub passed: bool,
    pub groups: Vec<GroupOutcome>,
}

impl GateReport {
    /// 탈락한 그룹 이름 목록.
    pub fn failed_groups(&self) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|g| !g.passed)
            .map(|g| g.name.as_str())
            .collect()
    }
}

/// 게이트 판정기. 상태가 없는 순수 함수 모음입니다.
pub struct Gatekeeper;

impl Gatekeeper {
    /// 행이 게이트를 통과하는지 판정합니다.
    ///
    /// 그룹이 하나도 없는 게이트는 통과시키지 않습니다.
    pub fn passes(row: &TickerMetricRow, gate: &GateConfig) -> bool {
        !gate.groups.is_empty() && gate.groups.iter().all(|g| g.passes(row))
    }

    /// 그룹별 결과를 포함한 판정. 모든 그룹을 평가합니다.
    pub fn evaluate(row: &TickerMetricRow, gate: &GateConfig) -> GateReport {
        let groups: Vec<GroupOutcome> = gate
            .groups
            .iter()
            .map(|g| GroupOutcome {
                name: g.name.clone(),
                passed: g.passes(row),
            })
            .collect();
        let passed = !groups.is_empty() && groups.iter().all(|g| g.passed);
        GateReport { passed, groups }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullish_gate() -> GateConfig {
        GateConfig::new(vec![
            GateGroup::new(
                "short_return",
                vec![Clause::new(MetricExpr::metric("10_day_ret"), Comparator::Ge, 0.02)],
            ),
            GateGroup::new(
                "medium_return",
                vec![Clause::new(MetricExpr::metric("60_day_ret"), Comparator::Ge, 0.05)],
            ),
            GateGroup::new(
                "volume_confirmation",
                vec![
                    Clause::new(MetricExpr::metric("abn_vol_60d"), Comparator::Gt, 0.3),
                    Clause::new(
                        MetricExpr::metric("60d_price_dollarVolume_correlation"),
                        Comparator::Gt,
                        0.5,
                    ),
                ],
            ),
        ])
    }

    #[test]
    fn test_comparator_boundaries() {
        assert!(Comparator::Ge.test(0.02, 0.02));
        assert!(!Comparator::Gt.test(0.02, 0.02));
        assert!(Comparator::Le.test(-0.05, -0.05));
        assert!(!Comparator::Lt.test(-0.05, -0.05));
        assert_eq!(">=".parse::<Comparator>().unwrap(), Comparator::Ge);
        assert!("==".parse::<Comparator>().is_err());
    }

    #[test]
    fn test_gate_passes_with_one_volume_clause() {
        let row = TickerMetricRow::builder("AAA")
            .metric("10_day_ret", 0.03)
            .metric("60_day_ret", 0.06)
            .metric("abn_vol_60d", 0.5)
            .build();
        assert!(Gatekeeper::passes(&row, &bullish_gate()));
    }

    #[test]
    fn test_gate_fails_when_or_group_all_null() {
        let row = TickerMetricRow::builder("AAA")
            .metric("10_day_ret", 0.03)
            .metric("60_day_ret", 0.06)
            .build();
        let report = Gatekeeper::evaluate(&row, &bullish_gate());
        assert!(!report.passed);
        assert_eq!(report.failed_groups(), vec!["volume_confirmation"]);
        assert!(!Gatekeeper::passes(&row, &bullish_gate()));
    }

    #[test]
    fn test_null_clause_is_false_for_every_comparator() {
        let row = TickerMetricRow::empty("AAA");
        for op in [Comparator::Ge, Comparator::Le, Comparator::Gt, Comparator::Lt] {
            let clause = Clause::new(MetricExpr::metric("x"), op, 0.0);
            assert!(!clause.evaluate(&row));
        }
    }

    #[test]
    fn test_empty_gate_never_passes_and_is_invalid() {
        let gate = GateConfig::default();
        let row = TickerMetricRow::builder("AAA").metric("x", 1.0).build();
        assert!(!Gatekeeper::passes(&row, &gate));
        assert!(gate.validate().is_err());

        let empty_group = GateConfig::new(vec![GateGroup::new("g", vec![])]);
        assert!(empty_group.validate().is_err());
    }

    #[test]
    fn test_unknown_comparator_rejected_on_load() {
        let res: Result<GateConfig, _> = toml::from_str(
            r#"
[[groups]]
name = "bad"
any_of = [{ expr = "10_day_ret", op = "=>", threshold = 0.02 }]
"#,
        );
        assert!(res.is_err());
    }
}
