//! 지표 표현식.
//!
//! 게이트 조건과 점수 규칙이 참조하는 피연산자입니다. 단일 지표 외에
//! 두 지표의 차이/비율/상대 차이도 데이터로 표현할 수 있습니다.
//!
//! TOML에서는 문자열 하나(`"10_day_ret"`)가 단일 지표를 뜻하고,
//! 복합 표현식은 `kind` 태그를 가진 테이블로 씁니다:
//!
//! ```toml
//! expr = { kind = "rel_diff", num = "moving_avg_20d", den = "moving_avg_50d" }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use screener_core::numeric::{finite, safe_div};
use screener_core::TickerMetricRow;

/// 지표 표현식. 참조한 지표 중 하나라도 null이면 결과도 null입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", from = "ExprRepr")]
pub enum MetricExpr {
    /// 지표 값 그대로
    Metric { code: String },
    /// 절대값
    Abs { code: String },
    /// lhs - rhs
    Diff { lhs: String, rhs: String },
    /// num / den (den == 0이면 null)
    Ratio { num: String, den: String },
    /// num / den - 1
    RelDiff { num: String, den: String },
    /// 모든 지표의 합
    Sum { codes: Vec<String> },
}

/// 역직렬화 전용 표현. 문자열 축약형을 허용합니다.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExprRepr {
    Code(String),
    Tagged(TaggedExpr),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedExpr {
    Metric { code: String },
    Abs { code: String },
    Diff { lhs: String, rhs: String },
    Ratio { num: String, den: String },
    RelDiff { num: String, den: String },
    Sum { codes: Vec<String> },
}

impl From<ExprRepr> for MetricExpr {
    fn from(repr: ExprRepr) -> Self {
        match repr {
            ExprRepr::Code(code) => MetricExpr::Metric { code },
            ExprRepr::Tagged(t) => match t {
                TaggedExpr::Metric { code } => MetricExpr::Metric { code },
                TaggedExpr::Abs { code } => MetricExpr::Abs { code },
                TaggedExpr::Diff { lhs, rhs } => MetricExpr::Diff { lhs, rhs },
                TaggedExpr::Ratio { num, den } => MetricExpr::Ratio { num, den },
                TaggedExpr::RelDiff { num, den } => MetricExpr::RelDiff { num, den },
                TaggedExpr::Sum { codes } => MetricExpr::Sum { codes },
            },
        }
    }
}

impl MetricExpr {
    /// 단일 지표 표현식.
    pub fn metric(code: impl Into<String>) -> Self {
        MetricExpr::Metric { code: code.into() }
    }

    pub fn abs(code: impl Into<String>) -> Self {
        MetricExpr::Abs { code: code.into() }
    }

    pub fn diff(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        MetricExpr::Diff {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    pub fn ratio(num: impl Into<String>, den: impl Into<String>) -> Self {
        MetricExpr::Ratio {
            num: num.into(),
            den: den.into(),
        }
    }

    pub fn rel_diff(num: impl Into<String>, den: impl Into<String>) -> Self {
        MetricExpr::RelDiff {
            num: num.into(),
            den: den.into(),
        }
    }

    pub fn sum<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MetricExpr::Sum {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// 행에 대해 표현식을 평가합니다.
    pub fn eval(&self, row: &TickerMetricRow) -> Option<f64> {
        match self {
            MetricExpr::Metric { code } => row.get(code),
            MetricExpr::Abs { code } => row.get(code).map(f64::abs),
            MetricExpr::Diff { lhs, rhs } => finite(row.get(lhs)? - row.get(rhs)?),
            MetricExpr::Ratio { num, den } => safe_div(row.get(num), row.get(den)),
            MetricExpr::RelDiff { num, den } => {
                safe_div(row.get(num), row.get(den)).map(|r| r - 1.0)
            }
            MetricExpr::Sum { codes } => {
                if codes.is_empty() {
                    return None;
                }
                let mut total = 0.0;
                for code in codes {
                    total += row.get(code)?;
                }
                finite(total)
            }
        }
    }

    /// 참조하는 지표 코드 목록.
    pub fn metric_codes(&self) -> Vec<&str> {
        match self {
            MetricExpr::Metric { code } | MetricExpr::Abs { code } => vec![code.as_str()],
            MetricExpr::Diff { lhs, rhs } => vec![lhs.as_str(), rhs.as_str()],
            MetricExpr::Ratio { num, den } | MetricExpr::RelDiff { num, den } => {
                vec![num.as_str(), den.as_str()]
            }
            MetricExpr::Sum { codes } => codes.iter().map(String::as_str).collect(),
        }
    }

    /// 구조 검증: 빈 지표 코드나 빈 합계는 허용하지 않습니다.
    pub fn validate(&self) -> Result<(), String> {
        let codes = self.metric_codes();
        if codes.is_empty() {
            return Err(format!("expression {} references no metrics", self));
        }
        if codes.iter().any(|c| c.trim().is_empty()) {
            return Err(format!("expression {} has an empty metric code", self));
        }
        Ok(())
    }
}

impl fmt::Display for MetricExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricExpr::Metric { code } => write!(f, "{}", code),
            MetricExpr::Abs { code } => write!(f, "abs({})", code),
            MetricExpr::Diff { lhs, rhs } => write!(f, "{} - {}", lhs, rhs),
            MetricExpr::Ratio { num, den } => write!(f, "{} / {}", num, den),
            MetricExpr::RelDiff { num, den } => write!(f, "{} / {} - 1", num, den),
            MetricExpr::Sum { codes } => write!(f, "sum({})", codes.join(", ")),
        }
    }
}
