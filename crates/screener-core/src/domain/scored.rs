//! 스크리닝 결과 모델.
//!
//! 표현 계층에 넘겨지는 계약입니다. 포맷팅(퍼센트, 소수 자릿수)은 포함하지 않습니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 4개 하위 점수 범주.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubScoreKind {
    Price,
    Volume,
    Volatility,
    Drawdown,
}

impl SubScoreKind {
    /// 고정된 평가 순서.
    pub const ALL: [SubScoreKind; 4] = [
        SubScoreKind::Price,
        SubScoreKind::Volume,
        SubScoreKind::Volatility,
        SubScoreKind::Drawdown,
    ];
}

impl fmt::Display for SubScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubScoreKind::Price => write!(f, "price"),
            SubScoreKind::Volume => write!(f, "volume"),
            SubScoreKind::Volatility => write!(f, "volatility"),
            SubScoreKind::Drawdown => write!(f, "drawdown"),
        }
    }
}

/// 하위 점수 합계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Subtotals {
    pub price: f64,
    pub volume: f64,
    pub volatility: f64,
    pub drawdown: f64,
}

impl Subtotals {
    /// 모든 하위 점수가 0인 값 (게이트 탈락 시).
    pub const ZERO: Subtotals = Subtotals {
        price: 0.0,
        volume: 0.0,
        volatility: 0.0,
        drawdown: 0.0,
    };

    pub fn get(&self, kind: SubScoreKind) -> f64 {
        match kind {
            SubScoreKind::Price => self.price,
            SubScoreKind::Volume => self.volume,
            SubScoreKind::Volatility => self.volatility,
            SubScoreKind::Drawdown => self.drawdown,
        }
    }

    pub fn set(&mut self, kind: SubScoreKind, value: f64) {
        match kind {
            SubScoreKind::Price => self.price = value,
            SubScoreKind::Volume => self.volume = value,
            SubScoreKind::Volatility => self.volatility = value,
            SubScoreKind::Drawdown => self.drawdown = value,
        }
    }

    /// 4개 하위 점수의 합 (클램프 전).
    pub fn sum(&self) -> f64 {
        self.price + self.volume + self.volatility + self.drawdown
    }
}

/// 종목 하나에 대한 전략 실행 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    /// 종목 티커
    pub ticker: String,
    /// 섹터 라벨
    pub sector: Option<String>,
    /// 게이트 통과 여부
    pub gate_passed: bool,
    /// 탈락한 게이트 그룹 이름 (통과 시 비어 있음)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_gates: Vec<String>,
    /// 총점 (게이트 탈락 시 0, 통과 시 0~100)
    pub total_score: f64,
    /// 하위 점수
    pub subtotals: Subtotals,
    /// 점수 옆에 표시되는 보조 지표 (정렬/비교에 쓰이지 않음)
    pub aux_display_fields: BTreeMap<String, Option<f64>>,
}

impl ScoredResult {
    /// 게이트 탈락 결과. 총점과 하위 점수는 무조건 0입니다.
    pub fn gate_failed(
        ticker: impl Into<String>,
        sector: Option<String>,
        failed_gates: Vec<String>,
        aux_display_fields: BTreeMap<String, Option<f64>>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            sector,
            gate_passed: false,
            failed_gates,
            total_score: 0.0,
            subtotals: Subtotals::ZERO,
            aux_display_fields,
        }
    }
}
