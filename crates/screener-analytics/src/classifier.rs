//! 분류기.
//!
//! 단일 지표 값(또는 작은 튜플)을 이산 범주로 매핑하는 순수 함수들입니다.
//!
//! - 변동성 체제: 구간표(`BreakpointTable`)로 분류
//! - 가격 레벨: 대칭 모멘텀 밴드 + 이동평균 교차 보정 (-3..3)
//! - 방향: 부호 기반 (불감대 지원)
//!
//! null 값은 항상 "알 수 없음" 라벨이 되며, 실제 구간으로 대체되지 않습니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use screener_core::numeric::finite_opt;

/// 구간 라벨. null 입력에 대한 센티널을 제공합니다.
pub trait BucketLabel: Copy {
    fn unknown() -> Self;
}

/// 구간 경계: `value < upper`이면 `label`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint<L> {
    pub upper: f64,
    pub label: L,
}

/// 오름차순 상한 목록에서 첫 번째로 `value < upper`인 구간의 라벨을 반환합니다.
///
/// 어떤 구간에도 속하지 않으면 `overflow`, 값이 null이면 `L::unknown()`.
pub fn classify<L: BucketLabel>(value: Option<f64>, breakpoints: &[Breakpoint<L>], overflow: L) -> L {
    let Some(v) = finite_opt(value) else {
        return L::unknown();
    };
    breakpoints
        .iter()
        .find(|bp| v < bp.upper)
        .map_or(overflow, |bp| bp.label)
}

/// 구간표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakpointTable<L> {
    pub breakpoints: Vec<Breakpoint<L>>,
    pub overflow: L,
}

impl<L: BucketLabel> BreakpointTable<L> {
    /// 구간표를 생성합니다. 상한은 유한하고 엄격히 증가해야 합니다.
    pub fn new(breakpoints: Vec<(f64, L)>, overflow: L) -> Result<Self, String> {
        let table = Self {
            breakpoints: breakpoints
                .into_iter()
                .map(|(upper, label)| Breakpoint { upper, label })
                .collect(),
            overflow,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), String> {
        for bp in &self.breakpoints {
            if !bp.upper.is_finite() {
                return Err(format!("breakpoint upper bound {} is not finite", bp.upper));
            }
        }
        for pair in self.breakpoints.windows(2) {
            if pair[1].upper <= pair[0].upper {
                return Err(format!(
                    "breakpoints must be strictly ascending: {} then {}",
                    pair[0].upper, pair[1].upper
                ));
            }
        }
        Ok(())
    }

    pub fn classify(&self, value: Option<f64>) -> L {
        classify(value, &self.breakpoints, self.overflow)
    }
}

// =============================================================================
// 변동성 체제
// =============================================================================

/// 변동성 체제.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    Unknown,
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl BucketLabel for VolatilityRegime {
    fn unknown() -> Self {
        VolatilityRegime::Unknown
    }
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolatilityRegime::Unknown => "Unknown",
            VolatilityRegime::VeryLow => "Very Low",
            VolatilityRegime::Low => "Low",
            VolatilityRegime::Medium => "Medium",
            VolatilityRegime::High => "High",
            VolatilityRegime::VeryHigh => "Very High",
        };
        f.write_str(s)
    }
}

// =============================================================================
// 가격 레벨
// =============================================================================

/// 가격 모멘텀 레벨 (-3..=3) 또는 알 수 없음.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceLevel(Option<i8>);

impl PriceLevel {
    pub const MIN: i8 = -3;
    pub const MAX: i8 = 3;

    /// 범위를 벗어난 값은 경계로 잘립니다.
    pub fn new(level: i8) -> Self {
        PriceLevel(Some(level.clamp(Self::MIN, Self::MAX)))
    }

    pub fn value(self) -> Option<i8> {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self.0.is_none()
    }

    /// 레벨을 `delta`만큼 옮기되 `[MIN, MAX]`를 넘지 않습니다.
    pub fn bump(self, delta: i8) -> Self {
        match self.0 {
            None => self,
            Some(l) => PriceLevel::new(l.saturating_add(delta)),
        }
    }
}

impl BucketLabel for PriceLevel {
    fn unknown() -> Self {
        PriceLevel(None)
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("?"),
            Some(l) if l > 0 => write!(f, "+{}", l),
            Some(l) => write!(f, "{}", l),
        }
    }
}

/// 대칭 모멘텀 밴드.
///
/// `r >= strong ⇒ 3`, `r >= moderate ⇒ 2`, `r > 0 ⇒ 1`, 음수 쪽도 대칭, `0 ⇒ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumBands {
    pub strong: f64,
    pub moderate: f64,
}

impl MomentumBands {
    pub fn new(strong: f64, moderate: f64) -> Self {
        Self { strong, moderate }
    }

    pub fn validate(&self) -> Result<(), String> {
        let ok = self.strong.is_finite()
            && self.moderate.is_finite()
            && self.moderate > 0.0
            && self.strong > self.moderate;
        if !ok {
            return Err(format!(
                "momentum bands need 0 < moderate < strong, got moderate={} strong={}",
                self.moderate, self.strong
            ));
        }
        Ok(())
    }

    /// 수익률에서 기본 레벨을 계산합니다.
    pub fn level(&self, ret: Option<f64>) -> PriceLevel {
        let Some(r) = finite_opt(ret) else {
            return PriceLevel::unknown();
        };
        let level = if r >= self.strong {
            3
        } else if r >= self.moderate {
            2
        } else if r > 0.0 {
            1
        } else if r <= -self.strong {
            -3
        } else if r <= -self.moderate {
            -2
        } else if r < 0.0 {
            -1
        } else {
            0
        };
        PriceLevel::new(level)
    }
}

/// 이동평균 교차 보정값: 빠른 선이 위면 +1, 아래면 -1, 같거나 null이면 0.
pub fn crossover_bump(fast: Option<f64>, slow: Option<f64>) -> i8 {
    match (finite_opt(fast), finite_opt(slow)) {
        (Some(f), Some(s)) if f > s => 1,
        (Some(f), Some(s)) if f < s => -1,
        _ => 0,
    }
}

// =============================================================================
// 방향
// =============================================================================

/// 부호 기반 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Flat,
    Unknown,
}

impl BucketLabel for Direction {
    fn unknown() -> Self {
        Direction::Unknown
    }
}

impl Direction {
    /// `|v| <= dead_band`이면 Flat. 불감대 0이면 정확히 0만 Flat입니다.
    pub fn classify(value: Option<f64>, dead_band: f64) -> Direction {
        match finite_opt(value) {
            None => Direction::Unknown,
            Some(v) if v > dead_band => Direction::Up,
            Some(v) if v < -dead_band => Direction::Down,
            Some(_) => Direction::Flat,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Flat => "•",
            Direction::Unknown => "?",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Flat => "Flat",
            Direction::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_vol() -> BreakpointTable<VolatilityRegime> {
        BreakpointTable::new(
            vec![
                (0.01, VolatilityRegime::Low),
                (0.02, VolatilityRegime::Medium),
                (0.03, VolatilityRegime::High),
            ],
            VolatilityRegime::VeryHigh,
        )
        .unwrap()
    }

    #[test]
    fn test_volatility_regime_buckets() {
        let t = short_vol();
        assert_eq!(t.classify(Some(0.025)), VolatilityRegime::High);
        assert_eq!(t.classify(Some(0.005)), VolatilityRegime::Low);
        assert_eq!(t.classify(Some(0.01)), VolatilityRegime::Medium);
        assert_eq!(t.classify(Some(0.03)), VolatilityRegime::VeryHigh);
        assert_eq!(t.classify(Some(1.0)), VolatilityRegime::VeryHigh);
    }

    #[test]
    fn test_null_is_unknown() {
        assert_eq!(short_vol().classify(None), VolatilityRegime::Unknown);
        assert_eq!(short_vol().classify(Some(f64::NAN)), VolatilityRegime::Unknown);
        assert!(MomentumBands::new(0.10, 0.05).level(None).is_unknown());
        assert_eq!(Direction::classify(None, 0.0), Direction::Unknown);
    }

    #[test]
    fn test_table_rejects_unsorted() {
        let res = BreakpointTable::new(
            vec![(0.02, VolatilityRegime::Low), (0.01, VolatilityRegime::Medium)],
            VolatilityRegime::High,
        );
        assert!(res.is_err());
        let dup = BreakpointTable::new(
            vec![(0.02, VolatilityRegime::Low), (0.02, VolatilityRegime::Medium)],
            VolatilityRegime::High,
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_momentum_levels() {
        let b = MomentumBands::new(0.10, 0.05);
        let lv = |r: f64| b.level(Some(r)).value();
        assert_eq!(lv(0.12), Some(3));
        assert_eq!(lv(0.10), Some(3));
        assert_eq!(lv(0.07), Some(2));
        assert_eq!(lv(0.01), Some(1));
        assert_eq!(lv(0.0), Some(0));
        assert_eq!(lv(-0.01), Some(-1));
        assert_eq!(lv(-0.05), Some(-2));
        assert_eq!(lv(-0.5), Some(-3));
    }

    #[test]
    fn test_bump_never_leaves_range() {
        assert_eq!(PriceLevel::new(3).bump(1).value(), Some(3));
        assert_eq!(PriceLevel::new(-3).bump(-1).value(), Some(-3));
        assert_eq!(PriceLevel::new(1).bump(1).value(), Some(2));
        assert_eq!(PriceLevel::new(0).bump(i8::MIN).value(), Some(-3));
        assert!(PriceLevel::unknown().bump(1).is_unknown());
    }

    #[test]
    fn test_crossover_bump() {
        assert_eq!(crossover_bump(Some(110.0), Some(100.0)), 1);
        assert_eq!(crossover_bump(Some(90.0), Some(100.0)), -1);
        assert_eq!(crossover_bump(Some(100.0), Some(100.0)), 0);
        assert_eq!(crossover_bump(None, Some(100.0)), 0);
    }

    #[test]
    fn test_direction_dead_band() {
        assert_eq!(Direction::classify(Some(0.01), 0.0), Direction::Up);
        assert_eq!(Direction::classify(Some(-0.01), 0.0), Direction::Down);
        assert_eq!(Direction::classify(Some(0.0), 0.0), Direction::Flat);
        assert_eq!(Direction::classify(Some(0.004), 0.005), Direction::Flat);
        assert_eq!(Direction::classify(Some(-0.006), 0.005), Direction::Down);
    }

    #[test]
    fn test_price_level_display() {
        assert_eq!(PriceLevel::new(2).to_string(), "+2");
        assert_eq!(PriceLevel::new(-1).to_string(), "-1");
        assert_eq!(PriceLevel::unknown().to_string(), "?");
    }
}
