//! 내장 전략, 필터 스크린, 분류 설정.
//!
//! 문서는 `presets/` 디렉토리의 TOML로 관리되며 빌드 시 바이너리에 포함됩니다.

use std::fmt;
use std::str::FromStr;

use screener_core::ScreenerResult;

use crate::filter_screen::FilterScreenConfig;
use crate::horizon::ClassificationConfig;
use crate::strategy::StrategyConfig;

pub const BULLISH_TOML: &str = include_str!("../presets/bullish.toml");
pub const BEARISH_TOML: &str = include_str!("../presets/bearish.toml");
pub const BREAKOUT_DOWN_TOML: &str = include_str!("../presets/breakout_down.toml");
pub const GROWTH_TOML: &str = include_str!("../presets/growth.toml");
pub const EFFICIENCY_TOML: &str = include_str!("../presets/efficiency.toml");
pub const CLASSIFICATION_TOML: &str = include_str!("../presets/classification.toml");

/// 내장 점수 전략.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinStrategy {
    Bullish,
    Bearish,
    BreakoutDown,
}

impl BuiltinStrategy {
    pub const ALL: [BuiltinStrategy; 3] = [
        BuiltinStrategy::Bullish,
        BuiltinStrategy::Bearish,
        BuiltinStrategy::BreakoutDown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinStrategy::Bullish => "bullish",
            BuiltinStrategy::Bearish => "bearish",
            BuiltinStrategy::BreakoutDown => "breakout_down",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            BuiltinStrategy::Bullish => BULLISH_TOML,
            BuiltinStrategy::Bearish => BEARISH_TOML,
            BuiltinStrategy::BreakoutDown => BREAKOUT_DOWN_TOML,
        }
    }

    pub fn load(self) -> ScreenerResult<StrategyConfig> {
        StrategyConfig::from_toml_str(self.source())
    }
}

impl fmt::Display for BuiltinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "bullish" => Ok(BuiltinStrategy::Bullish),
            "bearish" => Ok(BuiltinStrategy::Bearish),
            "breakout_down" | "breakdown" => Ok(BuiltinStrategy::BreakoutDown),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

/// 내장 필터 스크린.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFilter {
    Growth,
    Efficiency,
}

impl BuiltinFilter {
    pub const ALL: [BuiltinFilter; 2] = [BuiltinFilter::Growth, BuiltinFilter::Efficiency];

    pub fn source(self) -> &'static str {
        match self {
            BuiltinFilter::Growth => GROWTH_TOML,
            BuiltinFilter::Efficiency => EFFICIENCY_TOML,
        }
    }

    pub fn load(self) -> ScreenerResult<FilterScreenConfig> {
        FilterScreenConfig::from_toml_str(self.source())
    }
}

impl FromStr for BuiltinFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "growth" => Ok(BuiltinFilter::Growth),
            "efficiency" => Ok(BuiltinFilter::Efficiency),
            _ => Err(format!("Unknown filter screen: {}", s)),
        }
    }
}

/// 내장 전략 3개를 모두 로드합니다.
pub fn builtin_strategies() -> ScreenerResult<Vec<StrategyConfig>> {
    BuiltinStrategy::ALL.iter().map(|s| s.load()).collect()
}

/// 기본 기간별 분류 설정.
pub fn default_classification() -> ScreenerResult<ClassificationConfig> {
    ClassificationConfig::from_toml_str(CLASSIFICATION_TOML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtins_load_and_caps_sum_to_100() {
        for strategy in BuiltinStrategy::ALL {
            let config = strategy.load().unwrap();
            assert_eq!(config.name, strategy.name());
            assert!((config.scorers.caps_total() - 100.0).abs() < 1e-9);
        }
        for filter in BuiltinFilter::ALL {
            assert!(filter.load().is_ok());
        }
        assert!(default_classification().is_ok());
    }

    #[test]
    fn test_observed_cap_layouts() {
        let caps = |s: BuiltinStrategy| {
            let c = s.load().unwrap();
            (c.scorers.price.cap, c.scorers.volume.cap, c.scorers.volatility.cap, c.scorers.drawdown.cap)
        };
        assert_eq!(caps(BuiltinStrategy::Bullish), (45.0, 28.0, 22.0, 5.0));
        assert_eq!(caps(BuiltinStrategy::Bearish), (45.0, 28.0, 22.0, 5.0));
        assert_eq!(caps(BuiltinStrategy::BreakoutDown), (40.0, 25.0, 25.0, 10.0));
    }

    #[test]
    fn test_rule_points_never_exceed_caps() {
        // 내장 전략은 규칙 최대 점수 합이 상한을 넘지 않음 (Bullish/Bearish 가격은 42/45)
        for strategy in BuiltinStrategy::ALL {
            let config = strategy.load().unwrap();
            for (kind, scorer) in config.scorers.iter() {
                let max: f64 = scorer.rules.iter().map(|r| r.max_points()).sum();
                assert!(
                    max <= scorer.cap + 1e-9,
                    "{} {} rules max {} > cap {}",
                    strategy,
                    kind,
                    max,
                    scorer.cap
                );
            }
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Bullish".parse::<BuiltinStrategy>().unwrap(), BuiltinStrategy::Bullish);
        assert_eq!(
            "breakout-down".parse::<BuiltinStrategy>().unwrap(),
            BuiltinStrategy::BreakoutDown
        );
        assert!("sideways".parse::<BuiltinStrategy>().is_err());
        assert_eq!("growth".parse::<BuiltinFilter>().unwrap(), BuiltinFilter::Growth);
    }
}
