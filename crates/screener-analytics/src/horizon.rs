//! 기간별 분류 설정.
//!
//! 단기/중기/장기는 같은 종류의 지표(수익률, 연율 변동성)에 서로 다른
//! 구간표를 사용합니다. 구간표는 코드가 아니라 이 설정으로 전달됩니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use screener_core::{ScreenerError, ScreenerResult};

use crate::classifier::{BreakpointTable, MomentumBands, VolatilityRegime};
use crate::expr::MetricExpr;

/// 분석 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Short,
    Medium,
    Long,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::Short, Horizon::Medium, Horizon::Long];
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::Short => write!(f, "short-term"),
            Horizon::Medium => write!(f, "medium-term"),
            Horizon::Long => write!(f, "long-term"),
        }
    }
}

/// 이동평균 교차 보정에 쓰는 두 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaCrossover {
    pub fast: String,
    pub slow: String,
}

/// 한 기간의 분류 규칙.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonSpec {
    /// 가격 레벨 기준 수익률 지표
    pub price_metric: String,
    pub bands: MomentumBands,
    /// 가격 레벨 보정용 이동평균 교차
    #[serde(default)]
    pub crossover: Option<MaCrossover>,
    /// 수익률 변화 방향 지표
    #[serde(default)]
    pub return_direction: Option<MetricExpr>,
    /// 변동성 지표
    pub volatility_metric: String,
    pub volatility: BreakpointTable<VolatilityRegime>,
    /// 거래량 방향 지표
    #[serde(default)]
    pub volume_direction: Option<MetricExpr>,
    /// 방향 판정 불감대
    #[serde(default)]
    pub dead_band: f64,
}

impl HorizonSpec {
    pub fn validate(&self) -> Result<(), String> {
        self.bands.validate()?;
        self.volatility.validate()?;
        if self.price_metric.trim().is_empty() || self.volatility_metric.trim().is_empty() {
            return Err("metric code is empty".to_string());
        }
        if !self.dead_band.is_finite() || self.dead_band < 0.0 {
            return Err(format!("dead_band must be finite and non-negative, got {}", self.dead_band));
        }
        if let Some(expr) = &self.return_direction {
            expr.validate()?;
        }
        if let Some(expr) = &self.volume_direction {
            expr.validate()?;
        }
        Ok(())
    }

    pub fn metric_codes(&self) -> Vec<&str> {
        let mut codes = vec![self.price_metric.as_str(), self.volatility_metric.as_str()];
        if let Some(x) = &self.crossover {
            codes.push(x.fast.as_str());
            codes.push(x.slow.as_str());
        }
        if let Some(expr) = &self.return_direction {
            codes.extend(expr.metric_codes());
        }
        if let Some(expr) = &self.volume_direction {
            codes.extend(expr.metric_codes());
        }
        codes
    }
}

/// 3개 기간의 분류 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    pub short: HorizonSpec,
    pub medium: HorizonSpec,
    pub long: HorizonSpec,
}

impl ClassificationConfig {
    pub fn get(&self, horizon: Horizon) -> &HorizonSpec {
        match horizon {
            Horizon::Short => &self.short,
            Horizon::Medium => &self.medium,
            Horizon::Long => &self.long,
        }
    }

    /// TOML 문자열에서 로드하고 검증합니다.
    pub fn from_toml_str(source: &str) -> ScreenerResult<Self> {
        let config: ClassificationConfig = toml::from_str(source)
            .map_err(|e| ScreenerError::Config(format!("classification parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> ScreenerResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> ScreenerResult<()> {
        for horizon in Horizon::ALL {
            self.get(horizon)
                .validate()
                .map_err(|e| ScreenerError::Config(format!("{} classification: {}", horizon, e)))?;
        }
        Ok(())
    }

    /// 모든 기간이 참조하는 지표 코드 (정렬, 중복 제거).
    pub fn required_metrics(&self) -> Vec<String> {
        Horizon::ALL
            .iter()
            .flat_map(|h| self.get(*h).metric_codes())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn test_builtin_tables_differ_by_horizon() {
        let config = presets::default_classification().unwrap();
        let short = &config.short.volatility;
        let long = &config.long.volatility;

        // 같은 값이라도 기간에 따라 다른 체제
        assert_eq!(short.classify(Some(0.015)), VolatilityRegime::Medium);
        assert_eq!(long.classify(Some(0.015)), VolatilityRegime::High);
        assert_ne!(short, long);
    }

    #[test]
    fn test_invalid_bands_rejected() {
        let source = presets::CLASSIFICATION_TOML.replacen("moderate = 0.05", "moderate = 0.5", 1);
        assert!(ClassificationConfig::from_toml_str(&source).is_err());
    }

    #[test]
    fn test_required_metrics() {
        let config = presets::default_classification().unwrap();
        let codes = config.required_metrics();
        assert!(codes.contains(&"15d_volatility".to_string()));
        assert!(codes.contains(&"moving_avg_200d".to_string()));
        assert!(codes.contains(&"vol_accel_5d".to_string()));
    }
}
