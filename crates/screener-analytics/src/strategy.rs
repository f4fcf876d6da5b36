//! 전략 설정.
//!
//! 전략은 코드가 아닌 데이터입니다. TOML 문서 하나가 게이트, 4개 하위 점수기,
//! 보조 표시 필드를 정의하며, 로드 시점에 검증을 통과하지 못하면 실행되지 않습니다.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use screener_core::{ScreenerError, ScreenerResult};

use crate::expr::MetricExpr;
use crate::gate::GateConfig;
use crate::score::{ScorerSet, MAX_TOTAL_SCORE};

/// 상한 합계 허용 오차.
const CAP_SUM_TOLERANCE: f64 = 1e-9;

fn default_version() -> u32 {
    1
}

/// 이름과 버전이 있는 전략 정의.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub description: String,
    pub gate: GateConfig,
    pub scorers: ScorerSet,
    /// 표시 이름 → 표현식
    #[serde(default)]
    pub display: BTreeMap<String, MetricExpr>,
}

impl StrategyConfig {
    /// TOML 문자열에서 전략을 로드하고 검증합니다.
    pub fn from_toml_str(source: &str) -> ScreenerResult<Self> {
        let config: StrategyConfig = toml::from_str(source)
            .map_err(|e| ScreenerError::Config(format!("strategy parse error: {}", e)))?;
        config.validate()?;
        debug!(strategy = %config.name, version = config.version, "Strategy loaded");
        Ok(config)
    }

    /// 파일에서 전략을 로드합니다.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ScreenerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source).map_err(|e| match e {
            ScreenerError::Config(msg) => {
                ScreenerError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// 디렉토리의 모든 `*.toml` 전략을 파일명 순으로 로드합니다.
    ///
    /// 하나라도 잘못되면 전체가 실패합니다.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> ScreenerResult<Vec<Self>> {
        let mut paths: Vec<_> = std::fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        let configs = paths
            .iter()
            .map(Self::from_path)
            .collect::<ScreenerResult<Vec<_>>>()?;

        info!(
            dir = %dir.as_ref().display(),
            count = configs.len(),
            "Strategies loaded from directory"
        );
        Ok(configs)
    }

    /// 구조와 불변식을 검증합니다.
    ///
    /// - 이름이 비어 있지 않음
    /// - 상한이 유한하고 음수가 아니며 합이 정확히 100
    /// - 게이트에 그룹과 조건이 있음
    /// - 모든 규칙의 점수/스케일/임계값이 유효함
    pub fn validate(&self) -> ScreenerResult<()> {
        let invalid = |reason: String| ScreenerError::invalid_strategy(&self.name, reason);

        if self.name.trim().is_empty() {
            return Err(ScreenerError::invalid_strategy("<unnamed>", "name is empty"));
        }

        for (kind, scorer) in self.scorers.iter() {
            if !scorer.cap.is_finite() || scorer.cap < 0.0 {
                return Err(invalid(format!("{} cap must be finite and non-negative", kind)));
            }
            for rule in &scorer.rules {
                rule.validate().map_err(|e| invalid(format!("{} rule: {}", kind, e)))?;
            }
        }

        let caps = self.scorers.caps_total();
        if (caps - MAX_TOTAL_SCORE).abs() > CAP_SUM_TOLERANCE {
            return Err(invalid(format!(
                "sub-scorer caps must sum to {}, got {}",
                MAX_TOTAL_SCORE, caps
            )));
        }

        self.gate.validate().map_err(invalid)?;

        for (name, expr) in &self.display {
            expr.validate()
                .map_err(|e| invalid(format!("display field '{}': {}", name, e)))?;
        }

        Ok(())
    }

    /// 게이트, 규칙, 표시 필드가 참조하는 지표 코드 (정렬, 중복 제거).
    ///
    /// 저장소 배치 조회에 그대로 사용됩니다.
    pub fn required_metrics(&self) -> Vec<String> {
        let mut codes: BTreeSet<&str> = self.gate.metric_codes().collect();
        for (_, scorer) in self.scorers.iter() {
            for rule in &scorer.rules {
                codes.extend(rule.metric_codes());
            }
        }
        for expr in self.display.values() {
            codes.extend(expr.metric_codes());
        }
        codes.into_iter().map(str::to_string).collect()
    }
}
