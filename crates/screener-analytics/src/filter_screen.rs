//! 게이트 전용 필터 스크린.
//!
//! 점수 없이 게이트만 통과시키고 지정한 지표로 정렬합니다.
//! 펀더멘털 스크린(성장성, 효율성)이 이 형태입니다.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use screener_core::{MetricStore, ScreenerError, ScreenerResult};

use crate::context::{ScreenContext, TickerFailure};
use crate::expr::MetricExpr;
use crate::gate::{GateConfig, Gatekeeper};

/// 정렬 방향.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

/// 필터 스크린 정의.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterScreenConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub gate: GateConfig,
    pub sort_by: MetricExpr,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub display: BTreeMap<String, MetricExpr>,
}

impl FilterScreenConfig {
    pub fn from_toml_str(source: &str) -> ScreenerResult<Self> {
        let config: FilterScreenConfig = toml::from_str(source)
            .map_err(|e| ScreenerError::Config(format!("filter screen parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> ScreenerResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> ScreenerResult<()> {
        let invalid = |reason: String| ScreenerError::invalid_strategy(&self.name, reason);
        if self.name.trim().is_empty() {
            return Err(ScreenerError::invalid_strategy("<unnamed>", "name is empty"));
        }
        self.gate.validate().map_err(invalid)?;
        self.sort_by.validate().map_err(invalid)?;
        for expr in self.display.values() {
            expr.validate().map_err(invalid)?;
        }
        Ok(())
    }

    pub fn required_metrics(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .gate
            .metric_codes()
            .chain(self.sort_by.metric_codes())
            .chain(self.display.values().flat_map(|e| e.metric_codes()))
            .map(str::to_string)
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

/// 필터 통과 종목.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMatch {
    pub ticker: String,
    pub sector: Option<String>,
    pub sort_value: Option<f64>,
    pub display_fields: BTreeMap<String, Option<f64>>,
}

/// 필터 스크린 실행 결과.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterReport {
    pub screen: String,
    pub universe_size: usize,
    pub matches: Vec<FilterMatch>,
    pub failures: Vec<TickerFailure>,
}

/// 필터 스크린 실행기.
pub struct FilterScreen;

impl FilterScreen {
    /// 로드된 컨텍스트에 필터를 적용합니다.
    ///
    /// 정렬 값이 null인 종목은 뒤로, 같은 값은 티커 오름차순.
    pub fn apply(context: &ScreenContext, config: &FilterScreenConfig) -> FilterReport {
        let mut matches: Vec<FilterMatch> = context
            .rows()
            .iter()
            .filter(|row| Gatekeeper::passes(row, &config.gate))
            .map(|row| FilterMatch {
                ticker: row.ticker().to_string(),
                sector: row.sector().map(str::to_string),
                sort_value: config.sort_by.eval(row),
                display_fields: config
                    .display
                    .iter()
                    .map(|(k, e)| (k.clone(), e.eval(row)))
                    .collect(),
            })
            .collect();

        matches.sort_by(|a, b| {
            let by_value = match (a.sort_value, b.sort_value) {
                (Some(x), Some(y)) => match config.order {
                    SortOrder::Desc => y.total_cmp(&x),
                    SortOrder::Asc => x.total_cmp(&y),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_value.then_with(|| a.ticker.cmp(&b.ticker))
        });

        info!(
            screen = %config.name,
            universe = context.universe_size(),
            matched = matches.len(),
            "Filter screen finished"
        );

        FilterReport {
            screen: config.name.clone(),
            universe_size: context.universe_size(),
            matches,
            failures: context.failures().to_vec(),
        }
    }

    /// 저장소에서 조회 후 필터를 적용합니다.
    pub async fn run<S: MetricStore + ?Sized>(
        store: &S,
        universe: &[String],
        config: &FilterScreenConfig,
        concurrency: usize,
    ) -> ScreenerResult<FilterReport> {
        config.validate()?;
        let codes = config.required_metrics();
        let context = ScreenContext::load(store, universe, &codes, concurrency).await;
        Ok(Self::apply(&context, config))
    }
}
