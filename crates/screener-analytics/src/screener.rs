//! 순위 스크리너.
//!
//! 유니버스의 각 종목에 대해 게이트 → 점수 → 보조 필드를 계산하고
//! 총점 내림차순, 동점이면 티커 오름차순으로 정렬합니다.
//!
//! # 실행 흐름
//!
//! 1. 전략 검증 (잘못된 전략은 실행하지 않음)
//! 2. `ScreenContext` 로드 (종목별 동시 조회, 실패는 종목 단위로 격리)
//! 3. 종목별 평가는 서로 독립적인 순수 함수
//! 4. 정렬로 최종 순서 결정

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{info, trace};

use screener_core::{MetricStore, ScoredResult, ScreenerResult, ScreenerSettings};

use crate::context::{ScreenContext, TickerFailure};
use crate::score::ScoreEngine;
use crate::strategy::StrategyConfig;

/// 결과에 포함할 행.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultMode {
    /// 게이트 통과 종목만
    #[default]
    PassedOnly,
    /// 탈락 종목 포함 (진단용, 탈락 종목 총점은 0)
    All,
}

/// 스크리너 실행 옵션.
#[derive(Debug, Clone, Copy)]
pub struct ScreenerOptions {
    /// 동시 종목 조회 수
    pub concurrency: usize,
    pub mode: ResultMode,
}

impl Default for ScreenerOptions {
    fn default() -> Self {
        Self {
            concurrency: 16,
            mode: ResultMode::PassedOnly,
        }
    }
}

impl From<&ScreenerSettings> for ScreenerOptions {
    fn from(settings: &ScreenerSettings) -> Self {
        Self {
            concurrency: settings.concurrency.max(1),
            mode: if settings.include_failed {
                ResultMode::All
            } else {
                ResultMode::PassedOnly
            },
        }
    }
}

/// 전략 하나의 실행 결과.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenReport {
    pub strategy: String,
    pub version: u32,
    /// 조회를 시도한 종목 수
    pub universe_size: usize,
    /// 게이트 통과 종목 수
    pub passed: usize,
    pub results: Vec<ScoredResult>,
    /// 저장소 조회 실패 종목
    pub failures: Vec<TickerFailure>,
}

/// 결과를 총점 내림차순, 티커 오름차순으로 정렬합니다.
pub fn sort_results(results: &mut [ScoredResult]) {
    results.sort_by(compare_results);
}

fn compare_results(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.ticker.cmp(&b.ticker))
}

/// 순위 스크리너.
#[derive(Debug, Clone, Default)]
pub struct RankedScreener {
    options: ScreenerOptions,
}

impl RankedScreener {
    pub fn new(options: ScreenerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScreenerOptions {
        &self.options
    }

    /// 유니버스에 전략을 실행합니다.
    ///
    /// 전략이 잘못되었으면 저장소 조회 전에 실패합니다.
    pub async fn run<S: MetricStore + ?Sized>(
        &self,
        universe: &[String],
        config: &StrategyConfig,
        store: &S,
    ) -> ScreenerResult<ScreenReport> {
        config.validate()?;
        let codes = config.required_metrics();
        let context = ScreenContext::load(store, universe, &codes, self.options.concurrency).await;
        self.rank(&context, config)
    }

    /// 저장소의 전체 유니버스에 전략을 실행합니다.
    pub async fn run_universe<S: MetricStore + ?Sized>(
        &self,
        config: &StrategyConfig,
        store: &S,
    ) -> ScreenerResult<ScreenReport> {
        let universe = store.list_universe().await?;
        self.run(&universe, config, store).await
    }

    /// 여러 전략을 하나의 컨텍스트로 실행합니다. 지표는 한 번만 조회합니다.
    pub async fn run_many<S: MetricStore + ?Sized>(
        &self,
        universe: &[String],
        configs: &[StrategyConfig],
        store: &S,
    ) -> ScreenerResult<Vec<ScreenReport>> {
        for config in configs {
            config.validate()?;
        }
        let codes: Vec<String> = configs
            .iter()
            .flat_map(|c| c.required_metrics())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let context = ScreenContext::load(store, universe, &codes, self.options.concurrency).await;
        configs.iter().map(|c| self.rank(&context, c)).collect()
    }

    /// 로드된 컨텍스트에 전략을 적용하고 정렬합니다.
    pub fn rank(&self, context: &ScreenContext, config: &StrategyConfig) -> ScreenerResult<ScreenReport> {
        config.validate()?;

        let mut results: Vec<ScoredResult> = context
            .rows()
            .iter()
            .map(|row| {
                let _span = screener_core::screening_span!("evaluate", row.ticker(), config.name).entered();
                let result = ScoreEngine::evaluate(row, config);
                trace!(
                    gate_passed = result.gate_passed,
                    total = result.total_score,
                    "Ticker evaluated"
                );
                result
            })
            .collect();

        let passed = results.iter().filter(|r| r.gate_passed).count();
        if self.options.mode == ResultMode::PassedOnly {
            results.retain(|r| r.gate_passed);
        }
        sort_results(&mut results);

        info!(
            strategy = %config.name,
            universe = context.universe_size(),
            passed = passed,
            failures = context.failures().len(),
            "Screening run finished"
        );

        Ok(ScreenReport {
            strategy: config.name.clone(),
            version: config.version,
            universe_size: context.universe_size(),
            passed,
            results,
            failures: context.failures().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::Subtotals;
    use std::collections::BTreeMap;

    fn result(ticker: &str, total: f64) -> ScoredResult {
        ScoredResult {
            ticker: ticker.to_string(),
            sector: None,
            gate_passed: true,
            failed_gates: Vec::new(),
            total_score: total,
            subtotals: Subtotals::ZERO,
            aux_display_fields: BTreeMap::new(),
        }
    }

    #[test]
    fn test_sort_desc_with_ticker_tie_break() {
        let mut results = vec![
            result("MSFT", 50.0),
            result("AAPL", 70.0),
            result("ZZZ", 50.0),
            result("AMZN", 50.0),
        ];
        sort_results(&mut results);
        let order: Vec<_> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "AMZN", "MSFT", "ZZZ"]);
    }

    #[test]
    fn test_options_from_settings() {
        let settings = ScreenerSettings {
            concurrency: 0,
            include_failed: true,
            strategies_dir: None,
        };
        let options = ScreenerOptions::from(&settings);
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.mode, ResultMode::All);
    }
}
