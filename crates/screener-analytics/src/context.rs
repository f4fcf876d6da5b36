//! 스크리닝 실행 컨텍스트.
//!
//! 한 번의 실행 동안 종목별 지표 행을 보관하는 명시적 캐시입니다.
//! 호출자가 소유하고 실행이 끝나면 버립니다. 프로세스 전역 캐시는 없습니다.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use screener_core::{MetricStore, StoreError, TickerMetricRow};

/// 저장소 조회에 실패한 종목.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerFailure {
    pub ticker: String,
    pub error: String,
    pub retryable: bool,
}

impl TickerFailure {
    pub fn new(ticker: impl Into<String>, error: &StoreError) -> Self {
        Self {
            ticker: ticker.into(),
            error: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// 실행 단위 지표 캐시.
#[derive(Debug, Clone, Default)]
pub struct ScreenContext {
    rows: Vec<TickerMetricRow>,
    failures: Vec<TickerFailure>,
    metric_codes: Vec<String>,
}

impl ScreenContext {
    /// 이미 만들어진 행으로 컨텍스트를 구성합니다.
    pub fn from_rows(rows: Vec<TickerMetricRow>) -> Self {
        Self {
            rows,
            failures: Vec::new(),
            metric_codes: Vec::new(),
        }
    }

    /// 저장소에서 종목별 지표를 동시에 조회합니다.
    ///
    /// 한 종목의 실패는 그 종목만 제외하고 `failures`에 기록됩니다.
    /// 행 순서는 `universe` 순서(중복 제거)를 따릅니다.
    pub async fn load<S: MetricStore + ?Sized>(
        store: &S,
        universe: &[String],
        metric_codes: &[String],
        concurrency: usize,
    ) -> Self {
        let mut seen = HashSet::new();
        let tickers: Vec<&str> = universe
            .iter()
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .collect();

        let mut fetched: Vec<(usize, &str, Result<TickerMetricRow, StoreError>)> =
            stream::iter(tickers.iter().copied().enumerate().map(|(idx, ticker)| async move {
                (idx, ticker, fetch_row(store, ticker, metric_codes).await)
            }))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;
        fetched.sort_by_key(|(idx, _, _)| *idx);

        let mut rows = Vec::with_capacity(fetched.len());
        let mut failures = Vec::new();
        for (_, ticker, result) in fetched {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(ticker = ticker, error = %e, "Metric fetch failed, ticker excluded");
                    failures.push(TickerFailure::new(ticker, &e));
                }
            }
        }

        debug!(
            loaded = rows.len(),
            failed = failures.len(),
            metrics = metric_codes.len(),
            "Screen context loaded"
        );

        Self {
            rows,
            failures,
            metric_codes: metric_codes.to_vec(),
        }
    }

    pub fn rows(&self) -> &[TickerMetricRow] {
        &self.rows
    }

    pub fn row(&self, ticker: &str) -> Option<&TickerMetricRow> {
        self.rows.iter().find(|r| r.ticker() == ticker)
    }

    pub fn failures(&self) -> &[TickerFailure] {
        &self.failures
    }

    /// 조회에 사용한 지표 코드.
    pub fn metric_codes(&self) -> &[String] {
        &self.metric_codes
    }

    /// 조회를 시도한 종목 수 (성공 + 실패).
    pub fn universe_size(&self) -> usize {
        self.rows.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

async fn fetch_row<S: MetricStore + ?Sized>(
    store: &S,
    ticker: &str,
    metric_codes: &[String],
) -> Result<TickerMetricRow, StoreError> {
    let values = store.latest_batch(ticker, metric_codes).await?;
    let sector = store.sector(ticker).await?;
    Ok(TickerMetricRow::new(ticker, sector, values))
}
