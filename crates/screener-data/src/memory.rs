//! 메모리 지표 저장소.
//!
//! 스냅샷 파일이나 테스트 픽스처에서 채운 값을 그대로 제공합니다.
//! 저장 시점에 유한하지 않은 값은 걸러집니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use screener_core::numeric::finite_opt;
use screener_core::{MetricPoint, MetricStore, StoreError};

/// 메모리 지표 저장소.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricStore {
    /// 티커 → 섹터
    tickers: BTreeMap<String, Option<String>>,
    /// 티커 → (지표 코드 → 값)
    latest: HashMap<String, HashMap<String, f64>>,
    /// (티커, 지표 코드) → 날짜 오름차순 시계열
    history: HashMap<(String, String), Vec<MetricPoint>>,
}

impl InMemoryMetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목을 등록합니다 (빌더).
    pub fn with_ticker(mut self, ticker: impl Into<String>, sector: Option<&str>) -> Self {
        self.insert_ticker(ticker, sector.map(str::to_string));
        self
    }

    /// 최신 지표를 넣습니다 (빌더).
    pub fn with_latest(mut self, ticker: &str, metric_code: &str, value: f64) -> Self {
        self.insert_latest(ticker, metric_code, Some(value));
        self
    }

    /// 종목을 등록하거나 섹터를 갱신합니다.
    pub fn insert_ticker(&mut self, ticker: impl Into<String>, sector: Option<String>) {
        let sector = sector.filter(|s| !s.trim().is_empty());
        self.tickers.insert(ticker.into(), sector);
    }

    /// 최신 지표 값을 넣습니다. 미등록 종목은 섹터 없이 등록됩니다.
    ///
    /// null이나 유한하지 않은 값은 기존 값을 지웁니다.
    pub fn insert_latest(&mut self, ticker: &str, metric_code: &str, value: Option<f64>) {
        self.tickers.entry(ticker.to_string()).or_insert(None);
        let metrics = self.latest.entry(ticker.to_string()).or_default();
        match finite_opt(value) {
            Some(v) => {
                metrics.insert(metric_code.to_string(), v);
            }
            None => {
                metrics.remove(metric_code);
            }
        }
    }

    /// 이력 한 점을 넣습니다. 같은 날짜가 있으면 덮어씁니다.
    pub fn insert_history(&mut self, ticker: &str, metric_code: &str, date: NaiveDate, value: Option<f64>) {
        self.tickers.entry(ticker.to_string()).or_insert(None);
        let series = self
            .history
            .entry((ticker.to_string(), metric_code.to_string()))
            .or_default();
        let point = MetricPoint::new(date, value);
        match series.binary_search_by_key(&date, |p| p.date) {
            Ok(idx) => series[idx] = point,
            Err(idx) => series.insert(idx, point),
        }
    }

    /// 등록된 종목 수.
    pub fn ticker_count(&self) -> usize {
        self.tickers.len()
    }

    fn ensure_known(&self, ticker: &str) -> Result<(), StoreError> {
        if self.tickers.contains_key(ticker) {
            Ok(())
        } else {
            Err(StoreError::UnknownTicker(ticker.to_string()))
        }
    }
}

#[async_trait]
impl MetricStore for InMemoryMetricStore {
    async fn latest(&self, ticker: &str, metric_code: &str) -> Result<Option<f64>, StoreError> {
        self.ensure_known(ticker)?;
        Ok(self
            .latest
            .get(ticker)
            .and_then(|m| m.get(metric_code))
            .copied())
    }

    async fn latest_batch(
        &self,
        ticker: &str,
        metric_codes: &[String],
    ) -> Result<HashMap<String, Option<f64>>, StoreError> {
        self.ensure_known(ticker)?;
        let metrics = self.latest.get(ticker);
        Ok(metric_codes
            .iter()
            .map(|code| (code.clone(), metrics.and_then(|m| m.get(code)).copied()))
            .collect())
    }

    async fn sector(&self, ticker: &str) -> Result<Option<String>, StoreError> {
        self.ensure_known(ticker)?;
        Ok(self.tickers.get(ticker).cloned().flatten())
    }

    async fn history_series(
        &self,
        ticker: &str,
        metric_code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MetricPoint>, StoreError> {
        self.ensure_known(ticker)?;
        let key = (ticker.to_string(), metric_code.to_string());
        Ok(self
            .history
            .get(&key)
            .map(|series| {
                series
                    .iter()
                    .filter(|p| p.date >= from && p.date <= to)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_universe(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.tickers.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_latest_and_unknown_ticker() {
        let store = InMemoryMetricStore::new()
            .with_ticker("AAPL", Some("Technology"))
            .with_latest("AAPL", "10_day_ret", 0.03);

        assert_eq!(store.latest("AAPL", "10_day_ret").await.unwrap(), Some(0.03));
        assert_eq!(store.latest("AAPL", "60_day_ret").await.unwrap(), None);
        assert_eq!(store.sector("AAPL").await.unwrap(), Some("Technology".to_string()));
        assert!(matches!(
            store.latest("MSFT", "10_day_ret").await,
            Err(StoreError::UnknownTicker(_))
        ));
    }

    #[tokio::test]
    async fn test_non_finite_values_are_null() {
        let mut store = InMemoryMetricStore::new();
        store.insert_latest("X", "a", Some(1.0));
        store.insert_latest("X", "a", Some(f64::NAN));
        store.insert_latest("X", "b", Some(f64::INFINITY));
        let batch = store
            .latest_batch("X", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(batch["a"], None);
        assert_eq!(batch["b"], None);
    }

    #[tokio::test]
    async fn test_history_sorted_and_ranged() {
        let mut store = InMemoryMetricStore::new();
        store.insert_history("XLK", "adj_close", date(3), Some(103.0));
        store.insert_history("XLK", "adj_close", date(1), Some(101.0));
        store.insert_history("XLK", "adj_close", date(2), Some(102.0));
        store.insert_history("XLK", "adj_close", date(2), Some(102.5));

        let all = store
            .history_series("XLK", "adj_close", date(1), date(31))
            .await
            .unwrap();
        let values: Vec<_> = all.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(101.0), Some(102.5), Some(103.0)]);

        let ranged = store
            .history_series("XLK", "adj_close", date(2), date(2))
            .await
            .unwrap();
        assert_eq!(ranged.len(), 1);
    }

    #[tokio::test]
    async fn test_universe_sorted() {
        let store = InMemoryMetricStore::new()
            .with_ticker("MSFT", None)
            .with_ticker("AAPL", None)
            .with_latest("AMZN", "x", 1.0);
        assert_eq!(
            store.list_universe().await.unwrap(),
            vec!["AAPL".to_string(), "AMZN".to_string(), "MSFT".to_string()]
        );
    }
}
