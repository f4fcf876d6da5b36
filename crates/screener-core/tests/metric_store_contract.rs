//! MetricStore 기본 구현 검증.
//!
//! `latest_batch` 기본 구현이 요청한 모든 코드를 키로 채우고,
//! 저장소 에러는 그대로 전파하는지 확인합니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use screener_core::{MetricPoint, MetricStore, StoreError};

/// 단일 종목만 아는 최소 저장소.
struct SingleTickerStore {
    ticker: String,
    values: HashMap<String, f64>,
}

#[async_trait]
impl MetricStore for SingleTickerStore {
    async fn latest(&self, ticker: &str, metric_code: &str) -> Result<Option<f64>, StoreError> {
        if ticker != self.ticker {
            return Err(StoreError::UnknownTicker(ticker.to_string()));
        }
        Ok(self.values.get(metric_code).copied())
    }

    async fn sector(&self, _ticker: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn history_series(
        &self,
        _ticker: &str,
        _metric_code: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<MetricPoint>, StoreError> {
        Ok(Vec::new())
    }

    async fn list_universe(&self) -> Result<Vec<String>, StoreError> {
        Ok(vec![self.ticker.clone()])
    }
}

fn store() -> SingleTickerStore {
    let mut values = HashMap::new();
    values.insert("10_day_ret".to_string(), 0.03);
    SingleTickerStore {
        ticker: "AAPL".to_string(),
        values,
    }
}

#[tokio::test]
async fn test_latest_batch_fills_every_requested_code() {
    let codes = vec!["10_day_ret".to_string(), "60_day_ret".to_string()];
    let batch = store().latest_batch("AAPL", &codes).await.unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch["10_day_ret"], Some(0.03));
    assert_eq!(batch["60_day_ret"], None);
}

#[tokio::test]
async fn test_latest_batch_propagates_store_error() {
    let codes = vec!["10_day_ret".to_string()];
    let err = store().latest_batch("MSFT", &codes).await.unwrap_err();
    assert_eq!(err, StoreError::UnknownTicker("MSFT".to_string()));
}
