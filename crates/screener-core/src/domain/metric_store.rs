//! 지표 저장소 인터페이스.
//!
//! 스크리너는 저장소를 (종목, 지표 코드) → 최신 값 또는 null을 돌려주는
//! 키-값 제공자로 취급합니다. 구현체는 `screener-data` 크레이트에 있습니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::types::MetricPoint;

/// 지표 저장소 trait.
///
/// 데이터가 없는 것은 에러가 아닙니다. 누락된 지표는 `Ok(None)`으로 답하고,
/// 저장소 자체가 응답하지 못할 때만 `Err`를 반환합니다.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// 최신 지표 값을 조회합니다.
    ///
    /// # Arguments
    ///
    /// * `ticker` - 종목 티커
    /// * `metric_code` - 지표 코드 (예: "60_day_ret")
    ///
    /// # Returns
    ///
    /// 값이 없거나 유한하지 않으면 `None`
    async fn latest(&self, ticker: &str, metric_code: &str) -> Result<Option<f64>, StoreError>;

    /// 여러 지표를 한 번에 조회합니다.
    ///
    /// 기본 구현은 `latest`를 반복 호출합니다. 배치 조회를 지원하는 저장소는
    /// 재정의해야 합니다. 반환 맵에는 요청한 모든 코드가 키로 들어 있습니다.
    async fn latest_batch(
        &self,
        ticker: &str,
        metric_codes: &[String],
    ) -> Result<HashMap<String, Option<f64>>, StoreError> {
        let mut out = HashMap::with_capacity(metric_codes.len());
        for code in metric_codes {
            let value = self.latest(ticker, code).await?;
            out.insert(code.clone(), value);
        }
        Ok(out)
    }

    /// 종목의 섹터 라벨을 조회합니다.
    async fn sector(&self, ticker: &str) -> Result<Option<String>, StoreError>;

    /// 기간 내 지표 시계열을 날짜 오름차순으로 조회합니다.
    ///
    /// # Arguments
    ///
    /// * `from` / `to` - 양 끝 포함 날짜 범위
    async fn history_series(
        &self,
        ticker: &str,
        metric_code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MetricPoint>, StoreError>;

    /// 스크리닝 대상 종목 목록을 조회합니다.
    async fn list_universe(&self) -> Result<Vec<String>, StoreError>;
}
