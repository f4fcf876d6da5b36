//! 종목별 지표 행.
//!
//! 한 번의 스크리닝 패스 동안 한 종목의 최신 지표를 담는 불변 구조체입니다.
//! 생성 시점에 모든 값을 `numeric::finite`로 걸러 저장하므로
//! 행 안에는 유한한 값만 존재하고, 누락된 지표는 `get`에서 `None`이 됩니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::numeric;

/// 한 종목의 지표 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerMetricRow {
    ticker: String,
    sector: Option<String>,
    values: BTreeMap<String, f64>,
}

impl TickerMetricRow {
    /// (지표 코드, 값) 목록으로 행을 생성합니다.
    ///
    /// null이거나 유한하지 않은 값은 저장하지 않습니다.
    pub fn new<I, K>(ticker: impl Into<String>, sector: Option<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<f64>)>,
        K: Into<String>,
    {
        let values = values
            .into_iter()
            .filter_map(|(code, value)| numeric::finite_opt(value).map(|v| (code.into(), v)))
            .collect();

        Self {
            ticker: ticker.into(),
            sector: sector.filter(|s| !s.trim().is_empty()),
            values,
        }
    }

    /// 지표가 하나도 없는 행을 생성합니다.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            sector: None,
            values: BTreeMap::new(),
        }
    }

    /// 빌더를 시작합니다.
    pub fn builder(ticker: impl Into<String>) -> TickerMetricRowBuilder {
        TickerMetricRowBuilder {
            ticker: ticker.into(),
            sector: None,
            values: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    /// 지표 값을 조회합니다. 없으면 `None`.
    pub fn get(&self, metric_code: &str) -> Option<f64> {
        self.values.get(metric_code).copied()
    }

    /// 값이 있는 지표 수.
    pub fn metric_count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 값이 있는 지표를 코드 순으로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// `TickerMetricRow` 빌더.
#[derive(Debug, Clone)]
pub struct TickerMetricRowBuilder {
    ticker: String,
    sector: Option<String>,
    values: Vec<(String, Option<f64>)>,
}

impl TickerMetricRowBuilder {
    pub fn sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn metric(mut self, code: impl Into<String>, value: f64) -> Self {
        self.values.push((code.into(), Some(value)));
        self
    }

    pub fn maybe_metric(mut self, code: impl Into<String>, value: Option<f64>) -> Self {
        self.values.push((code.into(), value));
        self
    }

    pub fn build(self) -> TickerMetricRow {
        TickerMetricRow::new(self.ticker, self.sector, self.values)
    }
}

/// 시계열 한 점. 날짜 오름차순으로 정렬되어 전달됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl MetricPoint {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self {
            date,
            value: numeric::finite_opt(value),
        }
    }
}
