//! 섹터 분석.
//!
//! 섹터 ETF 모멘텀 순위, 섹터 내 상승/하락 상위 종목, 섹터 라벨 정규화를 제공합니다.
//!
//! # 모멘텀 계산
//!
//! - **구간 수익률**: `close[last] / close[last - lag] - 1` (lag = 5, 21, 63, 252 바)
//! - **60일 변동성**: 유한한 로그 수익률의 표본 표준편차 × √252
//! - **모멘텀**: 구할 수 있는 구간 수익률의 평균
//! - **순위**: 모멘텀 내림차순, null은 뒤, 동점은 티커 오름차순

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, warn};

use screener_core::numeric::{finite, finite_opt};
use screener_core::MetricStore;

use crate::context::{ScreenContext, TickerFailure};
use crate::expr::MetricExpr;

/// 1주, 1개월, 3개월, 1년 거래일 수.
pub const MOMENTUM_LAGS: [usize; 4] = [5, 21, 63, 252];

/// 실현 변동성 창 길이.
pub const VOLATILITY_WINDOW: usize = 60;

/// 연율화 거래일 수.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 섹터 ETF 종가 시계열 (오래된 것이 앞).
#[derive(Debug, Clone)]
pub struct SectorSeries {
    pub ticker: String,
    pub closes: Vec<Option<f64>>,
}

/// 섹터 ETF 모멘텀 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorMomentum {
    pub ticker: String,
    pub ret_1w: Option<f64>,
    pub ret_1m: Option<f64>,
    pub ret_3m: Option<f64>,
    pub ret_1y: Option<f64>,
    pub vol_60d: Option<f64>,
    pub momentum: Option<f64>,
    /// 1부터 시작하는 순위
    pub rank: usize,
}

/// 저장소 기반 섹터 모멘텀 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorMomentumReport {
    /// 순위가 매겨진 ETF
    pub results: Vec<SectorMomentum>,
    /// 이력 조회에 실패한 ETF
    pub failures: Vec<TickerFailure>,
}

/// 섹터 모멘텀 계산기.
#[derive(Debug, Clone, Default)]
pub struct SectorMomentumCalculator;

impl SectorMomentumCalculator {
    pub fn new() -> Self {
        Self
    }

    /// `lag` 바 전 대비 수익률. 기준 종가가 없거나 0 이하면 `None`.
    pub fn lag_return(closes: &[Option<f64>], lag: usize) -> Option<f64> {
        let last = closes.len().checked_sub(1)?;
        let base_idx = last.checked_sub(lag)?;
        let base = finite_opt(closes[base_idx])?;
        let latest = finite_opt(closes[last])?;
        if base <= 0.0 {
            return None;
        }
        finite(latest / base - 1.0)
    }

    /// 최근 `window`개 로그 수익률의 연율 표본 표준편차.
    ///
    /// 종가가 `window`개 이하이거나 유효 수익률이 2개 미만이면 `None`.
    pub fn realized_volatility(closes: &[Option<f64>], window: usize) -> Option<f64> {
        if closes.len() <= window {
            return None;
        }
        let tail = &closes[closes.len() - window - 1..];
        let returns: Vec<f64> = tail
            .windows(2)
            .filter_map(|pair| match (finite_opt(pair[0]), finite_opt(pair[1])) {
                (Some(prev), Some(cur)) if prev > 0.0 && cur > 0.0 => finite((cur / prev).ln()),
                _ => None,
            })
            .collect();
        if returns.len() < 2 {
            return None;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        finite(var.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
    }

    /// 모든 ETF의 모멘텀을 계산하고 순위를 매깁니다.
    pub fn calculate(&self, inputs: &[SectorSeries]) -> Vec<SectorMomentum> {
        let mut results: Vec<SectorMomentum> = inputs
            .iter()
            .map(|s| {
                let [r1w, r1m, r3m, r1y] = MOMENTUM_LAGS.map(|lag| Self::lag_return(&s.closes, lag));
                let available: Vec<f64> = [r1w, r1m, r3m, r1y].into_iter().flatten().collect();
                let momentum = if available.is_empty() {
                    None
                } else {
                    Some(available.iter().sum::<f64>() / available.len() as f64)
                };

                SectorMomentum {
                    ticker: s.ticker.clone(),
                    ret_1w: r1w,
                    ret_1m: r1m,
                    ret_3m: r3m,
                    ret_1y: r1y,
                    vol_60d: Self::realized_volatility(&s.closes, VOLATILITY_WINDOW),
                    momentum,
                    rank: 0,
                }
            })
            .collect();

        results.sort_by(|a, b| desc_nulls_last(a.momentum, b.momentum).then_with(|| a.ticker.cmp(&b.ticker)));
        for (i, r) in results.iter_mut().enumerate() {
            r.rank = i + 1;
        }
        results
    }

    /// 저장소의 종가 이력으로 계산합니다.
    ///
    /// 조회에 실패한 ETF는 순위에서 빠지고 `failures`에 담깁니다.
    pub async fn from_store<S: MetricStore + ?Sized>(
        &self,
        store: &S,
        etfs: &[String],
        close_metric: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SectorMomentumReport {
        let mut inputs = Vec::with_capacity(etfs.len());
        let mut failures = Vec::new();
        for ticker in etfs {
            match store.history_series(ticker, close_metric, from, to).await {
                Ok(points) => {
                    let closes: Vec<Option<f64>> = points.into_iter().map(|p| p.value).collect();
                    debug!(ticker = %ticker, bars = closes.len(), "Sector history loaded");
                    inputs.push(SectorSeries {
                        ticker: ticker.clone(),
                        closes,
                    });
                }
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "Sector history fetch failed");
                    failures.push(TickerFailure::new(ticker.as_str(), &e));
                }
            }
        }
        SectorMomentumReport {
            results: self.calculate(&inputs),
            failures,
        }
    }
}

fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// =============================================================================
// 섹터 라벨
// =============================================================================

/// 섹터 라벨을 slug로 변환합니다: 소문자, 영숫자가 아닌 구간은 `-` 하나로.
pub fn sector_slug(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_dash = false;
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// GICS 표기와 데이터 제공자 표기를 같은 slug로 맞춥니다.
pub fn normalize_sector_slug(slug: &str) -> String {
    let slug = sector_slug(slug);
    let canonical = match slug.as_str() {
        "consumer-discretionary" => "consumer-cyclical",
        "consumer-staples" => "consumer-defensive",
        "health-care" => "healthcare",
        "materials" => "basic-materials",
        "financials" => "financial-services",
        other => other,
    };
    canonical.to_string()
}

// =============================================================================
// 섹터 내 상위/하위 종목
// =============================================================================

/// 섹터 내 종목 하나.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub ticker: String,
    pub value: f64,
}

/// 섹터 상승/하락 상위 종목.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorMovers {
    pub sector: String,
    pub best: Vec<Mover>,
    pub worst: Vec<Mover>,
}

/// 섹터 안에서 지표 기준 상위 `n`개와 하위 `n`개를 고릅니다.
///
/// 값이 null인 종목은 제외됩니다.
pub fn sector_movers(context: &ScreenContext, sector: &str, metric: &MetricExpr, n: usize) -> SectorMovers {
    let target = normalize_sector_slug(sector);
    let mut movers: Vec<Mover> = context
        .rows()
        .iter()
        .filter(|row| row.sector().is_some_and(|s| normalize_sector_slug(s) == target))
        .filter_map(|row| {
            metric.eval(row).map(|value| Mover {
                ticker: row.ticker().to_string(),
                value,
            })
        })
        .collect();

    movers.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.ticker.cmp(&b.ticker)));
    let best = movers.iter().take(n).cloned().collect();

    movers.sort_by(|a, b| a.value.total_cmp(&b.value).then_with(|| a.ticker.cmp(&b.ticker)));
    let worst = movers.into_iter().take(n).collect();

    SectorMovers {
        sector: target,
        best,
        worst,
    }
}
