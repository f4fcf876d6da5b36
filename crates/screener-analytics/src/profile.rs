//! 종목 기간별 프로파일.
//!
//! 종목 하나에 대해 기간별 가격 레벨, 수익률 방향, 변동성 체제,
//! 거래량 방향을 한 번에 분류합니다.

use serde::Serialize;

use screener_core::{MetricStore, StoreError, TickerMetricRow};

use crate::classifier::{crossover_bump, Direction, PriceLevel, VolatilityRegime};
use crate::expr::MetricExpr;
use crate::horizon::{ClassificationConfig, Horizon, HorizonSpec};

/// 한 기간의 분류 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonProfile {
    pub horizon: Horizon,
    pub price_return: Option<f64>,
    pub price_level: PriceLevel,
    pub return_direction: Direction,
    pub volatility: Option<f64>,
    pub volatility_regime: VolatilityRegime,
    pub volume_direction: Direction,
}

/// 종목 프로파일.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerProfile {
    pub ticker: String,
    pub sector: Option<String>,
    pub horizons: Vec<HorizonProfile>,
}

impl TickerProfile {
    pub fn horizon(&self, horizon: Horizon) -> Option<&HorizonProfile> {
        self.horizons.iter().find(|h| h.horizon == horizon)
    }
}

/// 프로파일 계산기.
pub struct TickerProfiler;

impl TickerProfiler {
    /// 이미 조회한 행으로 프로파일을 계산합니다.
    pub fn profile(row: &TickerMetricRow, config: &ClassificationConfig) -> TickerProfile {
        TickerProfile {
            ticker: row.ticker().to_string(),
            sector: row.sector().map(str::to_string),
            horizons: Horizon::ALL
                .iter()
                .map(|h| Self::classify_horizon(row, *h, config.get(*h)))
                .collect(),
        }
    }

    /// 저장소에서 필요한 지표를 조회해 프로파일을 계산합니다.
    pub async fn fetch_and_profile<S: MetricStore + ?Sized>(
        store: &S,
        ticker: &str,
        config: &ClassificationConfig,
    ) -> Result<TickerProfile, StoreError> {
        let codes = config.required_metrics();
        let values = store.latest_batch(ticker, &codes).await?;
        let sector = store.sector(ticker).await?;
        let row = TickerMetricRow::new(ticker, sector, values);
        Ok(Self::profile(&row, config))
    }

    fn classify_horizon(row: &TickerMetricRow, horizon: Horizon, spec: &HorizonSpec) -> HorizonProfile {
        let price_return = row.get(&spec.price_metric);
        let mut price_level = spec.bands.level(price_return);
        if let Some(x) = &spec.crossover {
            price_level = price_level.bump(crossover_bump(row.get(&x.fast), row.get(&x.slow)));
        }

        let direction = |expr: &Option<MetricExpr>| match expr {
            Some(e) => Direction::classify(e.eval(row), spec.dead_band),
            None => Direction::Unknown,
        };

        let volatility = row.get(&spec.volatility_metric);

        HorizonProfile {
            horizon,
            price_return,
            price_level,
            return_direction: direction(&spec.return_direction),
            volatility,
            volatility_regime: spec.volatility.classify(volatility),
            volume_direction: direction(&spec.volume_direction),
        }
    }
}
