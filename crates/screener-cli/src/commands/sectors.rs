//! 섹터 ETF 모멘텀 순위.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use tracing::info;

use screener_analytics::{SectorMomentum, SectorMomentumCalculator};
use screener_core::AppConfig;

use crate::output::{fmt_pct, header, render_rows, to_json, OutputFormat};

use super::open_store;

/// 기본 조회 기간 (달력일). 1년 수익률에 필요한 252 거래일을 덮습니다.
const DEFAULT_LOOKBACK_DAYS: i64 = 400;

/// 섹터 명령 설정.
#[derive(Debug)]
pub struct SectorsArgs {
    /// 섹터 ETF 티커
    pub tickers: Vec<String>,
    /// 종가 지표 코드
    pub metric: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub format: OutputFormat,
}

/// 날짜 문자열 파싱 (YYYY-MM-DD).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {}. Use YYYY-MM-DD", s))
}

pub async fn run_sectors(config: &AppConfig, args: SectorsArgs) -> Result<usize> {
    if args.tickers.is_empty() {
        bail!("At least one sector ETF ticker is required");
    }
    let to = match &args.to {
        Some(s) => parse_date(s)?,
        None => Local::now().date_naive(),
    };
    let from = match &args.from {
        Some(s) => parse_date(s)?,
        None => to - Duration::days(DEFAULT_LOOKBACK_DAYS),
    };
    if from > to {
        bail!("Start date must be before end date");
    }

    let store = open_store(config)?;
    let etfs: Vec<String> = args.tickers.iter().map(|t| t.trim().to_uppercase()).collect();
    let report = SectorMomentumCalculator::new()
        .from_store(&store, &etfs, &args.metric, from, to)
        .await;
    info!(
        etfs = report.results.len(),
        failures = report.failures.len(),
        from = %from,
        to = %to,
        "Sector momentum computed"
    );

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        format => {
            let (cols, rows) = tabulate(&report.results);
            print!("{}", render_rows(format, &cols, &rows)?);
            for f in &report.failures {
                eprintln!("failed: {}: {}", f.ticker, f.error);
            }
        }
    }
    Ok(report.results.len())
}

fn tabulate(ranked: &[SectorMomentum]) -> (Vec<String>, Vec<Vec<String>>) {
    let cols = header(&["#", "ETF", "1W", "1M", "3M", "1Y", "VOL60", "MOMENTUM"]);
    let rows = ranked
        .iter()
        .map(|m| {
            vec![
                m.rank.to_string(),
                m.ticker.clone(),
                fmt_pct(m.ret_1w),
                fmt_pct(m.ret_1m),
                fmt_pct(m.ret_3m),
                fmt_pct(m.ret_1y),
                fmt_pct(m.vol_60d),
                fmt_pct(m.momentum),
            ]
        })
        .collect();
    (cols, rows)
}
