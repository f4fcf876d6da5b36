//! 종목 기간별 프로파일 출력.

use anyhow::{Context, Result};
use std::path::Path;

use screener_analytics::{default_classification, ClassificationConfig, TickerProfile, TickerProfiler};
use screener_core::AppConfig;

use crate::output::{fmt_pct, header, render_rows, to_json, OutputFormat};

use super::open_store;

/// 프로파일 명령 설정.
#[derive(Debug)]
pub struct ProfileArgs {
    pub ticker: String,
    /// 분류 설정 파일 (없으면 내장 설정)
    pub classification: Option<String>,
    pub format: OutputFormat,
}

pub async fn run_profile(config: &AppConfig, args: ProfileArgs) -> Result<()> {
    let classification = match &args.classification {
        Some(path) => ClassificationConfig::from_path(Path::new(path))
            .with_context(|| format!("Failed to load classification config {}", path))?,
        None => default_classification()?,
    };

    let store = open_store(config)?;
    let ticker = args.ticker.to_uppercase();
    let profile = TickerProfiler::fetch_and_profile(&store, &ticker, &classification).await?;

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&profile)?),
        format => {
            if format == OutputFormat::Table {
                println!("\n== {} ({}) ==", profile.ticker, profile.sector.as_deref().unwrap_or("-"));
            }
            let (cols, rows) = tabulate(&profile);
            print!("{}", render_rows(format, &cols, &rows)?);
        }
    }
    Ok(())
}

fn tabulate(profile: &TickerProfile) -> (Vec<String>, Vec<Vec<String>>) {
    let cols = header(&["HORIZON", "RETURN", "LEVEL", "TREND", "VOLATILITY", "REGIME", "VOLUME"]);
    let rows = profile
        .horizons
        .iter()
        .map(|h| {
            vec![
                h.horizon.to_string(),
                fmt_pct(h.price_return),
                h.price_level.to_string(),
                h.return_direction.arrow().to_string(),
                fmt_pct(h.volatility),
                h.volatility_regime.to_string(),
                h.volume_direction.arrow().to_string(),
            ]
        })
        .collect();
    (cols, rows)
}
