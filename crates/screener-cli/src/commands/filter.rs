//! 필터 스크린 실행.

use anyhow::Result;
use tracing::info;

use screener_analytics::{FilterReport, FilterScreen};
use screener_core::{AppConfig, MetricStore};

use crate::output::{fmt_num, header, render_rows, to_json, truncate, OutputFormat};

use super::{open_store, resolve_filter};

/// 필터 명령 설정.
#[derive(Debug)]
pub struct FilterArgs {
    /// 필터 이름 또는 경로
    pub screen: String,
    pub limit: Option<usize>,
    pub format: OutputFormat,
}

/// 필터 스크린 실행. 출력한 행 수를 반환합니다.
pub async fn run_filter(config: &AppConfig, args: FilterArgs) -> Result<usize> {
    let screen = resolve_filter(&args.screen, &config.screener)?;
    let store = open_store(config)?;
    let universe = store.list_universe().await?;

    let mut report = FilterScreen::run(&store, &universe, &screen, config.screener.concurrency).await?;
    if let Some(limit) = args.limit {
        report.matches.truncate(limit);
    }
    info!(screen = %report.screen, matches = report.matches.len(), "Filter screen finished");

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        format => {
            if format == OutputFormat::Table {
                println!("\n== {} | matched {}/{} ==", report.screen, report.matches.len(), report.universe_size);
            }
            let (cols, rows) = tabulate(&report);
            print!("{}", render_rows(format, &cols, &rows)?);
        }
    }
    Ok(report.matches.len())
}

fn tabulate(report: &FilterReport) -> (Vec<String>, Vec<Vec<String>>) {
    let display: Vec<String> = report
        .matches
        .first()
        .map(|m| m.display_fields.keys().cloned().collect())
        .unwrap_or_default();

    let mut cols = header(&["#", "TICKER", "SECTOR", "SORT"]);
    cols.extend(display.iter().cloned());

    let rows = report
        .matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut row = vec![
                (i + 1).to_string(),
                m.ticker.clone(),
                truncate(m.sector.as_deref().unwrap_or("-"), 22),
                fmt_num(m.sort_value, 4),
            ];
            row.extend(
                display
                    .iter()
                    .map(|name| fmt_num(m.display_fields.get(name).copied().flatten(), 4)),
            );
            row
        })
        .collect();
    (cols, rows)
}
