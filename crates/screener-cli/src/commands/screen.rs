//! 점수 전략 실행 및 순위 출력.

use anyhow::Result;
use tracing::info;

use screener_analytics::{builtin_strategies, RankedScreener, ResultMode, ScreenReport, ScreenerOptions};
use screener_core::{AppConfig, MetricStore, ScoredResult, SubScoreKind};

use crate::output::{fmt_num, header, render_rows, to_json, truncate, OutputFormat};

use super::{open_store, resolve_strategy};

/// 스크린 명령 설정.
#[derive(Debug)]
pub struct ScreenArgs {
    /// 전략 이름 또는 경로 (비어 있으면 내장 전략 전체)
    pub strategies: Vec<String>,
    /// 게이트 탈락 종목 포함
    pub include_failed: bool,
    /// 전략별 최대 출력 행 수
    pub limit: Option<usize>,
    pub format: OutputFormat,
}

/// 스크린 실행. 출력한 행 수를 반환합니다.
pub async fn run_screen(config: &AppConfig, args: ScreenArgs) -> Result<usize> {
    let strategies = if args.strategies.is_empty() {
        builtin_strategies()?
    } else {
        args.strategies
            .iter()
            .map(|s| resolve_strategy(s, &config.screener))
            .collect::<Result<Vec<_>>>()?
    };

    let store = open_store(config)?;
    let universe = store.list_universe().await?;

    let mut options = ScreenerOptions::from(&config.screener);
    if args.include_failed {
        options.mode = ResultMode::All;
    }
    let mut reports = RankedScreener::new(options)
        .run_many(&universe, &strategies, &store)
        .await?;

    if let Some(limit) = args.limit {
        for report in &mut reports {
            report.results.truncate(limit);
        }
    }
    let rows: usize = reports.iter().map(|r| r.results.len()).sum();
    info!(strategies = reports.len(), rows = rows, "Screen finished");

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&reports)?),
        OutputFormat::Csv => print!("{}", render_rows(OutputFormat::Csv, &csv_header(), &csv_rows(&reports))?),
        OutputFormat::Table => {
            for report in &reports {
                print_table(report)?;
            }
        }
    }
    Ok(rows)
}

fn print_table(report: &ScreenReport) -> Result<()> {
    println!(
        "\n== {} v{} | passed {}/{} ==",
        report.strategy, report.version, report.passed, report.universe_size
    );

    let aux_names: Vec<String> = report
        .results
        .first()
        .map(|r| r.aux_display_fields.keys().cloned().collect())
        .unwrap_or_default();

    let show_gates = report.results.iter().any(|r| !r.gate_passed);

    let mut cols = header(&["#", "TICKER", "SECTOR", "TOTAL"]);
    cols.extend(SubScoreKind::ALL.iter().map(|k| k.to_string().to_uppercase()));
    cols.extend(aux_names.iter().cloned());
    if show_gates {
        cols.push("FAILED_GATES".to_string());
    }

    let rows: Vec<Vec<String>> = report
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut row = vec![
                (i + 1).to_string(),
                r.ticker.clone(),
                truncate(r.sector.as_deref().unwrap_or("-"), 22),
                fmt_num(Some(r.total_score), 1),
            ];
            row.extend(SubScoreKind::ALL.iter().map(|k| fmt_num(Some(r.subtotals.get(*k)), 1)));
            row.extend(
                aux_names
                    .iter()
                    .map(|name| fmt_num(r.aux_display_fields.get(name).copied().flatten(), 3)),
            );
            if show_gates {
                row.push(failed_gates(r));
            }
            row
        })
        .collect();

    print!("{}", render_rows(OutputFormat::Table, &cols, &rows)?);
    if !report.failures.is_empty() {
        println!("failures: {}", report.failures.len());
        for f in &report.failures {
            println!("  {}: {}", f.ticker, f.error);
        }
    }
    Ok(())
}

fn csv_header() -> Vec<String> {
    let mut cols = header(&["strategy", "rank", "ticker", "sector", "gate_passed", "total"]);
    cols.extend(SubScoreKind::ALL.iter().map(|k| k.to_string()));
    cols.push("failed_gates".to_string());
    cols
}

/// 탈락한 게이트 그룹을 `+`로 이어 붙입니다. 통과 종목은 `-`.
fn failed_gates(result: &ScoredResult) -> String {
    if result.failed_gates.is_empty() {
        "-".to_string()
    } else {
        result.failed_gates.join("+")
    }
}

fn csv_rows(reports: &[ScreenReport]) -> Vec<Vec<String>> {
    reports
        .iter()
        .flat_map(|report| {
            report.results.iter().enumerate().map(move |(i, r)| {
                let mut row = vec![
                    report.strategy.clone(),
                    (i + 1).to_string(),
                    r.ticker.clone(),
                    r.sector.clone().unwrap_or_default(),
                    r.gate_passed.to_string(),
                    fmt_num(Some(r.total_score), 4),
                ];
                row.extend(SubScoreKind::ALL.iter().map(|k| fmt_num(Some(r.subtotals.get(*k)), 4)));
                row.push(r.failed_gates.join("+"));
                row
            })
        })
        .collect()
}
