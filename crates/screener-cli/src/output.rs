//! 출력 형식과 값 포맷팅.
//!
//! 백분율, 소수 자릿수 같은 표시 변환은 이 모듈에서만 합니다.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// 비율을 백분율 문자열로 (`0.1234` → `12.34%`). null은 `-`.
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "-".to_string(),
    }
}

/// 고정 소수점 문자열. null은 `-`.
pub fn fmt_num(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}

/// 문자열 자르기 (UTF-8 안전).
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// JSON 형식 출력.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
}

/// 헤더와 행으로 CSV 문자열을 만듭니다.
pub fn to_csv(header: &[String], rows: &[Vec<String>]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(header).context("Failed to write CSV header")?;
    for row in rows {
        wtr.write_record(row).context("Failed to write CSV row")?;
    }
    let bytes = wtr.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// 고정 폭 테이블. 첫 열은 왼쪽, 나머지는 오른쪽 정렬합니다.
pub fn to_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i <= 1 {
                    format!("{:<width$}", cell, width = *w)
                } else {
                    format!("{:>width$}", cell, width = *w)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut output = render(header);
    output.push('\n');
    output.push_str(&"-".repeat(output.trim_end().chars().count()));
    output.push('\n');
    for row in rows {
        output.push_str(render(row).trim_end());
        output.push('\n');
    }
    output
}

/// 형식에 맞춰 테이블 또는 CSV를 만듭니다. JSON은 호출자가 처리합니다.
pub fn render_rows(format: OutputFormat, header: &[String], rows: &[Vec<String>]) -> Result<String> {
    match format {
        OutputFormat::Csv => to_csv(header, rows),
        _ => Ok(to_table(header, rows)),
    }
}

pub fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}
