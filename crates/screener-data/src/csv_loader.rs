//! CSV/TSV 스냅샷 로더.
//!
//! 세 종류의 파일을 읽어 [`InMemoryMetricStore`]를 만듭니다:
//! - 종목 파일: `ticker,sector`
//! - 최신 지표 파일 (long format): `ticker,metric_code,dt,value`
//! - 지표 이력 파일 (선택): 최신 지표 파일과 같은 컬럼
//!
//! 구분자는 헤더 줄의 쉼표/탭 개수로 자동 감지합니다.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use screener_core::numeric::coerce;
use screener_core::DataConfig;

use crate::error::{DataError, Result};
use crate::memory::InMemoryMetricStore;

const UTF8_BOM: char = '\u{feff}';

/// 종목 파일 레코드.
#[derive(Debug, Deserialize)]
struct TickerRecord {
    #[serde(alias = "symbol", alias = "Ticker")]
    ticker: String,
    #[serde(default, alias = "gics_sector", alias = "Sector")]
    sector: Option<String>,
}

/// 지표 파일 레코드 (long format).
#[derive(Debug, Deserialize)]
struct MetricRecord {
    ticker: String,
    #[serde(alias = "metric")]
    metric_code: String,
    #[serde(alias = "date")]
    dt: String,
    #[serde(default)]
    value: Option<String>,
}

/// 헤더 줄에서 구분자를 감지합니다.
///
/// 탭이 쉼표보다 많을 때만 탭, 그 외에는 쉼표입니다.
pub fn detect_delimiter(header: &str) -> u8 {
    let commas = header.matches(',').count();
    let tabs = header.matches('\t').count();
    if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

/// 스냅샷 파일 로더.
#[derive(Debug, Clone)]
pub struct CsvSnapshotLoader {
    tickers_path: PathBuf,
    latest_path: PathBuf,
    history_path: Option<PathBuf>,
}

impl CsvSnapshotLoader {
    pub fn new(tickers_path: impl Into<PathBuf>, latest_path: impl Into<PathBuf>) -> Self {
        Self {
            tickers_path: tickers_path.into(),
            latest_path: latest_path.into(),
            history_path: None,
        }
    }

    /// 이력 파일 경로를 지정합니다.
    pub fn with_history(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(path.into());
        self
    }

    /// 데이터 설정에서 로더를 생성합니다.
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            tickers_path: config.tickers_path(),
            latest_path: config.latest_path(),
            history_path: config.history_path(),
        }
    }

    /// 모든 파일을 읽어 메모리 저장소를 만듭니다.
    ///
    /// 이력 파일은 없으면 건너뜁니다. 종목/최신 지표 파일이 없으면 오류입니다.
    pub fn load(&self) -> Result<InMemoryMetricStore> {
        let mut store = InMemoryMetricStore::new();

        let tickers = read_tickers(&self.tickers_path)?;
        let ticker_count = tickers.len();
        for record in tickers {
            store.insert_ticker(record.ticker, record.sector);
        }

        let latest = read_latest(&self.latest_path)?;
        let latest_count = latest.len();
        for ((ticker, code), (_, value)) in latest {
            store.insert_latest(&ticker, &code, value);
        }

        let mut history_count = 0;
        if let Some(path) = &self.history_path {
            if path.exists() {
                for record in read_metric_records(path)? {
                    let (ticker, code, date, value) = record;
                    store.insert_history(&ticker, &code, date, value);
                    history_count += 1;
                }
            } else {
                debug!(path = %path.display(), "History file not found, skipping");
            }
        }

        info!(
            tickers = ticker_count,
            latest_values = latest_count,
            history_points = history_count,
            "Loaded metric snapshot"
        );
        Ok(store)
    }
}

/// 파일을 읽어 BOM을 제거하고 CSV 리더를 만듭니다.
fn open_reader(path: &Path) -> Result<csv::Reader<std::io::Cursor<Vec<u8>>>> {
    let raw = fs::read_to_string(path)?;
    let text = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw);
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let delimiter = detect_delimiter(header);

    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(std::io::Cursor::new(text.as_bytes().to_vec())))
}

fn read_tickers(path: &Path) -> Result<Vec<TickerRecord>> {
    let mut reader = open_reader(path)?;
    let mut out = Vec::new();
    for row in reader.deserialize::<TickerRecord>() {
        let record = row?;
        if record.ticker.is_empty() {
            continue;
        }
        out.push(record);
    }
    Ok(out)
}

type MetricKey = (String, String);

/// 최신 지표 파일을 읽습니다. 같은 (티커, 지표)는 `dt`가 최신인 값이 남습니다.
fn read_latest(path: &Path) -> Result<HashMap<MetricKey, (NaiveDate, Option<f64>)>> {
    let mut latest: HashMap<MetricKey, (NaiveDate, Option<f64>)> = HashMap::new();
    for (ticker, code, date, value) in read_metric_records(path)? {
        let key = (ticker, code);
        match latest.get(&key) {
            Some((seen, _)) if *seen > date => {}
            _ => {
                latest.insert(key, (date, value));
            }
        }
    }
    Ok(latest)
}

fn read_metric_records(path: &Path) -> Result<Vec<(String, String, NaiveDate, Option<f64>)>> {
    let mut reader = open_reader(path)?;
    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<MetricRecord>().enumerate() {
        let record = row?;
        if record.ticker.is_empty() || record.metric_code.is_empty() {
            warn!(path = %path.display(), row = idx + 2, "Skipping row without ticker or metric code");
            continue;
        }
        let date = parse_date(&record.dt).ok_or_else(|| {
            DataError::InvalidData(format!(
                "{}: row {} has invalid dt '{}'",
                path.display(),
                idx + 2,
                record.dt
            ))
        })?;
        let value = record.value.as_deref().and_then(coerce);
        out.push((record.ticker, record.metric_code, date, value));
    }
    Ok(out)
}

/// `YYYY-MM-DD` 또는 뒤에 시각이 붙은 형식을 날짜로 읽습니다.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}
