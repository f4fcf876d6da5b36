//! 설정 관리.
//!
//! 애플리케이션 설정을 TOML 파일과 `SCREENER__*` 환경 변수에서 로드합니다.
//! 전략 정의(게이트/점수 규칙)는 이 설정이 아니라 `screener-analytics`의
//! 전략 문서로 관리됩니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ScreenerError, ScreenerResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 데이터 파일 설정
    #[serde(default)]
    pub data: DataConfig,
    /// 스크리너 실행 설정
    #[serde(default)]
    pub screener: ScreenerSettings,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 종목 평가 span의 진입/종료 기록
    #[serde(default)]
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

/// 지표 스냅샷 파일 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// 데이터 디렉토리
    pub data_dir: String,
    /// 종목/섹터 파일
    pub tickers_file: String,
    /// 최신 지표 파일 (long format)
    pub latest_file: String,
    /// 지표 이력 파일 (선택)
    pub history_file: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            tickers_file: "tickers.csv".to_string(),
            latest_file: "metrics_latest.csv".to_string(),
            history_file: Some("metrics_history.csv".to_string()),
        }
    }
}

impl DataConfig {
    pub fn tickers_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.tickers_file)
    }

    pub fn latest_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.latest_file)
    }

    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .as_ref()
            .map(|f| Path::new(&self.data_dir).join(f))
    }
}

/// 스크리너 실행 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenerSettings {
    /// 동시 종목 조회 수
    pub concurrency: usize,
    /// 게이트 탈락 종목도 결과에 포함 (진단용)
    pub include_failed: bool,
    /// 사용자 전략 파일 디렉토리
    pub strategies_dir: Option<String>,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            concurrency: 16,
            include_failed: false,
            strategies_dir: None,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> ScreenerResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("screener.concurrency", 16)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("SCREENER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> ScreenerResult<Self> {
        Self::load("config/default.toml")
    }

    /// 값 범위를 검증합니다.
    pub fn validate(&self) -> ScreenerResult<()> {
        if self.screener.concurrency == 0 {
            return Err(ScreenerError::Config(
                "screener.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[logging]
level = "debug"
format = "json"
span_events = true

[data]
data_dir = "/tmp/metrics"

[screener]
concurrency = 4
include_failed = true
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.span_events);
        assert_eq!(config.screener.concurrency, 4);
        assert!(config.screener.include_failed);
        assert_eq!(
            config.data.latest_path(),
            Path::new("/tmp/metrics").join("metrics_latest.csv")
        );
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = AppConfig::default();
        config.screener.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.screener.concurrency, 16);
        assert!(!config.screener.include_failed);
        assert!(config.data.history_path().is_some());
    }
}
