//! CLI 명령어 구현 모듈.

pub mod filter;
pub mod movers;
pub mod profile;
pub mod screen;
pub mod sectors;
pub mod validate;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use screener_analytics::{BuiltinFilter, BuiltinStrategy, FilterScreenConfig, StrategyConfig};
use screener_core::{AppConfig, ScreenerSettings};
use screener_data::{CsvSnapshotLoader, InMemoryMetricStore};

/// 설정의 데이터 디렉토리에서 스냅샷을 로드합니다.
pub fn open_store(config: &AppConfig) -> Result<InMemoryMetricStore> {
    CsvSnapshotLoader::from_config(&config.data)
        .load()
        .with_context(|| format!("Failed to load metric snapshot from {}", config.data.data_dir))
}

/// 이름 또는 경로로 전략을 찾습니다.
///
/// 순서: 내장 전략 → `strategies_dir/<name>.toml` → 파일 경로.
pub fn resolve_strategy(name: &str, settings: &ScreenerSettings) -> Result<StrategyConfig> {
    if let Ok(builtin) = BuiltinStrategy::from_str(name) {
        debug!(strategy = %builtin, "Using builtin strategy");
        return Ok(builtin.load()?);
    }
    if let Some(path) = user_file(name, settings) {
        return StrategyConfig::from_path(&path)
            .with_context(|| format!("Failed to load strategy {}", path.display()));
    }
    bail!(
        "Unknown strategy: {}. Builtins: bullish, bearish, breakout_down (or a .toml path)",
        name
    )
}

/// 이름 또는 경로로 필터 스크린을 찾습니다.
pub fn resolve_filter(name: &str, settings: &ScreenerSettings) -> Result<FilterScreenConfig> {
    if let Ok(builtin) = BuiltinFilter::from_str(name) {
        return Ok(builtin.load()?);
    }
    if let Some(path) = user_file(name, settings) {
        return FilterScreenConfig::from_path(&path)
            .with_context(|| format!("Failed to load filter screen {}", path.display()));
    }
    bail!("Unknown filter screen: {}. Builtins: growth, efficiency (or a .toml path)", name)
}

fn user_file(name: &str, settings: &ScreenerSettings) -> Option<PathBuf> {
    if let Some(dir) = &settings.strategies_dir {
        let candidate = Path::new(dir).join(format!("{}.toml", name));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    let direct = PathBuf::from(name);
    direct.is_file().then_some(direct)
}
