//! 전략 파일 검증.

use anyhow::{bail, Result};
use std::path::Path;
use tracing::{error, info};

use screener_analytics::StrategyConfig;

/// 파일 또는 디렉토리의 전략을 로드해 검증합니다.
///
/// 하나라도 실패하면 오류를 반환합니다 (종료 코드 0이 아님).
pub fn run_validate(paths: &[String]) -> Result<usize> {
    let mut ok = 0usize;
    let mut failed = 0usize;

    for raw in paths {
        let path = Path::new(raw);
        let loaded = if path.is_dir() {
            StrategyConfig::load_dir(path)
        } else {
            StrategyConfig::from_path(path).map(|c| vec![c])
        };

        match loaded {
            Ok(configs) => {
                for c in configs {
                    println!("OK    {} v{} ({} metrics)", c.name, c.version, c.required_metrics().len());
                    ok += 1;
                }
            }
            Err(e) => {
                error!(path = %raw, error = %e, "Strategy validation failed");
                println!("FAIL  {}: {}", raw, e);
                failed += 1;
            }
        }
    }

    info!(ok = ok, failed = failed, "Validation finished");
    if failed > 0 {
        bail!("{} strategy source(s) failed validation", failed);
    }
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_reports_failures() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.toml");
        fs::write(&good, screener_analytics::presets::BEARISH_TOML).unwrap();
        let bad = dir.path().join("bad.toml");
        fs::write(
            &bad,
            screener_analytics::presets::BEARISH_TOML.replace("cap = 45.0", "cap = 50.0"),
        )
        .unwrap();

        let good_path = good.display().to_string();
        assert_eq!(run_validate(&[good_path.clone()]).unwrap(), 1);
        assert!(run_validate(&[good_path, bad.display().to_string()]).is_err());
    }
}
