//! 종목 스크리너 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 내장 전략 전체 실행
//! screener screen
//!
//! # Bullish 상위 20개를 JSON으로
//! screener screen -s bullish --limit 20 --format json
//!
//! # 펀더멘털 필터
//! screener filter --screen efficiency
//!
//! # 종목 기간별 프로파일
//! screener profile --ticker AAPL
//!
//! # 섹터 ETF 모멘텀
//! screener sectors --tickers XLK,XLF,XLE,XLV
//!
//! # 전략 파일 검증
//! screener validate strategies/
//! ```

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::{error, info, warn};

use screener_cli::commands::filter::{run_filter, FilterArgs};
use screener_cli::commands::movers::{run_movers, MoversArgs};
use screener_cli::commands::profile::{run_profile, ProfileArgs};
use screener_cli::commands::screen::{run_screen, ScreenArgs};
use screener_cli::commands::sectors::{run_sectors, SectorsArgs};
use screener_cli::commands::validate::run_validate;
use screener_cli::output::OutputFormat;
use screener_core::{init_logging, AppConfig, LogConfig};

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Equity screener - 규칙 기반 종목 신호 점수 및 분류", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: String,

    /// 데이터 디렉토리 (설정 파일 값 대신 사용)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 점수 전략 실행 및 순위 출력
    Screen {
        /// 전략 이름 또는 TOML 경로 (반복 가능, 생략 시 내장 전략 전체)
        #[arg(short, long = "strategy")]
        strategies: Vec<String>,

        /// 게이트 탈락 종목도 출력 (총점 0)
        #[arg(long)]
        all: bool,

        /// 전략별 최대 행 수
        #[arg(long)]
        limit: Option<usize>,

        /// 출력 형식
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 게이트 전용 필터 스크린 (growth, efficiency 또는 TOML 경로)
    Filter {
        #[arg(short, long)]
        screen: String,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 종목 기간별 가격/변동성/거래량 프로파일
    Profile {
        #[arg(short, long)]
        ticker: String,

        /// 분류 설정 파일 (생략 시 내장 설정)
        #[arg(long)]
        classification: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 섹터 ETF 모멘텀 순위
    Sectors {
        /// ETF 티커 (쉼표로 구분, 예: XLK,XLF,XLE)
        #[arg(long, value_delimiter = ',', required = true)]
        tickers: Vec<String>,

        /// 종가 지표 코드
        #[arg(long, default_value = "adj_close")]
        metric: String,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD, 기본: 오늘)
        #[arg(long)]
        to: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 섹터 내 지표 상위/하위 종목
    Movers {
        /// 섹터 이름 또는 슬러그 (예: technology, health-care)
        #[arg(long)]
        sector: String,

        #[arg(long, default_value = "10_day_ret")]
        metric: String,

        /// 상위/하위 각각의 종목 수
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// 전략 파일 검증 (파일 또는 디렉토리)
    Validate {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

/// 설정 파일이 없으면 기본값을 사용합니다.
fn load_config(path: &str) -> Result<(AppConfig, bool)> {
    if Path::new(path).is_file() {
        Ok((AppConfig::load(path)?, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (mut config, from_file) = load_config(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }

    init_logging(LogConfig::from(&config.logging)).map_err(|e| anyhow!("Failed to init logging: {}", e))?;
    if from_file {
        info!(path = %cli.config, "Configuration loaded");
    } else {
        warn!(path = %cli.config, "Configuration file not found, using defaults");
    }

    let outcome = match cli.command {
        Commands::Screen {
            strategies,
            all,
            limit,
            format,
        } => run_screen(
            &config,
            ScreenArgs {
                strategies,
                include_failed: all,
                limit,
                format,
            },
        )
        .await
        .map(|_| ()),

        Commands::Filter { screen, limit, format } => {
            run_filter(&config, FilterArgs { screen, limit, format }).await.map(|_| ())
        }

        Commands::Profile {
            ticker,
            classification,
            format,
        } => {
            run_profile(
                &config,
                ProfileArgs {
                    ticker,
                    classification,
                    format,
                },
            )
            .await
        }

        Commands::Sectors {
            tickers,
            metric,
            from,
            to,
            format,
        } => run_sectors(
            &config,
            SectorsArgs {
                tickers,
                metric,
                from,
                to,
                format,
            },
        )
        .await
        .map(|_| ()),

        Commands::Movers {
            sector,
            metric,
            count,
            format,
        } => {
            run_movers(
                &config,
                MoversArgs {
                    sector,
                    metric,
                    count,
                    format,
                },
            )
            .await
        }

        Commands::Validate { paths } => run_validate(&paths).map(|_| ()),
    };

    if let Err(e) = &outcome {
        error!(error = %e, "Command failed");
    }
    outcome
}
