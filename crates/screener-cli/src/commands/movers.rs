//! 섹터 내 상위/하위 종목.

use anyhow::Result;

use screener_analytics::{sector_movers, MetricExpr, Mover, ScreenContext};
use screener_core::{AppConfig, MetricStore};

use crate::output::{fmt_pct, header, render_rows, to_json, OutputFormat};

use super::open_store;

/// movers 명령 설정.
#[derive(Debug)]
pub struct MoversArgs {
    /// 섹터 이름 또는 슬러그
    pub sector: String,
    /// 순위 기준 지표 코드
    pub metric: String,
    pub count: usize,
    pub format: OutputFormat,
}

pub async fn run_movers(config: &AppConfig, args: MoversArgs) -> Result<()> {
    let store = open_store(config)?;
    let universe = store.list_universe().await?;
    let codes = vec![args.metric.clone()];
    let context = ScreenContext::load(&store, &universe, &codes, config.screener.concurrency).await;

    let movers = sector_movers(&context, &args.sector, &MetricExpr::metric(&args.metric), args.count);

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&movers)?),
        format => {
            if format == OutputFormat::Table {
                println!("\n== {} by {} ==", movers.sector, args.metric);
            }
            let cols = header(&["SIDE", "TICKER", "VALUE"]);
            let rows: Vec<Vec<String>> = side("best", &movers.best)
                .chain(side("worst", &movers.worst))
                .collect();
            print!("{}", render_rows(format, &cols, &rows)?);
        }
    }
    Ok(())
}

fn side<'a>(label: &'a str, movers: &'a [Mover]) -> impl Iterator<Item = Vec<String>> + 'a {
    movers
        .iter()
        .map(move |m| vec![label.to_string(), m.ticker.clone(), fmt_pct(Some(m.value))])
}
