//! # Screener Analytics
//!
//! 규칙 기반 종목 신호 점수 및 분류 엔진.
//!
//! ## 구성 요소
//!
//! - **expr**: 게이트와 규칙이 참조하는 지표 표현식
//! - **gate**: 전략 대상 여부를 판정하는 게이트키퍼
//! - **rule / score**: 하위 점수 규칙과 단일 규칙 해석기
//! - **strategy**: TOML 전략 정의, 로드 시점 검증
//! - **classifier / horizon / profile**: 기간별 구간표 분류
//! - **context / screener**: 실행 단위 캐시와 순위 스크리너
//! - **filter_screen**: 게이트 전용 펀더멘털 스크린
//! - **sector**: 섹터 ETF 모멘텀, 섹터 내 상위/하위 종목
//! - **presets**: 내장 전략 (Bullish, Bearish, Breakout-Down)

pub mod classifier;
pub mod context;
pub mod expr;
pub mod filter_screen;
pub mod gate;
pub mod horizon;
pub mod presets;
pub mod profile;
pub mod rule;
pub mod score;
pub mod screener;
pub mod sector;
pub mod strategy;

pub use classifier::{
    classify, crossover_bump, Breakpoint, BreakpointTable, BucketLabel, Direction,
    MomentumBands, PriceLevel, VolatilityRegime,
};
pub use context::{ScreenContext, TickerFailure};
pub use expr::MetricExpr;
pub use filter_screen::{FilterMatch, FilterReport, FilterScreen, FilterScreenConfig, SortOrder};
pub use gate::{Clause, Comparator, GateConfig, GateGroup, GateReport, Gatekeeper, GroupOutcome};
pub use horizon::{ClassificationConfig, Horizon, HorizonSpec, MaCrossover};
pub use presets::{builtin_strategies, default_classification, BuiltinFilter, BuiltinStrategy};
pub use profile::{HorizonProfile, TickerProfile, TickerProfiler};
pub use rule::{Polarity, ScoringRule, StepTier};
pub use score::{RuleContribution, ScoreBreakdown, ScoreEngine, ScorerSet, SubScorer, MAX_TOTAL_SCORE};
pub use screener::{sort_results, RankedScreener, ResultMode, ScreenReport, ScreenerOptions};
pub use sector::{
    normalize_sector_slug, sector_movers, sector_slug, Mover, SectorMomentum,
    SectorMomentumCalculator, SectorMomentumReport, SectorMovers, SectorSeries,
};
pub use strategy::StrategyConfig;
