//! # Screener Core
//!
//! 종목 스크리너의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 스크리너 전반에서 사용되는 기본 타입을 제공합니다:
//! - 종목별 지표 행 (`TickerMetricRow`)과 점수 결과 (`ScoredResult`)
//! - 널 안전 수치 헬퍼 (`numeric`)
//! - 지표 저장소 인터페이스 (`MetricStore`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod numeric;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
