//! 스크리너 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 점수 전략 실행 및 순위 출력
//! - 필터 스크린, 종목 프로파일, 섹터 분석
//! - 전략 파일 검증

pub mod commands;
pub mod output;
