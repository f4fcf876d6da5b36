//! 스크리너 시스템의 에러 타입.
//!
//! 설정 로드와 저장소 조회 경계에서만 에러가 발생합니다.
//! 점수 계산 내부는 에러 대신 null/0으로 수렴합니다.

use thiserror::Error;

/// 지표 저장소 에러.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// 저장소가 응답하지 못함 (연결 실패, 백엔드 장애)
    #[error("저장소 사용 불가: {0}")]
    Unavailable(String),

    /// 알 수 없는 종목
    #[error("알 수 없는 종목: {0}")]
    UnknownTicker(String),

    /// 손상된 백엔드 데이터
    #[error("손상된 데이터: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// 재시도로 회복될 수 있는 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// 핵심 스크리너 에러.
#[derive(Debug, Error)]
pub enum ScreenerError {
    /// 설정 에러 (파싱 실패, 알 수 없는 비교 연산자 등)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 전략 설정 검증 실패
    #[error("잘못된 전략 설정 '{strategy}': {reason}")]
    InvalidStrategy { strategy: String, reason: String },

    /// 저장소 에러
    #[error("저장소 에러: {0}")]
    Store(#[from] StoreError),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 스크리너 작업을 위한 Result 타입.
pub type ScreenerResult<T> = Result<T, ScreenerError>;

impl ScreenerError {
    /// 전략 검증 에러를 생성합니다.
    pub fn invalid_strategy(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        ScreenerError::InvalidStrategy {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }

    /// 운영자가 설정을 고쳐야 하는 에러인지 확인합니다.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScreenerError::Config(_) | ScreenerError::InvalidStrategy { .. }
        )
    }
}

impl From<config::ConfigError> for ScreenerError {
    fn from(err: config::ConfigError) -> Self {
        ScreenerError::Config(err.to_string())
    }
}
