//! 데이터 모듈 오류 타입.

use screener_core::StoreError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV 파싱 오류
    #[error("CSV error: {0}")]
    Csv(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

impl From<DataError> for StoreError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Io(e) => StoreError::Unavailable(e.to_string()),
            DataError::NotFound(t) => StoreError::UnknownTicker(t),
            other => StoreError::Corrupt(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_store_error() {
        let io = DataError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(matches!(StoreError::from(io), StoreError::Unavailable(_)));

        let bad = DataError::InvalidData("line 3".to_string());
        assert!(matches!(StoreError::from(bad), StoreError::Corrupt(_)));

        let missing = DataError::NotFound("ZZZ".to_string());
        assert_eq!(StoreError::from(missing), StoreError::UnknownTicker("ZZZ".to_string()));
    }
}
