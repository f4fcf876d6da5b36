//! 지표 데이터 관리.
//!
//! 이 crate는 `MetricStore` 구현체를 제공합니다:
//! - 메모리 스냅샷 저장소
//! - CSV/TSV 내보내기 파일 로더 (구분자 자동 감지)

pub mod csv_loader;
pub mod error;
pub mod memory;

pub use csv_loader::{detect_delimiter, CsvSnapshotLoader};
pub use error::{DataError, Result};
pub use memory::InMemoryMetricStore;
