//! 스크리너 공통 타입.

mod metric_row;

pub use metric_row::*;
