//! 도메인 모델과 외부 협력자 인터페이스.

mod metric_store;
mod scored;

pub use metric_store::*;
pub use scored::*;
