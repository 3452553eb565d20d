pub mod analysis;
pub mod common;
pub mod decision;

// Common re-exports
pub use common::{extract_llm_params, FeedItem, ProcessItemParams};
