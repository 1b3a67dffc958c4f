//! Domain entities - Objects with identity and lifecycle

mod search_batch;

pub use search_batch::SearchResultBatch;
