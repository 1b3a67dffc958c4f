//! Listing search result batch

use serde::Serialize;

/// One decoded page of listing results
///
/// An empty `records` list means the search matched nothing; a failed call
/// never produces a batch at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultBatch<R, M = ()> {
    /// Decoded records in response order
    pub records: Vec<R>,
    /// Side-channel metadata, when the platform sends it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<M>,
    /// Total number of result pages, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    /// Total number of matching listings, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<R, M> SearchResultBatch<R, M> {
    /// Create a batch holding only records
    #[must_use]
    pub const fn new(records: Vec<R>) -> Self {
        Self {
            records,
            metadata: None,
            total_pages: None,
            total: None,
        }
    }

    /// Attach side-channel metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: Option<M>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach page/total counters
    #[must_use]
    pub const fn with_counters(mut self, total_pages: Option<u64>, total: Option<u64>) -> Self {
        self.total_pages = total_pages;
        self.total = total;
        self
    }

    /// Number of records in this batch
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the search matched nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R, M> Default for SearchResultBatch<R, M> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
