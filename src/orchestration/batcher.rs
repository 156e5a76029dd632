//! # Batcher
//!
//! Splits an ordered sequence into contiguous batches no larger than a
//! per-call limit. Concatenating the batches in order gives back the input.

use crate::error::{BulkOpsError, BulkOpsResult};

/// One contiguous slice of the input, tagged with its 1-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T> {
    pub items: Vec<T>,
    /// 1-based position
    pub index: usize,
    /// Total number of batches in the split
    pub count: usize,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.index == self.count
    }
}

/// Split `items` into batches of exactly `limit` items, the last holding the
/// remainder
///
/// Empty input yields no batches. A zero limit is a configuration bug and is
/// rejected rather than looping forever.
pub fn split<T>(items: Vec<T>, limit: usize) -> BulkOpsResult<Vec<Batch<T>>> {
    if limit == 0 {
        return Err(BulkOpsError::invalid_configuration(
            "batch limit must be at least 1",
        ));
    }

    let count = items.len().div_ceil(limit);
    let mut batches = Vec::with_capacity(count);
    let mut remaining = items.into_iter().peekable();
    let mut index = 0;

    while remaining.peek().is_some() {
        index += 1;
        let chunk: Vec<T> = remaining.by_ref().take(limit).collect();
        batches.push(Batch {
            items: chunk,
            index,
            count,
        });
    }

    Ok(batches)
}
