//! Splitting drug lists into fixed-size query batches.

use crate::error::{DrugtoxError, Result};
use std::slice::Chunks;

/// Default number of drug names per ChEMBL query.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Lazily split `items` into consecutive batches of at most `batch_size`.
///
/// Batches borrow from `items` and preserve order; calling again restarts
/// from the first batch. An empty slice yields no batches.
pub fn batch<T>(items: &[T], batch_size: usize) -> Result<Chunks<'_, T>> {
    if batch_size == 0 {
        return Err(DrugtoxError::InvalidBatchSize);
    }
    Ok(items.chunks(batch_size))
}

/// Number of batches `batch` will produce.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    len.div_ceil(batch_size)
}
