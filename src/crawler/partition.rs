//! Splits the URL list into contiguous chunks, one per worker

use crate::config::validate_workers;
use crate::ConfigError;

/// Splits `items` into exactly `k` contiguous chunks
///
/// Chunk size is `ceil(len / k)`; chunk `i` spans `[size * i, size * (i + 1))`
/// clamped to the list bounds. When `k` does not divide the length evenly the
/// trailing chunks are shorter, and when `k > len` they are empty. Callers
/// must treat empty chunks as already complete.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidWorkerCount`] when `k` is zero.
///
/// # Example
///
/// ```
/// use reel_bulk::crawler::partition;
///
/// let urls = ["a", "b", "c"];
/// let chunks = partition(&urls, 8).unwrap();
/// assert_eq!(chunks.len(), 8);
/// assert_eq!(chunks.iter().filter(|c| c.is_empty()).count(), 5);
/// ```
pub fn partition<T>(items: &[T], k: usize) -> Result<Vec<&[T]>, ConfigError> {
    validate_workers(k)?;

    let len = items.len();
    let size = len.div_ceil(k);

    Ok((0..k)
        .map(|i| {
            let start = (size * i).min(len);
            let end = (size * (i + 1)).min(len);
            &items[start..end]
        })
        .collect())
}
