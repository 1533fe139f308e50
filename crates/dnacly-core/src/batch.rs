// Batch splitting under server-imposed ceilings

use std::fmt;

use crate::error::CoreError;

/// Largest image-distribution batch DNAC handles without degrading.
pub const MAX_DISTRIBUTION_BATCH: usize = 40;

/// Largest template deploy batch (the server rejects 100 or more targets).
pub const MAX_TEMPLATE_BATCH: usize = dnacly_api::templates::MAX_DEPLOY_TARGETS;

/// A batch size known to lie in `1..=max` for its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(usize);

impl BatchSize {
    pub fn new(size: usize, max: usize) -> Result<Self, CoreError> {
        if size == 0 || size > max {
            return Err(CoreError::ValidationFailed {
                message: format!("batch size must be between 1 and {max}, got {size}"),
            });
        }
        Ok(Self(size))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Split `items` into consecutive batches of at most this size.
    ///
    /// Yields `ceil(len / size)` slices in input order; empty input yields
    /// nothing.
    pub fn split<T>(self, items: &[T]) -> std::slice::Chunks<'_, T> {
        items.chunks(self.0)
    }

    /// Number of batches `len` items will be split into.
    pub fn batch_count(self, len: usize) -> usize {
        len.div_ceil(self.0)
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_ceil_batches_preserving_order() {
        let size = BatchSize::new(30, MAX_DISTRIBUTION_BATCH).expect("valid size");
        let items: Vec<u32> = (0..75).collect();

        let batches: Vec<&[u32]> = size.split(&items).collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(size.batch_count(items.len()), 3);
        assert!(batches.iter().all(|b| b.len() <= 30));
        assert_eq!(batches[2], &items[60..]);
        assert_eq!(batches.concat(), items);
    }

    #[test]
    fn exact_multiple_has_no_trailing_batch() {
        let size = BatchSize::new(99, MAX_TEMPLATE_BATCH).expect("valid size");
        let items = vec![0u8; 198];
        assert_eq!(size.split(&items).count(), 2);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        let size = BatchSize::new(5, 10).expect("valid size");
        let items: Vec<u8> = Vec::new();
        assert_eq!(size.split(&items).count(), 0);
        assert_eq!(size.batch_count(0), 0);
    }

    #[test]
    fn zero_and_oversized_rejected() {
        assert!(BatchSize::new(0, 40).is_err());
        assert!(BatchSize::new(41, 40).is_err());
        assert_eq!(BatchSize::new(40, 40).map(BatchSize::get).ok(), Some(40));
    }
}
