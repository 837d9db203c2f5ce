// ── Capacity-constrained batch distribution ──
//
// Staging buckets hold at most two devices each. A batch is distributed
// greedily: always into the bucket with the most remaining slack, ties
// broken by enumeration order. Feasibility is checked against aggregate
// slack before anything mutates, so an oversized batch is rejected whole.

/// Largest batch a single distribution run accepts.
pub const MAX_BATCH_SIZE: usize = 20;

/// Fixed slot capacity of every staging bucket.
pub const BUCKET_CAPACITY: usize = 2;

/// Mutable slack tracker over a fixed set of buckets, addressed by their
/// enumeration index.
#[derive(Debug, Clone)]
pub struct BucketPool {
    available: Vec<usize>,
}

impl BucketPool {
    /// Build a pool from per-bucket occupied counts.
    pub fn from_occupied(occupied: impl IntoIterator<Item = usize>) -> Self {
        Self {
            available: occupied
                .into_iter()
                .map(|o| BUCKET_CAPACITY.saturating_sub(o))
                .collect(),
        }
    }

    /// Aggregate slack across all buckets.
    pub fn total_available(&self) -> usize {
        self.available.iter().sum()
    }

    /// How many slots the batch is missing, if it doesn't fit.
    pub fn shortfall(&self, batch_size: usize) -> Option<usize> {
        let total = self.total_available();
        (batch_size > total).then(|| batch_size - total)
    }

    /// Remaining slack of one bucket.
    pub fn available(&self, index: usize) -> usize {
        self.available[index]
    }

    /// Index of the bucket with the most remaining slack; ties go to the
    /// earliest-enumerated bucket. `None` when every bucket is exhausted.
    pub fn best(&self) -> Option<usize> {
        let (index, &avail) = self
            .available
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
        (avail > 0).then_some(index)
    }

    /// Consume one slot of a bucket after a successful claim. Failed
    /// claims must NOT call this -- the slot stays countable so a later
    /// item can still try the same bucket.
    pub fn commit(&mut self, index: usize) {
        debug_assert!(self.available[index] > 0);
        self.available[index] -= 1;
    }
}
