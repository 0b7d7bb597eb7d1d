//! File-size pruning derived from signature blocksizes.
//!
//! The hashing primitive picks the smallest blocksize `b = 3 * 2^k` such
//! that `64 * b` exceeds the file size, so a signature produced at blocksize
//! `b` can only have come from a file whose size lies in
//! `[ceil(64*b / 2), 64*b)`. A scan can therefore skip most files outright
//! before paying for any hashing.

use crate::signature::SPAMSUM_LENGTH;
use serde::{Deserialize, Serialize};

/// Half-open `[min, max)` file-size interval implied by one blocksize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SizeApproximation {
    pub min: u64,
    pub max: u64,
}

impl SizeApproximation {
    /// The candidate size interval for signatures at `block_size`.
    pub fn for_block_size(block_size: u64) -> Self {
        let max = (SPAMSUM_LENGTH as u64).saturating_mul(block_size);
        let min = max.div_ceil(2);
        Self { min, max }
    }

    pub fn contains(&self, size: u64) -> bool {
        size >= self.min && size < self.max
    }
}

/// Sorted, disjoint cover of candidate file sizes for a set of signatures.
///
/// Built once per search from the full reference set, then only read. With
/// many references at neighboring blocksizes the merged intervals collapse
/// into a handful of ranges, so membership tests stay cheap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SizeRangeIndex {
    ranges: Vec<SizeApproximation>,
}

impl SizeRangeIndex {
    /// Build the minimal merged cover for a collection of blocksizes.
    ///
    /// Exact duplicates collapse, and intervals whose boundaries touch
    /// coalesce (the merge boundary is inclusive: `[a,b)` and `[b,c)`
    /// become `[a,c)`).
    pub fn build(block_sizes: impl IntoIterator<Item = u64>) -> Self {
        let mut approximations: Vec<SizeApproximation> = block_sizes
            .into_iter()
            .map(SizeApproximation::for_block_size)
            .collect();
        approximations.sort_unstable();
        approximations.dedup();

        let mut ranges: Vec<SizeApproximation> = Vec::with_capacity(approximations.len());
        for approx in approximations {
            match ranges.last_mut() {
                Some(last) if approx.min <= last.max => {
                    last.max = last.max.max(approx.max);
                }
                _ => ranges.push(approx),
            }
        }

        Self { ranges }
    }

    /// The merged intervals, sorted by `min`.
    pub fn ranges(&self) -> &[SizeApproximation] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether `size` falls inside any covering interval.
    pub fn contains(&self, size: u64) -> bool {
        let idx = self.ranges.partition_point(|r| r.max <= size);
        self.ranges.get(idx).is_some_and(|r| r.contains(size))
    }
}
