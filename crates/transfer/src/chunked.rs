use crate::DEFAULT_CHUNK_SIZE;
use crate::types::AcknowledgedSet;

// ---------------------------------------------------------------------------
// ChunkRange
// ---------------------------------------------------------------------------

/// One half-open byte range `[start, end)` of the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Position in the plan; the store reassembles by this index.
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    /// Length of this chunk in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ---------------------------------------------------------------------------
// ChunkPlan
// ---------------------------------------------------------------------------

/// Partition of a subject into fixed-size chunks.
///
/// Every chunk but the last is exactly `chunk_size` bytes; together the
/// ranges cover `[0, total_size)` with no gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    total_size: u64,
    chunk_size: u64,
    chunks: Vec<ChunkRange>,
}

impl ChunkPlan {
    /// Plans `total_size` bytes in chunks of `chunk_size`.
    ///
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] (5 MiB) is used.
    pub fn new(total_size: u64, chunk_size: u64) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };

        let count = total_size.div_ceil(chunk_size) as usize;
        let chunks = (0..count)
            .map(|index| {
                let start = index as u64 * chunk_size;
                let end = std::cmp::min(start + chunk_size, total_size);
                ChunkRange { index, start, end }
            })
            .collect();

        Self {
            total_size,
            chunk_size,
            chunks,
        }
    }

    /// Number of planned chunks, `ceil(total_size / chunk_size)`.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Returns the range for `index`, if planned.
    pub fn get(&self, index: usize) -> Option<ChunkRange> {
        self.chunks.get(index).copied()
    }

    pub fn chunks(&self) -> &[ChunkRange] {
        &self.chunks
    }

    /// Chunks not yet present in `acked`, in plan order.
    pub fn pending(&self, acked: &AcknowledgedSet) -> Vec<ChunkRange> {
        self.chunks
            .iter()
            .filter(|c| !acked.contains(c.index))
            .copied()
            .collect()
    }
}
