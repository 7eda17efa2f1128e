/// Cumulative-count table mapping a flat index into (unit, local offset).
///
/// Both the suite aggregator (units are sub-datasets) and the trajectory
/// indexer (units are replica blocks) flatten their hierarchies through this
/// table: per-unit lengths become an ordered prefix-sum list at construction,
/// and a lookup is one binary search rather than nested per-access scans.
#[derive(Debug, Clone, Default)]
pub(crate) struct OffsetTable {
    ends: Vec<usize>,
}

impl OffsetTable {
    pub fn from_lens(lens: impl IntoIterator<Item = usize>) -> Self {
        let mut ends = Vec::new();
        let mut total = 0;
        for len in lens {
            total += len;
            ends.push(total);
        }
        Self { ends }
    }

    pub fn total(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Resolves a flat index to (unit index, offset within unit), or `None`
    /// when the index is outside `[0, total)`.
    pub fn locate(&self, flat: usize) -> Option<(usize, usize)> {
        if flat >= self.total() {
            return None;
        }
        let unit = self.ends.partition_point(|&end| end <= flat);
        let start = if unit == 0 { 0 } else { self.ends[unit - 1] };
        Some((unit, flat - start))
    }
}
