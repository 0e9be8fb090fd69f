/// A contiguous run carved out of a P-node's circular child list while it
/// is partitioned by label. Only the ends are tracked; the links
/// themselves stay in the arena and are re-wired by the partitioning.
#[derive(Debug, Default)]
pub(crate) struct ChildSpan {
    first: usize,
    last: usize,
    len: usize,
}

impl ChildSpan {
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn first(&self) -> usize {
        debug_assert_ne!(self.len, 0);
        self.first
    }

    pub(crate) fn last(&self) -> usize {
        debug_assert_ne!(self.len, 0);
        self.last
    }

    pub(crate) fn push(&mut self, idx: usize) {
        if self.len == 0 {
            self.first = idx;
        }
        self.last = idx;
        self.len += 1;
    }
}
