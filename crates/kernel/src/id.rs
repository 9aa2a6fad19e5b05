use std::fmt;

/// Hands out [`BlockId`]s for one graph, never the same one twice.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    allocated: u32,
}

impl IdAllocator {
    #[must_use = "ignoring the return of this function will leak an ID slot and is almost never what you want"]
    pub(crate) fn allocate(&mut self) -> BlockId {
        assert!(self.allocated < u32::MAX, "out of block ids");

        let id = BlockId(self.allocated);
        self.allocated += 1;
        id
    }

    /// One past the highest id handed out so far.
    pub(crate) const fn allocated(&self) -> usize {
        self.allocated as usize
    }
}

/// A basic block's id, dense and monotonically assigned per graph.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl BlockId {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}
