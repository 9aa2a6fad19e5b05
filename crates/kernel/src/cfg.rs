use std::fmt;

use ptxk_core::Instruction;

use crate::id::{BlockId, IdAllocator};

pub const ENTRY_LABEL: &str = "entry";
pub const EXIT_LABEL: &str = "exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub id: BlockId,
    /// Empty for blocks no label statement ever named.
    pub label: String,
    /// Free form text rendered next to the label, holds the old label after canonicalization.
    pub comment: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    #[must_use]
    pub fn new(id: BlockId, label: impl Into<String>) -> Self {
        Self { id, label: label.into(), comment: String::new(), instructions: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum EdgeKind {
    /// Sequential execution, or the not-taken side of a conditional branch.
    FallThrough,
    Branch,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FallThrough => "fallthrough",
            Self::Branch => "branch",
        })
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Edge {
    pub head: BlockId,
    pub tail: BlockId,
    pub kind: EdgeKind,
}

impl Edge {
    #[must_use]
    pub const fn new(head: BlockId, tail: BlockId, kind: EdgeKind) -> Self {
        Self { head, tail, kind }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.head, self.tail, self.kind)
    }
}

/// An arena of basic blocks indexed by [`BlockId`], plus the edge list between them.
///
/// The entry and exit blocks are created with the graph and can never be removed.
#[derive(Debug)]
pub struct ControlFlowGraph {
    allocator: IdAllocator,
    blocks: Vec<Option<BasicBlock>>,
    edges: Vec<Edge>,
    entry: BlockId,
    exit: BlockId,
}

impl ControlFlowGraph {
    #[must_use]
    pub fn new() -> Self {
        let mut allocator = IdAllocator::default();
        let entry = allocator.allocate();
        let exit = allocator.allocate();

        Self {
            allocator,
            blocks: vec![Some(BasicBlock::new(entry, ENTRY_LABEL)), Some(BasicBlock::new(exit, EXIT_LABEL))],
            edges: Vec::new(),
            entry,
            exit,
        }
    }

    #[must_use]
    pub const fn entry(&self) -> BlockId {
        self.entry
    }

    #[must_use]
    pub const fn exit(&self) -> BlockId {
        self.exit
    }

    /// Reserves a fresh id, ids are never reused even if their block gets removed.
    #[must_use = "ignoring the return of this function will leak an ID slot and is almost never what you want"]
    pub fn new_id(&mut self) -> BlockId {
        self.allocator.allocate()
    }

    /// # Panics
    /// Panics if a block with the same id is already in the graph.
    pub fn insert_block(&mut self, block: BasicBlock) -> BlockId {
        let id = block.id;
        if self.blocks.len() <= id.index() {
            self.blocks.resize_with(id.index() + 1, || None);
        }

        let slot = &mut self.blocks[id.index()];
        assert!(slot.is_none(), "block {id} inserted twice");
        *slot = Some(block);

        id
    }

    /// Removes a block along with every edge touching it.
    ///
    /// # Panics
    /// Panics when asked to remove the entry or exit block.
    pub fn remove_block(&mut self, id: BlockId) -> Option<BasicBlock> {
        assert!(id != self.entry && id != self.exit, "entry and exit blocks are permanent");

        let block = self.blocks.get_mut(id.index())?.take()?;
        self.edges.retain(|edge| edge.head != id && edge.tail != id);

        Some(block)
    }

    pub fn insert_edge(&mut self, edge: Edge) {
        debug_assert!(self.block(edge.head).is_some() && self.block(edge.tail).is_some());
        self.edges.push(edge);
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index()).and_then(Option::as_ref)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Blocks in id order, which is also the order they were created in.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter().flatten()
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut BasicBlock> {
        self.blocks.iter_mut().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        // entry and exit always exist.
        false
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.head == id)
    }

    pub fn predecessors(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.tail == id)
    }

    fn fall_through_successor(&self, id: BlockId) -> Option<BlockId> {
        self.successors(id).find(|edge| edge.kind == EdgeKind::FallThrough).map(|edge| edge.tail)
    }

    fn fall_through_predecessor(&self, id: BlockId) -> Option<BlockId> {
        self.predecessors(id).find(|edge| edge.kind == EdgeKind::FallThrough).map(|edge| edge.head)
    }

    /// A linear block order that is valid to print as text.
    ///
    /// Entry comes first and exit last, and every fall-through successor immediately
    /// follows the block falling into it.
    #[must_use]
    pub fn executable_sequence(&self) -> Vec<BlockId> {
        let mut placed = vec![false; self.allocator.allocated()];
        let mut sequence = Vec::with_capacity(self.len());

        for block in self.blocks() {
            let id = block.id;
            if id == self.exit || placed[id.index()] {
                continue;
            }

            // gets placed right after whatever falls into it.
            if self.fall_through_predecessor(id).is_some_and(|pred| !placed[pred.index()]) {
                continue;
            }

            let mut next = Some(id);
            while let Some(id) = next.filter(|&it| it != self.exit && !placed[it.index()]) {
                placed[id.index()] = true;
                sequence.push(id);
                next = self.fall_through_successor(id);
            }
        }

        sequence.push(self.exit);
        sequence
    }
}

impl Default for ControlFlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ControlFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in self.blocks() {
            write!(f, "{}", block.id)?;
            if !block.label.is_empty() {
                write!(f, " {}", block.label)?;
            }

            f.write_str(":")?;

            if !block.comment.is_empty() {
                write!(f, " /* {} */", block.comment)?;
            }

            writeln!(f)?;

            for instruction in &block.instructions {
                writeln!(f, "    {instruction}")?;
            }
        }

        for edge in &self.edges {
            writeln!(f, "{edge}")?;
        }

        Ok(())
    }
}
