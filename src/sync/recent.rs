use std::collections::VecDeque;

use itertools::Itertools;

use crate::chain::Block;

pub const RECENT_BLOCKS_CAPACITY: usize = 50;

/// Bounded window of recently seen blocks in arrival order (oldest at the
/// front). Entries are unique by block hash; once full, adding a new block
/// evicts the oldest one regardless of how often it has been read.
#[derive(Debug, Clone)]
pub struct RecentBlocks {
    blocks: VecDeque<Block>,
    size: usize,
}

impl Default for RecentBlocks {
    fn default() -> Self {
        Self::new(RECENT_BLOCKS_CAPACITY)
    }
}

impl RecentBlocks {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);

        Self {
            blocks: VecDeque::with_capacity(size),
            size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Find the position of a block hash within the window
    pub fn position(&self, hash: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.hash() == hash)
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.position(hash).is_some()
    }

    /// Returns the number of blocks in the window
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn newest(&self) -> Option<&Block> {
        self.blocks.back()
    }

    pub fn oldest(&self) -> Option<&Block> {
        self.blocks.front()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Append a block unless one with the same hash is already present,
    /// popping the oldest block first when the window is full. Returns whether
    /// the block was added.
    pub fn push(&mut self, block: Block) -> bool {
        if self.contains(block.hash()) {
            return false;
        }

        if self.blocks.len() >= self.size {
            self.blocks.pop_front();
        }

        self.blocks.push_back(block);

        true
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Block hashes in window order; changes whenever the window does
    pub fn fingerprint(&self) -> String {
        self.blocks.iter().map(|b| b.hash()).join(",")
    }
}
