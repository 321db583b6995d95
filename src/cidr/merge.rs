//! Family-agnostic prefix merging over integer addresses.
//!
//! IPv4 addresses are widened to `u128` and carried with a width of 32 so a
//! single implementation serves both families.

/// A network block: start address and prefix length within `width` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Block {
    pub start: u128,
    pub len: u8,
}

/// IPv4 address width in bits.
pub(crate) const V4_WIDTH: u8 = 32;
/// IPv6 address width in bits.
pub(crate) const V6_WIDTH: u8 = 128;

/// Mask covering the host bits of a prefix of `len` bits.
fn host_mask(len: u8, width: u8) -> u128 {
    let host_bits = width.saturating_sub(len);
    if host_bits == 0 {
        0
    } else {
        u128::MAX >> (128 - u32::from(host_bits))
    }
}

impl Block {
    /// Create a block, clamping the length and zeroing host bits.
    pub fn normalized(start: u128, len: u8, width: u8) -> Self {
        let len = len.min(width);
        Self {
            start: start & !host_mask(len, width),
            len,
        }
    }

    /// Check whether `other` lies entirely inside this block.
    fn contains(&self, other: &Block, width: u8) -> bool {
        self.len <= other.len && other.start & !host_mask(self.len, width) == self.start
    }

    /// If `next` is this block's sibling, return their shared parent.
    ///
    /// `self` must be the lower half.
    fn buddy_parent(&self, next: &Block, width: u8) -> Option<Block> {
        if self.len == 0 || self.len != next.len {
            return None;
        }
        let bit = 1u128 << (width - self.len);
        if self.start & bit == 0 && next.start == self.start | bit {
            Some(Block {
                start: self.start,
                len: self.len - 1,
            })
        } else {
            None
        }
    }
}

/// Reduce blocks to the minimal sorted set covering the same addresses.
pub(crate) fn merge_blocks(mut blocks: Vec<Block>, width: u8) -> Vec<Block> {
    for block in blocks.iter_mut() {
        *block = Block::normalized(block.start, block.len, width);
    }

    // Sort by start, shorter prefix first; identical blocks become adjacent.
    blocks.sort_unstable();
    blocks.dedup();

    // Blocks either nest or are disjoint, so after sorting any container of
    // a block is the most recently retained one.
    let mut disjoint: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match disjoint.last() {
            Some(last) if last.contains(&block, width) => {}
            _ => disjoint.push(block),
        }
    }

    let mut merged: Vec<Block> = Vec::with_capacity(disjoint.len());
    for block in disjoint {
        let mut current = block;
        while let Some(parent) = merged
            .last()
            .and_then(|prev| prev.buddy_parent(&current, width))
        {
            merged.pop();
            current = parent;
        }
        merged.push(current);
    }

    merged
}
