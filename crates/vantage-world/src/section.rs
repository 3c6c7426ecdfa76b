//! Palette-compressed storage for one 16×16×16 section of a column.
//!
//! A section keeps a palette of distinct [`BlockState`] values. While the
//! section is uniform no index array is allocated; the first write of a
//! second state expands it to one `u16` palette index per block.

use serde::{Deserialize, Serialize};

use crate::registry::BlockState;

/// Side length of a section in blocks.
pub const SECTION_SIZE: usize = 16;

/// Number of blocks in a section (16³).
pub const SECTION_VOLUME: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

/// Palette-compressed block storage for a 16³ section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Palette mapping local indices to block states.
    palette: Vec<BlockState>,
    /// Per-block palette indices, `None` while the section is uniform.
    indices: Option<Box<[u16]>>,
    /// Number of non-air blocks.
    non_air: u16,
}

impl Section {
    /// Creates a section filled with `fill`.
    pub fn uniform(fill: BlockState) -> Self {
        Self {
            palette: vec![fill],
            indices: None,
            non_air: if fill.is_air() {
                0
            } else {
                SECTION_VOLUME as u16
            },
        }
    }

    /// Builds a section from a dense block array (x fastest, then z, then y).
    ///
    /// The caller must pass exactly [`SECTION_VOLUME`] entries.
    pub fn from_blocks(blocks: &[BlockState]) -> Self {
        debug_assert_eq!(blocks.len(), SECTION_VOLUME);
        let Some(&first) = blocks.first() else {
            return Self::uniform(BlockState::AIR);
        };
        let mut section = Self::uniform(first);
        for (i, &state) in blocks.iter().enumerate().skip(1) {
            section.set_linear(i, state);
        }
        section
    }

    /// Block at local `(x, y, z)`, each in `0..16`.
    pub fn get(&self, x: u8, y: u8, z: u8) -> BlockState {
        let index = Self::linear_index(x, y, z);
        match &self.indices {
            None => self.palette[0],
            Some(indices) => self.palette[indices[index] as usize],
        }
    }

    /// Sets the block at local `(x, y, z)` and returns the previous state.
    pub fn set(&mut self, x: u8, y: u8, z: u8, state: BlockState) -> BlockState {
        self.set_linear(Self::linear_index(x, y, z), state)
    }

    /// Returns `true` if every block is air.
    pub fn is_empty(&self) -> bool {
        self.non_air == 0
    }

    /// Number of non-air blocks.
    pub fn non_air_count(&self) -> u16 {
        self.non_air
    }

    /// Number of distinct palette entries.
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    fn set_linear(&mut self, index: usize, state: BlockState) -> BlockState {
        let previous = match &self.indices {
            None => self.palette[0],
            Some(indices) => self.palette[indices[index] as usize],
        };
        if previous == state {
            return previous;
        }

        let palette_index = self.palette_index_or_insert(state);
        let indices = self
            .indices
            .get_or_insert_with(|| vec![0u16; SECTION_VOLUME].into_boxed_slice());
        indices[index] = palette_index;

        match (previous.is_air(), state.is_air()) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
        previous
    }

    fn palette_index_or_insert(&mut self, state: BlockState) -> u16 {
        if let Some(pos) = self.palette.iter().position(|&s| s == state) {
            return pos as u16;
        }
        self.palette.push(state);
        (self.palette.len() - 1) as u16
    }

    /// Converts local coordinates to a linear index (x fastest, then z, then y).
    fn linear_index(x: u8, y: u8, z: u8) -> usize {
        debug_assert!(
            (x as usize) < SECTION_SIZE && (y as usize) < SECTION_SIZE && (z as usize) < SECTION_SIZE
        );
        x as usize + z as usize * SECTION_SIZE + y as usize * SECTION_SIZE * SECTION_SIZE
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::uniform(BlockState::AIR)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
