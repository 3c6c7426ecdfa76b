//! Column storage: a vertical stack of sections plus the payload form the
//! server sends them in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::position::ColumnKey;
use crate::registry::BlockState;
use crate::section::{SECTION_SIZE, SECTION_VOLUME, Section};

/// Number of sections stacked in a column.
pub const SECTIONS_PER_COLUMN: usize = 16;

/// Height of the world in blocks.
pub const WORLD_HEIGHT: usize = SECTIONS_PER_COLUMN * SECTION_SIZE;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Block contents of one section as delivered by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionBlocks {
    /// Every block is the same state.
    Uniform(BlockState),
    /// One state per block, x fastest, then z, then y.
    Dense(Vec<BlockState>),
}

/// One section inside a [`ColumnPayload`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPayload {
    /// Section index from the bottom of the column (0..16).
    pub index: u8,
    /// Block contents.
    pub blocks: SectionBlocks,
}

/// Decoded column contents. Sections not listed are absent (all air on a
/// full replace, untouched on a partial one).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPayload {
    /// Sections carried by this payload.
    pub sections: Vec<SectionPayload>,
}

/// Reasons a [`ColumnPayload`] cannot be turned into a column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Section index beyond the top of the column.
    #[error("section index {0} out of range (max {max})", max = SECTIONS_PER_COLUMN - 1)]
    SectionOutOfRange(u8),
    /// A dense section with the wrong number of blocks.
    #[error("section {index} has {len} blocks, expected {expected}", expected = SECTION_VOLUME)]
    WrongBlockCount {
        /// Section index.
        index: u8,
        /// Number of blocks received.
        len: usize,
    },
}

// ---------------------------------------------------------------------------
// ChunkColumn
// ---------------------------------------------------------------------------

/// A column of world data addressed by its [`ColumnKey`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkColumn {
    key: ColumnKey,
    sections: [Option<Section>; SECTIONS_PER_COLUMN],
    /// Sections carried by the last payload; `None` means all of them.
    carried: Option<u16>,
}

impl ChunkColumn {
    /// Creates an all-air column.
    pub fn empty(key: ColumnKey) -> Self {
        Self {
            key,
            sections: Default::default(),
            carried: None,
        }
    }

    /// Builds a column from a server payload.
    ///
    /// With `full_replace` the column describes the whole column and a later
    /// [`merge_from`](Self::merge_from) replaces every section; otherwise it
    /// only replaces the sections listed in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] if a section index or block count is invalid.
    pub fn from_payload(
        key: ColumnKey,
        payload: &ColumnPayload,
        full_replace: bool,
    ) -> Result<Self, PayloadError> {
        let mut column = Self::empty(key);
        let mut mask = 0u16;
        for section in &payload.sections {
            let index = section.index as usize;
            if index >= SECTIONS_PER_COLUMN {
                return Err(PayloadError::SectionOutOfRange(section.index));
            }
            let built = match &section.blocks {
                SectionBlocks::Uniform(state) => Section::uniform(*state),
                SectionBlocks::Dense(blocks) => {
                    if blocks.len() != SECTION_VOLUME {
                        return Err(PayloadError::WrongBlockCount {
                            index: section.index,
                            len: blocks.len(),
                        });
                    }
                    Section::from_blocks(blocks)
                }
            };
            column.sections[index] = Some(built);
            mask |= 1 << index;
        }
        column.carried = if full_replace { None } else { Some(mask) };
        Ok(column)
    }

    /// The column's key.
    pub fn key(&self) -> ColumnKey {
        self.key
    }

    /// Block at local `(x, y, z)`; `x`/`z` in `0..16`, `y` in `0..256`.
    pub fn block(&self, x: u8, y: u16, z: u8) -> BlockState {
        let (index, local_y) = Self::split_y(y);
        match self.sections.get(index).and_then(Option::as_ref) {
            Some(section) => section.get(x, local_y, z),
            None => BlockState::AIR,
        }
    }

    /// Writes a block and returns the previous state. Writing air into an
    /// absent section is a no-op.
    pub fn set_block(&mut self, x: u8, y: u16, z: u8, state: BlockState) -> BlockState {
        let (index, local_y) = Self::split_y(y);
        let Some(slot) = self.sections.get_mut(index) else {
            return BlockState::AIR;
        };
        if slot.is_none() && state.is_air() {
            return BlockState::AIR;
        }
        slot.get_or_insert_with(Section::default)
            .set(x, local_y, z, state)
    }

    /// Merges a freshly received column for the same key into this one.
    ///
    /// A full-replace column overwrites every section (absent ones become
    /// air); a partial one overwrites only the sections it carried.
    pub fn merge_from(&mut self, incoming: ChunkColumn) {
        debug_assert_eq!(self.key, incoming.key);
        match incoming.carried {
            None => self.sections = incoming.sections,
            Some(mask) => {
                for (index, section) in incoming.sections.into_iter().enumerate() {
                    if mask & (1 << index) != 0 {
                        self.sections[index] = section;
                    }
                }
            }
        }
    }

    /// Number of present, non-empty sections.
    pub fn populated_sections(&self) -> usize {
        self.sections
            .iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .count()
    }

    fn split_y(y: u16) -> (usize, u8) {
        (
            y as usize / SECTION_SIZE,
            (y as usize % SECTION_SIZE) as u8,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
