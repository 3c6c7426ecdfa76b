//! Integer world coordinates: block positions, column keys, and block faces.
//!
//! A column is a 16×256×16 vertical slice of the world. Block coordinates map
//! to their column with floor division, so negative coordinates land in the
//! column to their west/north rather than collapsing onto column 0.

use serde::{Deserialize, Serialize};

/// Width of a column along X and Z, in blocks.
pub const COLUMN_WIDTH: i32 = 16;

/// log2 of [`COLUMN_WIDTH`].
const COLUMN_SHIFT: i32 = 4;

/// Identifies one column of world data by its column-grid coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    /// Column-grid X coordinate.
    pub x: i32,
    /// Column-grid Z coordinate.
    pub z: i32,
}

impl ColumnKey {
    /// Creates a new column key.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev distance between two column keys.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dz = (self.z as i64 - other.z as i64).unsigned_abs();
        dx.max(dz) as u32
    }
}

impl std::fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

/// Absolute position of a single block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// World X.
    pub x: i32,
    /// World Y (0 at the bottom of the world).
    pub y: i32,
    /// World Z.
    pub z: i32,
}

impl BlockPos {
    /// Creates a new block position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The column containing this block.
    pub fn column(self) -> ColumnKey {
        ColumnKey::new(self.x >> COLUMN_SHIFT, self.z >> COLUMN_SHIFT)
    }

    /// Position within the owning column: `(x, y, z)` with x/z in `0..16`.
    ///
    /// Returns `None` if `y` lies outside the world's vertical range.
    pub fn local(self) -> Option<(u8, u16, u8)> {
        let y = u16::try_from(self.y).ok()?;
        if usize::from(y) >= crate::column::WORLD_HEIGHT {
            return None;
        }
        Some((
            (self.x & (COLUMN_WIDTH - 1)) as u8,
            y,
            (self.z & (COLUMN_WIDTH - 1)) as u8,
        ))
    }

    /// The neighboring position one step towards `facing`.
    pub fn relative(self, facing: Facing) -> Self {
        let (dx, dy, dz) = facing.offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Face of a block the actor is interacting with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// -Y.
    Down,
    /// +Y.
    Up,
    /// -Z.
    North,
    /// +Z.
    South,
    /// -X.
    West,
    /// +X.
    East,
}

impl Facing {
    /// Unit offset pointing out of this face.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::Down => (0, -1, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
