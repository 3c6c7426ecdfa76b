//! Toroidal column cache around the local viewpoint.
//!
//! The cache is a fixed `side × side` grid of slots (`side = 2 * radius + 1`).
//! Column `(x, z)` lives in slot `(z mod side, x mod side)` using Euclidean
//! modulo, so columns whose coordinates differ by a multiple of `side` share a
//! slot. Every slot stores the full key of its occupant and every read checks
//! both the key and the current window, which makes recentering O(1): slots
//! that fall out of the window are simply ignored until they are overwritten.
//!
//! Displaced columns are never dropped silently. [`ChunkCache::insert`],
//! [`ChunkCache::remove`] and [`ChunkCache::resize`] hand them back so the
//! owner can run per-column teardown exactly once.

use tracing::{debug, warn};

use crate::column::ChunkColumn;
use crate::position::{BlockPos, ColumnKey};
use crate::registry::BlockState;

/// Smallest permitted cache radius.
pub const MIN_RADIUS: u32 = 2;

/// Extra columns kept around the server view distance.
pub const VIEW_MARGIN: u32 = 3;

/// Result of [`ChunkCache::insert`].
#[derive(Debug)]
pub enum InsertOutcome {
    /// The column now occupies its slot. `evicted` is the previous occupant
    /// (a different column aliasing the same slot), if any.
    Placed {
        /// Column displaced from the slot.
        evicted: Option<ChunkColumn>,
    },
    /// A column with the same key was already cached; the incoming data was
    /// merged into it in place.
    Merged,
    /// The column lies outside the current window and was dropped.
    Ignored,
}

/// Fixed-capacity, position-addressed cache of [`ChunkColumn`]s.
#[derive(Debug)]
pub struct ChunkCache {
    radius: u32,
    side: usize,
    slots: Vec<Option<ChunkColumn>>,
    center: ColumnKey,
    loaded: usize,
}

impl ChunkCache {
    /// Creates an empty cache with the given Chebyshev radius, centered on
    /// the origin. Radii below [`MIN_RADIUS`] are raised to it.
    pub fn new(radius: u32) -> Self {
        Self::with_center(radius, ColumnKey::new(0, 0))
    }

    /// Creates an empty cache sized for a server view distance.
    pub fn for_view_distance(view_distance: u32) -> Self {
        Self::new(Self::storage_radius(view_distance))
    }

    /// Cache radius needed to hold a server view distance plus the safety
    /// margin.
    pub fn storage_radius(view_distance: u32) -> u32 {
        view_distance.max(MIN_RADIUS) + VIEW_MARGIN
    }

    fn with_center(radius: u32, center: ColumnKey) -> Self {
        let radius = radius.max(MIN_RADIUS);
        let side = 2 * radius as usize + 1;
        let mut slots = Vec::with_capacity(side * side);
        slots.resize_with(side * side, || None);
        Self {
            radius,
            side,
            slots,
            center,
            loaded: 0,
        }
    }

    /// Current radius.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length of the slot grid.
    pub fn side_length(&self) -> usize {
        self.side
    }

    /// Column the window is centered on.
    pub fn center(&self) -> ColumnKey {
        self.center
    }

    /// Number of occupied slots, including stale occupants not yet
    /// overwritten.
    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    /// Number of cached columns inside the current window.
    pub fn visible_count(&self) -> usize {
        self.columns().count()
    }

    /// Returns `true` if `key` lies inside the current window.
    pub fn in_window(&self, key: ColumnKey) -> bool {
        let r = i64::from(self.radius);
        (i64::from(key.x) - i64::from(self.center.x)).abs() <= r
            && (i64::from(key.z) - i64::from(self.center.z)).abs() <= r
    }

    fn slot_index(&self, key: ColumnKey) -> usize {
        let side = self.side as i32;
        key.z.rem_euclid(side) as usize * self.side + key.x.rem_euclid(side) as usize
    }

    /// Cached column for `key`, or `None` if it is outside the window or its
    /// slot holds a different column.
    pub fn lookup(&self, key: ColumnKey) -> Option<&ChunkColumn> {
        if !self.in_window(key) {
            return None;
        }
        self.slots[self.slot_index(key)]
            .as_ref()
            .filter(|c| c.key() == key)
    }

    /// Mutable variant of [`lookup`](Self::lookup).
    pub fn lookup_mut(&mut self, key: ColumnKey) -> Option<&mut ChunkColumn> {
        if !self.in_window(key) {
            return None;
        }
        let index = self.slot_index(key);
        self.slots[index].as_mut().filter(|c| c.key() == key)
    }

    /// Stores a column received from the server.
    pub fn insert(&mut self, column: ChunkColumn) -> InsertOutcome {
        let key = column.key();
        if !self.in_window(key) {
            warn!(
                "Ignoring column {} outside the view window (center {}, radius {})",
                key, self.center, self.radius
            );
            return InsertOutcome::Ignored;
        }

        let index = self.slot_index(key);
        match &mut self.slots[index] {
            Some(existing) if existing.key() == key => {
                existing.merge_from(column);
                InsertOutcome::Merged
            }
            slot => {
                let evicted = slot.replace(column);
                match &evicted {
                    Some(old) => debug!("Column {} evicted by {}", old.key(), key),
                    None => self.loaded += 1,
                }
                InsertOutcome::Placed { evicted }
            }
        }
    }

    /// Removes the column for `key` if it is cached and inside the window.
    pub fn remove(&mut self, key: ColumnKey) -> Option<ChunkColumn> {
        if !self.in_window(key) {
            return None;
        }
        let index = self.slot_index(key);
        let slot = &mut self.slots[index];
        if slot.as_ref().is_some_and(|c| c.key() == key) {
            self.loaded -= 1;
            slot.take()
        } else {
            None
        }
    }

    /// Moves the window center. Slot contents are left untouched.
    pub fn recenter(&mut self, x: i32, z: i32) {
        self.center = ColumnKey::new(x, z);
    }

    /// Rebuilds the cache with a new radius around the current center.
    ///
    /// Every occupant inside the new window around the current center moves
    /// to the new grid, including stale ones left behind by a recenter;
    /// the rest are returned for teardown. The grid is swapped in one
    /// assignment.
    pub fn resize(&mut self, new_radius: u32) -> Vec<ChunkColumn> {
        let mut resized = Self::with_center(new_radius, self.center);
        let mut dropped = Vec::new();

        let old_slots = std::mem::take(&mut self.slots);
        for column in old_slots.into_iter().flatten() {
            let key = column.key();
            if resized.in_window(key) {
                let index = resized.slot_index(key);
                debug_assert!(resized.slots[index].is_none());
                resized.slots[index] = Some(column);
                resized.loaded += 1;
            } else {
                dropped.push(column);
            }
        }

        debug!(
            "Resized column cache {} -> {} (kept {}, dropped {})",
            self.radius,
            resized.radius,
            resized.loaded,
            dropped.len()
        );
        *self = resized;
        dropped
    }

    /// Iterates over columns currently inside the window.
    pub fn columns(&self) -> impl Iterator<Item = &ChunkColumn> {
        self.slots
            .iter()
            .flatten()
            .filter(move |c| self.in_window(c.key()))
    }

    /// Block state at `pos`. Unknown or out-of-window positions read as air.
    pub fn block_state(&self, pos: BlockPos) -> BlockState {
        let Some((x, y, z)) = pos.local() else {
            return BlockState::AIR;
        };
        self.lookup(pos.column())
            .map_or(BlockState::AIR, |c| c.block(x, y, z))
    }

    /// Writes a block into a cached column and returns the previous state.
    ///
    /// Returns `None` if the column is not cached or `pos` is outside the
    /// world's vertical range; the write is dropped in that case.
    pub fn set_block(&mut self, pos: BlockPos, state: BlockState) -> Option<BlockState> {
        let (x, y, z) = pos.local()?;
        let column = self.lookup_mut(pos.column())?;
        Some(column.set_block(x, y, z, state))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
