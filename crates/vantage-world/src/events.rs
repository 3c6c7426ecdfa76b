//! World change notifications for downstream systems (meshing, lighting,
//! physics, audio).
//!
//! Events are collected into a [`WorldEventBuffer`] that is double-buffered
//! per tick: an event written on tick N is readable on ticks N and N+1.

use crate::position::{BlockPos, ColumnKey};
use crate::registry::BlockState;

/// A change to the cached world view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    /// A column became available (new slot or merged update).
    ColumnLoaded(ColumnKey),
    /// A column left the cache. Emitted exactly once per teardown.
    ColumnUnloaded(ColumnKey),
    /// A single block changed, either predicted locally or corrected by the
    /// server.
    BlockChanged {
        /// Position of the block.
        pos: BlockPos,
        /// State before the change.
        old: BlockState,
        /// State after the change.
        new: BlockState,
    },
}

/// Double-buffered event storage.
///
/// Call [`swap`](WorldEventBuffer::swap) once per tick before writing.
#[derive(Debug, Default)]
pub struct WorldEventBuffer {
    prev: Vec<WorldEvent>,
    current: Vec<WorldEvent>,
}

impl WorldEventBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event for the current tick.
    pub fn send(&mut self, event: WorldEvent) {
        self.current.push(event);
    }

    /// All readable events (previous tick, then current tick).
    pub fn read(&self) -> impl Iterator<Item = &WorldEvent> {
        self.prev.iter().chain(self.current.iter())
    }

    /// Events recorded during the current tick only.
    pub fn current(&self) -> &[WorldEvent] {
        &self.current
    }

    /// Number of readable events.
    pub fn len(&self) -> usize {
        self.prev.len() + self.current.len()
    }

    /// Returns `true` if there are no readable events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances one tick: previous events are dropped, current become
    /// previous.
    pub fn swap(&mut self) {
        self.prev.clear();
        std::mem::swap(&mut self.prev, &mut self.current);
    }

    /// Clears both buffers.
    pub fn clear(&mut self) {
        self.prev.clear();
        self.current.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
