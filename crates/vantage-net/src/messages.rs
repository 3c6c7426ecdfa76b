//! Message types exchanged with the authoritative server.
//!
//! Messages are plain decoded values; the enum discriminant is the type tag.
//! Framing and byte-level encoding belong to the transport and are not part
//! of this crate.

use serde::{Deserialize, Serialize};
use vantage_world::{BlockPos, BlockState, ColumnPayload, Facing};

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// Kind of block action the client reports to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// The actor began breaking a block. The only kind whose local effect
    /// the server may legitimately confirm with a different block state.
    StartDestroy,
    /// The actor gave up breaking a block.
    AbortDestroy,
    /// The actor finished breaking a block.
    StopDestroy,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Messages received from the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ServerMessage {
    /// Column contents for `(x, z)`.
    ColumnData {
        /// Column X.
        x: i32,
        /// Column Z.
        z: i32,
        /// Decoded sections.
        payload: ColumnPayload,
        /// `true` if the payload describes the whole column.
        full_replace: bool,
    },
    /// The server stopped tracking column `(x, z)` for this client.
    ColumnUnload {
        /// Column X.
        x: i32,
        /// Column Z.
        z: i32,
    },
    /// Acknowledgment of a previously sent [`ClientMessage::ActionRequest`].
    ActionAck {
        /// Target block.
        pos: BlockPos,
        /// Kind of the acknowledged action.
        kind: ActionKind,
        /// Authoritative block state after the server processed the action.
        state: BlockState,
        /// Whether the server accepted the action.
        accepted: bool,
    },
    /// The column the server considers the client's view center.
    ViewCenter {
        /// Column X.
        x: i32,
        /// Column Z.
        z: i32,
    },
    /// The server's view distance for this client, in columns.
    ViewDistance {
        /// Distance in columns.
        distance: u32,
    },
    /// Authoritative state of a single block.
    BlockUpdate {
        /// Block position.
        pos: BlockPos,
        /// New state.
        state: BlockState,
    },
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Messages sent to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClientMessage {
    /// A block action performed (optimistically) by the local actor.
    ActionRequest {
        /// Target block.
        pos: BlockPos,
        /// Action kind.
        kind: ActionKind,
        /// Face the actor is interacting with.
        facing: Facing,
    },
    /// The hotbar slot the actor is holding.
    ToolSelection {
        /// Selected slot index.
        slot: u8,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
