//! In-process stand-in for the authoritative server.
//!
//! Runs on its own thread, streams the initial view into the client's
//! inbound queue, then answers every action request with an
//! acknowledgment. Columns west of the origin (`x < 0`) are protected:
//! every action there is rejected, which exercises client-side correction.

use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use rustc_hash::FxHashMap;
use tracing::{debug, info};
use vantage_net::{ActionKind, ChannelError, ClientMessage, InboundSender, ServerMessage};
use vantage_world::{BlockPos, BlockState, ChunkColumn, ColumnKey};

use crate::blocks::{DemoBlocks, ground_payload};

/// What the server saw over the lifetime of the connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServerReport {
    /// Columns streamed to the client.
    pub columns_sent: u64,
    /// Action requests accepted.
    pub accepted: u64,
    /// Action requests rejected.
    pub rejected: u64,
    /// Tool selection changes received.
    pub tool_changes: u64,
}

/// Authoritative world plus the connection to one client.
pub struct SimulatedServer {
    blocks: DemoBlocks,
    world: FxHashMap<ColumnKey, ChunkColumn>,
    view_distance: u32,
    to_client: InboundSender,
    report: ServerReport,
}

impl SimulatedServer {
    /// Creates a server whose world covers `view_distance` columns around
    /// the origin.
    pub fn new(blocks: DemoBlocks, view_distance: u32, to_client: InboundSender) -> Self {
        Self {
            blocks,
            world: FxHashMap::default(),
            view_distance,
            to_client,
            report: ServerReport::default(),
        }
    }

    /// Runs the server on a named thread until the client hangs up.
    pub fn spawn(
        mut self,
        from_client: Receiver<ClientMessage>,
    ) -> std::io::Result<JoinHandle<ServerReport>> {
        std::thread::Builder::new()
            .name("sim-server".into())
            .spawn(move || {
                if self.send_initial_view().is_err() {
                    return self.report;
                }
                for msg in from_client.iter() {
                    if self.handle(msg).is_err() {
                        break;
                    }
                }
                info!("Client disconnected");
                self.report
            })
    }

    /// Sends view distance, view center, and every column in range.
    pub fn send_initial_view(&mut self) -> Result<(), ChannelError> {
        let d = self.view_distance as i32;
        self.to_client.send(ServerMessage::ViewDistance {
            distance: self.view_distance,
        })?;
        self.to_client.send(ServerMessage::ViewCenter { x: 0, z: 0 })?;

        let payload = ground_payload(&self.blocks);
        for x in -d..=d {
            for z in -d..=d {
                let key = ColumnKey::new(x, z);
                // The payload is generated by this module and always valid.
                if let Ok(column) = ChunkColumn::from_payload(key, &payload, true) {
                    self.world.insert(key, column);
                }
                self.to_client.send(ServerMessage::ColumnData {
                    x,
                    z,
                    payload: payload.clone(),
                    full_replace: true,
                })?;
                self.report.columns_sent += 1;
            }
        }
        info!("Streamed {} columns", self.report.columns_sent);
        Ok(())
    }

    /// Processes one client message.
    pub fn handle(&mut self, msg: ClientMessage) -> Result<(), ChannelError> {
        match msg {
            ClientMessage::ToolSelection { slot } => {
                debug!("Client selected slot {}", slot);
                self.report.tool_changes += 1;
                Ok(())
            }
            ClientMessage::ActionRequest { pos, kind, .. } => {
                let (state, accepted) = self.apply(pos, kind);
                if accepted {
                    self.report.accepted += 1;
                } else {
                    self.report.rejected += 1;
                }
                self.to_client.send(ServerMessage::ActionAck {
                    pos,
                    kind,
                    state,
                    accepted,
                })
            }
        }
    }

    /// Applies an action and returns the resulting block state and whether
    /// it was accepted.
    fn apply(&mut self, pos: BlockPos, kind: ActionKind) -> (BlockState, bool) {
        let current = self.block(pos);
        if pos.x < 0 {
            return (current, false);
        }
        match kind {
            ActionKind::StartDestroy | ActionKind::AbortDestroy => (current, true),
            ActionKind::StopDestroy => {
                if current.is_air() {
                    return (current, false);
                }
                self.set_block(pos, BlockState::AIR);
                (BlockState::AIR, true)
            }
        }
    }

    fn block(&self, pos: BlockPos) -> BlockState {
        let Some((x, y, z)) = pos.local() else {
            return BlockState::AIR;
        };
        self.world
            .get(&pos.column())
            .map_or(BlockState::AIR, |c| c.block(x, y, z))
    }

    fn set_block(&mut self, pos: BlockPos, state: BlockState) {
        if let (Some((x, y, z)), Some(column)) =
            (pos.local(), self.world.get_mut(&pos.column()))
        {
            column.set_block(x, y, z, state);
        }
    }
}
