//! Client session: the explicit context that owns the world view and the
//! prediction state, and the tick function that advances them.
//!
//! A tick runs in three phases:
//!
//! 1. Swap the event buffer and clear last tick's feedback cues.
//! 2. Drain every message the network thread queued and route it (column
//!    data, unloads, acknowledgments, view changes, block updates).
//! 3. Advance the [`DestructionController`] with this tick's input.
//!
//! Routing finishes before the controller runs, so an acknowledgment or a
//! block update received this tick is already visible to it.

use glam::DVec3;
use tracing::{debug, info, warn};
use vantage_net::{InboundQueue, Outbox, ServerMessage};
use vantage_world::{
    BlockPos, BlockRegistry, BlockState, ChunkCache, ChunkColumn, ColumnKey, InsertOutcome,
    WorldEvent, WorldEventBuffer,
};

use crate::actor::Actor;
use crate::destruction::{
    DestructionContext, DestructionController, DestructionInput, DestructionSettings, TickReport,
};
use crate::feedback::FeedbackCue;
use crate::ledger::{ActionLedger, DEFAULT_LEDGER_CAPACITY, RollbackDecision};

/// Construction parameters for a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    /// Server view distance in columns; the cache adds its margin on top.
    pub view_distance: u32,
    /// Maximum pending speculative actions.
    pub ledger_capacity: usize,
    /// Destruction tunables.
    pub destruction: DestructionSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            view_distance: 8,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            destruction: DestructionSettings::default(),
        }
    }
}

/// Counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Ticks run.
    pub ticks: u64,
    /// Inbound messages routed.
    pub messages: u64,
    /// Columns handed back for teardown.
    pub columns_unloaded: u64,
    /// Corrections applied from acknowledgments.
    pub corrections: u64,
    /// Times the actor was moved back after a correction.
    pub position_rollbacks: u64,
}

/// Owns all world-view and prediction state for one connection.
pub struct Session {
    cache: ChunkCache,
    registry: BlockRegistry,
    ledger: ActionLedger,
    controller: DestructionController,
    actor: Actor,
    events: WorldEventBuffer,
    cues: Vec<FeedbackCue>,
    inbound: InboundQueue,
    outbox: Outbox,
    stats: SessionStats,
}

impl Session {
    /// Creates a session centered on the actor's column.
    pub fn new(
        registry: BlockRegistry,
        settings: SessionSettings,
        inbound: InboundQueue,
        outbox: Outbox,
        actor_position: DVec3,
    ) -> Self {
        let mut cache = ChunkCache::for_view_distance(settings.view_distance);
        let center = block_at(actor_position).column();
        cache.recenter(center.x, center.z);
        info!(
            "Session started: cache radius {}, ledger capacity {}",
            cache.radius(),
            settings.ledger_capacity
        );

        Self {
            cache,
            registry,
            ledger: ActionLedger::with_capacity(settings.ledger_capacity),
            controller: DestructionController::new(settings.destruction),
            actor: Actor::new(actor_position),
            events: WorldEventBuffer::new(),
            cues: Vec::new(),
            inbound,
            outbox,
            stats: SessionStats::default(),
        }
    }

    /// Runs one tick.
    pub fn tick(&mut self, input: &DestructionInput) -> TickReport {
        self.events.swap();
        self.cues.clear();

        for msg in self.inbound.drain() {
            self.route(msg);
        }

        let mut ctx = DestructionContext {
            cache: &mut self.cache,
            registry: &self.registry,
            ledger: &mut self.ledger,
            outbox: &self.outbox,
            events: &mut self.events,
            cues: &mut self.cues,
            actor_position: self.actor.position,
        };
        let report = self.controller.tick(input, &mut ctx);
        self.stats.ticks += 1;
        report
    }

    /// Applies one server message.
    pub fn route(&mut self, msg: ServerMessage) {
        self.stats.messages += 1;
        match msg {
            ServerMessage::ColumnData {
                x,
                z,
                payload,
                full_replace,
            } => {
                let key = ColumnKey::new(x, z);
                match ChunkColumn::from_payload(key, &payload, full_replace) {
                    Ok(column) => self.store_column(column),
                    Err(e) => warn!("Skipping malformed column {}: {}", key, e),
                }
            }
            ServerMessage::ColumnUnload { x, z } => {
                if let Some(column) = self.cache.remove(ColumnKey::new(x, z)) {
                    self.teardown(column);
                }
            }
            ServerMessage::ActionAck {
                pos,
                kind,
                state,
                accepted,
            } => {
                let local = self.cache.block_state(pos);
                let decision = self.ledger.resolve(pos, kind, state, accepted, local);
                if let RollbackDecision::Correct { state, restore_to } = decision {
                    self.apply_correction(pos, state, restore_to);
                }
            }
            ServerMessage::ViewCenter { x, z } => {
                debug!("View center -> [{}, {}]", x, z);
                self.cache.recenter(x, z);
            }
            ServerMessage::ViewDistance { distance } => {
                let radius = ChunkCache::storage_radius(distance);
                if radius != self.cache.radius() {
                    for column in self.cache.resize(radius) {
                        self.teardown(column);
                    }
                }
            }
            ServerMessage::BlockUpdate { pos, state } => {
                self.write_block(pos, state);
            }
        }
    }

    fn store_column(&mut self, column: ChunkColumn) {
        let key = column.key();
        debug!(
            "Column {} received with {} populated sections",
            key,
            column.populated_sections()
        );
        match self.cache.insert(column) {
            InsertOutcome::Placed { evicted } => {
                if let Some(old) = evicted {
                    self.teardown(old);
                }
                self.events.send(WorldEvent::ColumnLoaded(key));
            }
            InsertOutcome::Merged => self.events.send(WorldEvent::ColumnLoaded(key)),
            InsertOutcome::Ignored => {}
        }
    }

    fn teardown(&mut self, column: ChunkColumn) {
        self.stats.columns_unloaded += 1;
        self.events.send(WorldEvent::ColumnUnloaded(column.key()));
    }

    fn write_block(&mut self, pos: BlockPos, state: BlockState) {
        match self.cache.set_block(pos, state) {
            Some(old) if old != state => self.events.send(WorldEvent::BlockChanged {
                pos,
                old,
                new: state,
            }),
            _ => {}
        }
    }

    fn apply_correction(&mut self, pos: BlockPos, state: BlockState, restore_to: Option<DVec3>) {
        self.stats.corrections += 1;
        self.write_block(pos, state);

        let Some(restore) = restore_to else {
            return;
        };
        if self.registry.is_solid(state) && self.actor.intersects_block(pos) {
            info!(
                "Corrected block {} overlaps the actor, moving back to {:?}",
                pos, restore
            );
            self.actor.teleport(restore);
            self.stats.position_rollbacks += 1;
        }
    }

    /// Local world view.
    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// Block registry.
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Pending speculative actions.
    pub fn ledger(&self) -> &ActionLedger {
        &self.ledger
    }

    /// Destruction state.
    pub fn controller(&self) -> &DestructionController {
        &self.controller
    }

    /// The local actor.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Mutable access for the movement layer.
    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    /// World change events readable this tick.
    pub fn events(&self) -> &WorldEventBuffer {
        &self.events
    }

    /// Feedback cues produced this tick.
    pub fn cues(&self) -> &[FeedbackCue] {
        &self.cues
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}

/// Block containing a world-space point.
fn block_at(position: DVec3) -> BlockPos {
    let floored = position.floor();
    BlockPos::new(floored.x as i32, floored.y as i32, floored.z as i32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
