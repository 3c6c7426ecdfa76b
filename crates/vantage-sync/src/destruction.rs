//! Block destruction state machine for the local actor.
//!
//! The controller is driven once per tick with the block the actor is
//! aiming at and the tool in hand. Breaking is applied optimistically: every
//! step is recorded in the [`ActionLedger`] and sent to the server before the
//! local world is changed, and the ledger reconciles it once acknowledged.
//!
//! ```text
//! Idle ──new target──▶ Destroying ──progress ≥ 1──▶ Completed ─┐
//!   ▲                      │                                    │
//!   │                      └──released / retarget / tool swap──▶ Aborted
//!   └──────────────────────── same tick ◀───────────────────────┘
//! ```
//!
//! A tick runs in a fixed order: tool flush, cooldown, then the state
//! transition. The cooldown set by a completed break suppresses everything
//! except the tool flush.

use glam::DVec3;
use tracing::debug;
use vantage_net::{ActionKind, ClientMessage, Outbox};
use vantage_world::{
    BlockPos, BlockRegistry, BlockState, ChunkCache, Facing, WorldEvent, WorldEventBuffer,
};

use crate::feedback::FeedbackCue;
use crate::ledger::{ActionLedger, EffectParams};
use crate::tool::{ItemIdentity, ToolState, efficiency};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Ticks to wait after a completed break before the next one may begin.
pub const DEFAULT_COOLDOWN_TICKS: u32 = 5;

/// A hit cue is emitted every this many destroying ticks.
pub const DEFAULT_HIT_SOUND_INTERVAL: u32 = 4;

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// The block face the actor is aiming at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetHit {
    /// Target block.
    pub pos: BlockPos,
    /// Face being hit.
    pub facing: Facing,
}

/// Per-tick input from the interaction layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DestructionInput {
    /// Block under the crosshair while the break button is held.
    pub target: Option<TargetHit>,
    /// Current tool selection.
    pub tool: ToolState,
    /// Instant breaking (unlimited-resource mode).
    pub fast_path: bool,
}

/// Progress of the current break.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DestructionProgress {
    /// Not breaking anything.
    #[default]
    Idle,
    /// Breaking `target`.
    Destroying {
        /// Block being broken.
        target: TargetHit,
        /// Tool held when breaking began.
        tool_snapshot: Option<ItemIdentity>,
        /// Accumulated progress in `[0, 1)`.
        progress: f32,
        /// Ticks spent on this target.
        elapsed_ticks: u32,
    },
}

/// Where the controller ended up after a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Nothing to break.
    Idle,
    /// A cooldown tick was consumed.
    CoolingDown,
    /// Breaking is in progress.
    Destroying {
        /// Block being broken.
        pos: BlockPos,
        /// Progress after this tick.
        progress: f32,
    },
    /// A block was broken this tick.
    Completed(BlockPos),
}

/// Result of [`DestructionController::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Target abandoned this tick, if any. Retargeting reports the old
    /// target here and the new one in `outcome`.
    pub aborted: Option<BlockPos>,
    /// State after the tick.
    pub outcome: TickOutcome,
}

impl TickReport {
    fn new(outcome: TickOutcome) -> Self {
        Self {
            aborted: None,
            outcome,
        }
    }
}

/// Tunables, normally taken from the prediction config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestructionSettings {
    /// Cooldown after a completed break.
    pub cooldown_ticks: u32,
    /// Hit cue period while breaking.
    pub hit_sound_interval: u32,
}

impl Default for DestructionSettings {
    fn default() -> Self {
        Self {
            cooldown_ticks: DEFAULT_COOLDOWN_TICKS,
            hit_sound_interval: DEFAULT_HIT_SOUND_INTERVAL,
        }
    }
}

/// Everything the controller touches during a tick, borrowed from the
/// session.
pub struct DestructionContext<'a> {
    /// Local world view.
    pub cache: &'a mut ChunkCache,
    /// Material properties.
    pub registry: &'a BlockRegistry,
    /// Pending speculative actions.
    pub ledger: &'a mut ActionLedger,
    /// Server-bound messages.
    pub outbox: &'a Outbox,
    /// World change notifications.
    pub events: &'a mut WorldEventBuffer,
    /// Feedback cues for this tick.
    pub cues: &'a mut Vec<FeedbackCue>,
    /// Actor position before any action this tick.
    pub actor_position: DVec3,
}

/// Progress added per tick for breaking `state` with `tool`.
///
/// Zero hardness breaks in one tick; negative hardness never breaks.
pub fn break_rate(registry: &BlockRegistry, state: BlockState, tool: Option<&ItemIdentity>) -> f32 {
    let hardness = registry.hardness(state);
    if hardness < 0.0 {
        return 0.0;
    }
    if hardness == 0.0 {
        return 1.0;
    }
    let preferred = registry.get(state).and_then(|d| d.preferred_tool);
    efficiency(tool, preferred) / hardness
}

// ---------------------------------------------------------------------------
// DestructionController
// ---------------------------------------------------------------------------

/// Drives [`DestructionProgress`] for one actor.
#[derive(Debug)]
pub struct DestructionController {
    progress: DestructionProgress,
    delay_ticks: u32,
    last_sent_slot: Option<u8>,
    crack_stage: i32,
    settings: DestructionSettings,
}

impl DestructionController {
    /// Creates an idle controller.
    pub fn new(settings: DestructionSettings) -> Self {
        Self {
            progress: DestructionProgress::Idle,
            delay_ticks: 0,
            last_sent_slot: None,
            crack_stage: -1,
            settings,
        }
    }

    /// Current progress state.
    pub fn progress(&self) -> &DestructionProgress {
        &self.progress
    }

    /// Remaining cooldown ticks.
    pub fn delay_ticks(&self) -> u32 {
        self.delay_ticks
    }

    /// Returns `true` while a target is being broken.
    pub fn is_destroying(&self) -> bool {
        matches!(self.progress, DestructionProgress::Destroying { .. })
    }

    /// Crack overlay stage: `-1` for none, otherwise `0..=9`.
    pub fn progress_stage(&self) -> i32 {
        match self.progress {
            DestructionProgress::Destroying { progress, .. } if progress > 0.0 => {
                (progress * 10.0) as i32 - 1
            }
            _ => -1,
        }
    }

    /// Advances one tick.
    pub fn tick(&mut self, input: &DestructionInput, ctx: &mut DestructionContext<'_>) -> TickReport {
        self.flush_tool(input.tool.selected_slot, ctx.outbox);
        let report = self.advance(input, ctx);

        let stage = self.progress_stage();
        if stage != self.crack_stage {
            self.crack_stage = stage;
            ctx.cues.push(FeedbackCue::CrackStage(stage));
        }
        report
    }

    fn flush_tool(&mut self, slot: u8, outbox: &Outbox) {
        if self.last_sent_slot != Some(slot) {
            outbox.send(ClientMessage::ToolSelection { slot });
            self.last_sent_slot = Some(slot);
        }
    }

    fn advance(&mut self, input: &DestructionInput, ctx: &mut DestructionContext<'_>) -> TickReport {
        if self.delay_ticks > 0 {
            self.delay_ticks -= 1;
            return TickReport::new(TickOutcome::CoolingDown);
        }

        let Some(target) = input.target else {
            return TickReport {
                aborted: self.abort(ctx),
                outcome: TickOutcome::Idle,
            };
        };

        if input.fast_path {
            let aborted = self.abort(ctx);
            return TickReport {
                aborted,
                outcome: self.fast_break(target, &input.tool, ctx),
            };
        }

        let retarget = match &self.progress {
            DestructionProgress::Destroying {
                target: current,
                tool_snapshot,
                ..
            } => {
                current.pos != target.pos
                    || !ItemIdentity::same_for_breaking(
                        tool_snapshot.as_ref(),
                        input.tool.held.as_ref(),
                    )
            }
            DestructionProgress::Idle => false,
        };
        let aborted = if retarget { self.abort(ctx) } else { None };

        if !self.is_destroying() && !self.begin(target, &input.tool, ctx) {
            return TickReport {
                aborted,
                outcome: TickOutcome::Idle,
            };
        }

        let mut report = self.continue_destroying(&input.tool, ctx);
        report.aborted = report.aborted.or(aborted);
        report
    }

    /// Enters `Destroying` for `target`. Returns `false` if there is nothing
    /// to break there.
    fn begin(&mut self, target: TargetHit, tool: &ToolState, ctx: &mut DestructionContext<'_>) -> bool {
        if ctx.cache.block_state(target.pos).is_air() {
            return false;
        }

        ctx.ledger.submit(
            target.pos,
            ActionKind::StartDestroy,
            ctx.actor_position,
            effect_of(tool),
        );
        ctx.outbox.send(ClientMessage::ActionRequest {
            pos: target.pos,
            kind: ActionKind::StartDestroy,
            facing: target.facing,
        });
        ctx.cues.push(FeedbackCue::Attack);

        self.progress = DestructionProgress::Destroying {
            target,
            tool_snapshot: tool.held.clone(),
            progress: 0.0,
            elapsed_ticks: 0,
        };
        debug!("Started destroying {}", target.pos);
        true
    }

    fn continue_destroying(&mut self, tool: &ToolState, ctx: &mut DestructionContext<'_>) -> TickReport {
        let target = match &self.progress {
            DestructionProgress::Destroying { target, .. } => *target,
            DestructionProgress::Idle => return TickReport::new(TickOutcome::Idle),
        };

        // Removed under us (another actor, or a server update).
        let state = ctx.cache.block_state(target.pos);
        if state.is_air() {
            return TickReport {
                aborted: self.abort(ctx),
                outcome: TickOutcome::Idle,
            };
        }

        let interval = self.settings.hit_sound_interval.max(1);
        let DestructionProgress::Destroying {
            tool_snapshot,
            progress,
            elapsed_ticks,
            ..
        } = &mut self.progress
        else {
            return TickReport::new(TickOutcome::Idle);
        };

        *progress += break_rate(ctx.registry, state, tool_snapshot.as_ref());
        if *elapsed_ticks % interval == 0 {
            ctx.cues.push(FeedbackCue::hit(ctx.registry.sound(state)));
        }
        *elapsed_ticks += 1;

        if *progress < 1.0 {
            return TickReport::new(TickOutcome::Destroying {
                pos: target.pos,
                progress: *progress,
            });
        }

        self.complete(target, tool, ctx);
        TickReport::new(TickOutcome::Completed(target.pos))
    }

    fn complete(&mut self, target: TargetHit, tool: &ToolState, ctx: &mut DestructionContext<'_>) {
        ctx.ledger.submit(
            target.pos,
            ActionKind::StopDestroy,
            ctx.actor_position,
            effect_of(tool),
        );
        ctx.outbox.send(ClientMessage::ActionRequest {
            pos: target.pos,
            kind: ActionKind::StopDestroy,
            facing: target.facing,
        });
        remove_block(ctx, target.pos);

        self.progress = DestructionProgress::Idle;
        self.delay_ticks = self.settings.cooldown_ticks;
        debug!("Finished destroying {}", target.pos);
    }

    fn fast_break(
        &mut self,
        target: TargetHit,
        tool: &ToolState,
        ctx: &mut DestructionContext<'_>,
    ) -> TickOutcome {
        if ctx.cache.block_state(target.pos).is_air() {
            return TickOutcome::Idle;
        }

        ctx.ledger.submit(
            target.pos,
            ActionKind::StartDestroy,
            ctx.actor_position,
            effect_of(tool),
        );
        ctx.outbox.send(ClientMessage::ActionRequest {
            pos: target.pos,
            kind: ActionKind::StartDestroy,
            facing: target.facing,
        });
        remove_block(ctx, target.pos);

        self.delay_ticks = self.settings.cooldown_ticks;
        TickOutcome::Completed(target.pos)
    }

    /// Leaves `Destroying`, telling the server and forgetting every pending
    /// action on the target.
    fn abort(&mut self, ctx: &mut DestructionContext<'_>) -> Option<BlockPos> {
        let DestructionProgress::Destroying { target, .. } = std::mem::take(&mut self.progress)
        else {
            return None;
        };

        ctx.outbox.send(ClientMessage::ActionRequest {
            pos: target.pos,
            kind: ActionKind::AbortDestroy,
            facing: target.facing,
        });
        ctx.ledger.cancel(target.pos);
        debug!("Aborted destroying {}", target.pos);
        Some(target.pos)
    }
}

impl Default for DestructionController {
    fn default() -> Self {
        Self::new(DestructionSettings::default())
    }
}

fn effect_of(tool: &ToolState) -> EffectParams {
    EffectParams {
        tool_slot: tool.selected_slot,
        tool: tool.held.clone(),
    }
}

fn remove_block(ctx: &mut DestructionContext<'_>, pos: BlockPos) {
    match ctx.cache.set_block(pos, BlockState::AIR) {
        Some(old) if !old.is_air() => {
            ctx.events.send(WorldEvent::BlockChanged {
                pos,
                old,
                new: BlockState::AIR,
            });
            ctx.cues.push(FeedbackCue::Broken);
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Receiver;
    use vantage_net::outbound_channel;
    use vantage_world::{BlockDef, ChunkColumn, ColumnKey, SoundProfile, ToolClass};

    struct Rig {
        cache: ChunkCache,
        registry: BlockRegistry,
        ledger: ActionLedger,
        outbox: Outbox,
        sent: Receiver<ClientMessage>,
        events: WorldEventBuffer,
        cues: Vec<FeedbackCue>,
        stone: BlockState,
        glass: BlockState,
        bedrock: BlockState,
    }

    impl Rig {
        fn new() -> Self {
            let mut registry = BlockRegistry::new();
            let stone = registry
                .register(BlockDef {
                    name: "stone".into(),
                    hardness: 5.0,
                    solid: true,
                    preferred_tool: Some(ToolClass::Pickaxe),
                    sound: SoundProfile::default(),
                })
                .unwrap();
            let glass = registry
                .register(BlockDef {
                    name: "glass".into(),
                    hardness: 0.0,
                    solid: true,
                    preferred_tool: None,
                    sound: SoundProfile::default(),
                })
                .unwrap();
            let bedrock = registry
                .register(BlockDef {
                    name: "bedrock".into(),
                    hardness: -1.0,
                    solid: true,
                    preferred_tool: None,
                    sound: SoundProfile::default(),
                })
                .unwrap();

            let mut cache = ChunkCache::new(2);
            cache.insert(ChunkColumn::empty(ColumnKey::new(0, 0)));
            let (outbox, sent) = outbound_channel();
            Self {
                cache,
                registry,
                ledger: ActionLedger::new(),
                outbox,
                sent,
                events: WorldEventBuffer::new(),
                cues: Vec::new(),
                stone,
                glass,
                bedrock,
            }
        }

        fn tick(&mut self, ctl: &mut DestructionController, input: &DestructionInput) -> TickReport {
            let mut ctx = DestructionContext {
                cache: &mut self.cache,
                registry: &self.registry,
                ledger: &mut self.ledger,
                outbox: &self.outbox,
                events: &mut self.events,
                cues: &mut self.cues,
                actor_position: DVec3::new(0.5, 65.0, 0.5),
            };
            ctl.tick(input, &mut ctx)
        }

        fn sent(&self) -> Vec<ClientMessage> {
            self.sent.try_iter().collect()
        }
    }

    fn aim(x: i32) -> DestructionInput {
        DestructionInput {
            target: Some(TargetHit {
                pos: BlockPos::new(x, 64, 0),
                facing: Facing::Up,
            }),
            tool: ToolState::empty(0),
            fast_path: false,
        }
    }

    fn request(x: i32, kind: ActionKind) -> ClientMessage {
        ClientMessage::ActionRequest {
            pos: BlockPos::new(x, 64, 0),
            kind,
            facing: Facing::Up,
        }
    }

    #[test]
    fn test_break_rate_edge_hardness() {
        let rig = Rig::new();
        assert_eq!(break_rate(&rig.registry, rig.glass, None), 1.0);
        assert_eq!(break_rate(&rig.registry, rig.bedrock, None), 0.0);
        assert!((break_rate(&rig.registry, rig.stone, None) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_tool_flushed_once_per_change() {
        let mut rig = Rig::new();
        let mut ctl = DestructionController::default();
        let mut input = DestructionInput::default();
        rig.tick(&mut ctl, &input);
        rig.tick(&mut ctl, &input);
        input.tool.selected_slot = 3;
        rig.tick(&mut ctl, &input);
        rig.tick(&mut ctl, &input);
        assert_eq!(
            rig.sent(),
            vec![
                ClientMessage::ToolSelection { slot: 0 },
                ClientMessage::ToolSelection { slot: 3 },
            ]
        );
    }

    #[test]
    fn test_air_target_is_not_entered() {
        let mut rig = Rig::new();
        let mut ctl = DestructionController::default();
        let report = rig.tick(&mut ctl, &aim(1));
        assert_eq!(report.outcome, TickOutcome::Idle);
        assert!(rig.ledger.is_empty());
        assert!(!ctl.is_destroying());
    }

    #[test]
    fn test_entry_sends_start_and_attack() {
        let mut rig = Rig::new();
        rig.cache.set_block(BlockPos::new(1, 64, 0), rig.stone);
        let mut ctl = DestructionController::default();
        rig.tick(&mut ctl, &aim(1));

        assert_eq!(
            rig.sent(),
            vec![
                ClientMessage::ToolSelection { slot: 0 },
                request(1, ActionKind::StartDestroy),
            ]
        );
        assert!(rig.ledger.contains(BlockPos::new(1, 64, 0), ActionKind::StartDestroy));
        assert_eq!(rig.cues[0], FeedbackCue::Attack);
        assert!(matches!(rig.cues[1], FeedbackCue::Hit { .. }));
        assert_eq!(rig.cues[2], FeedbackCue::CrackStage(1));
    }

    #[test]
    fn test_unbreakable_target_never_completes() {
        let mut rig = Rig::new();
        rig.cache.set_block(BlockPos::new(1, 64, 0), rig.bedrock);
        let mut ctl = DestructionController::default();
        for _ in 0..50 {
            let report = rig.tick(&mut ctl, &aim(1));
            assert!(matches!(report.outcome, TickOutcome::Destroying { progress, .. } if progress == 0.0));
        }
    }

    #[test]
    fn test_zero_hardness_breaks_on_entry_tick() {
        let mut rig = Rig::new();
        rig.cache.set_block(BlockPos::new(1, 64, 0), rig.glass);
        let mut ctl = DestructionController::default();
        let report = rig.tick(&mut ctl, &aim(1));
        assert_eq!(report.outcome, TickOutcome::Completed(BlockPos::new(1, 64, 0)));
        assert_eq!(ctl.delay_ticks(), DEFAULT_COOLDOWN_TICKS);
        assert_eq!(rig.cache.block_state(BlockPos::new(1, 64, 0)), BlockState::AIR);
    }

    #[test]
    fn test_hit_cue_every_fourth_tick() {
        let mut rig = Rig::new();
        rig.cache.set_block(BlockPos::new(1, 64, 0), rig.bedrock);
        let mut ctl = DestructionController::default();
        for _ in 0..9 {
            rig.tick(&mut ctl, &aim(1));
        }
        let hits = rig
            .cues
            .iter()
            .filter(|c| matches!(c, FeedbackCue::Hit { .. }))
            .count();
        // elapsed 0, 4, 8
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_retarget_aborts_then_enters_same_tick() {
        let mut rig = Rig::new();
        rig.cache.set_block(BlockPos::new(1, 64, 0), rig.stone);
        rig.cache.set_block(BlockPos::new(2, 64, 0), rig.stone);
        let mut ctl = DestructionController::default();
        rig.tick(&mut ctl, &aim(1));
        rig.sent();

        let report = rig.tick(&mut ctl, &aim(2));
        assert_eq!(report.aborted, Some(BlockPos::new(1, 64, 0)));
        assert!(matches!(report.outcome, TickOutcome::Destroying { pos, .. } if pos == BlockPos::new(2, 64, 0)));
        assert_eq!(
            rig.sent(),
            vec![
                request(1, ActionKind::AbortDestroy),
                request(2, ActionKind::StartDestroy),
            ]
        );
        assert!(!rig.ledger.contains(BlockPos::new(1, 64, 0), ActionKind::StartDestroy));
    }

    #[test]
    fn test_tool_swap_restarts_progress() {
        let mut rig = Rig::new();
        rig.cache.set_block(BlockPos::new(1, 64, 0), rig.stone);
        let mut ctl = DestructionController::default();
        rig.tick(&mut ctl, &aim(1));
        rig.tick(&mut ctl, &aim(1));

        let mut swapped = aim(1);
        swapped.tool = ToolState::holding(
            0,
            ItemIdentity {
                item_id: 9,
                component_hash: 0,
                damage: 0,
                damageable: true,
                tool_class: Some(ToolClass::Pickaxe),
                speed: 2.0,
            },
        );
        let report = rig.tick(&mut ctl, &swapped);
        assert_eq!(report.aborted, Some(BlockPos::new(1, 64, 0)));
        // Fresh entry with the pickaxe: 2.0 / 5.0.
        assert!(matches!(report.outcome, TickOutcome::Destroying { progress, .. } if (progress - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_released_target_clears_crack_overlay() {
        let mut rig = Rig::new();
        rig.cache.set_block(BlockPos::new(1, 64, 0), rig.stone);
        let mut ctl = DestructionController::default();
        rig.tick(&mut ctl, &aim(1));
        rig.cues.clear();

        let report = rig.tick(&mut ctl, &DestructionInput::default());
        assert_eq!(report.aborted, Some(BlockPos::new(1, 64, 0)));
        assert_eq!(rig.cues, vec![FeedbackCue::CrackStage(-1)]);
        assert_eq!(ctl.progress_stage(), -1);
        assert!(rig.ledger.is_empty());
    }

    #[test]
    fn test_cooldown_suppresses_everything_but_tool_flush() {
        let mut rig = Rig::new();
        rig.cache.set_block(BlockPos::new(1, 64, 0), rig.glass);
        rig.cache.set_block(BlockPos::new(2, 64, 0), rig.glass);
        let mut ctl = DestructionController::default();
        rig.tick(&mut ctl, &aim(1));
        rig.sent();

        let mut input = aim(2);
        input.tool.selected_slot = 4;
        let report = rig.tick(&mut ctl, &input);
        assert_eq!(report.outcome, TickOutcome::CoolingDown);
        assert_eq!(rig.sent(), vec![ClientMessage::ToolSelection { slot: 4 }]);
        assert_eq!(ctl.delay_ticks(), DEFAULT_COOLDOWN_TICKS - 1);
    }
}
