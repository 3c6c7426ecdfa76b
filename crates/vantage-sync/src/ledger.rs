//! Speculative action ledger.
//!
//! Every block action the client applies before the server confirms it is
//! recorded here under `(position, kind)`. When the server's acknowledgment
//! arrives, [`ActionLedger::resolve`] removes the entry and decides whether
//! the local prediction must be corrected.
//!
//! The ledger is bounded. Past its capacity the oldest live entry is dropped
//! and logged; an ack for it later takes the missing-entry path.
//!
//! Entries live in a hash map keyed by `(position, kind)`. Insertion order is
//! tracked by a deque of `(sequence, key)` pairs. Replacing, cancelling or
//! resolving an entry leaves its deque record behind; eviction skips records
//! whose sequence no longer matches the live entry.

use std::collections::VecDeque;

use glam::DVec3;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use vantage_net::ActionKind;
use vantage_world::{BlockPos, BlockState};

use crate::tool::ItemIdentity;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default maximum number of unacknowledged actions.
pub const DEFAULT_LEDGER_CAPACITY: usize = 50;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ledger key: the target block and the action applied to it.
pub type ActionKey = (BlockPos, ActionKind);

/// Tool context the action was performed with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectParams {
    /// Hotbar slot selected when the action was issued.
    pub tool_slot: u8,
    /// Item held at that moment.
    pub tool: Option<ItemIdentity>,
}

/// An action applied locally but not yet acknowledged by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    /// Actor position just before the action was applied.
    pub predicted_position: DVec3,
    /// Tool context.
    pub effect: EffectParams,
}

/// What the session must do after an acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollbackDecision {
    /// Local state already agrees with the server.
    Keep,
    /// Force the block to `state`. If `restore_to` is set and the actor now
    /// collides with the corrected block, move the actor back there.
    Correct {
        /// Authoritative block state.
        state: BlockState,
        /// Actor position recorded when the action was submitted.
        restore_to: Option<DVec3>,
    },
}

// ---------------------------------------------------------------------------
// ActionLedger
// ---------------------------------------------------------------------------

/// Bounded, insertion-ordered map of [`PendingAction`]s.
#[derive(Debug)]
pub struct ActionLedger {
    entries: FxHashMap<ActionKey, (u64, PendingAction)>,
    order: VecDeque<(u64, ActionKey)>,
    next_seq: u64,
    capacity: usize,
}

impl ActionLedger {
    /// Creates a ledger with [`DEFAULT_LEDGER_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }

    /// Creates a ledger holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: FxHashMap::default(),
            order: VecDeque::with_capacity(capacity + 1),
            next_seq: 0,
            capacity,
        }
    }

    /// Maximum number of live entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `(pos, kind)` is pending.
    pub fn contains(&self, pos: BlockPos, kind: ActionKind) -> bool {
        self.entries.contains_key(&(pos, kind))
    }

    /// The pending entry for `(pos, kind)`.
    pub fn get(&self, pos: BlockPos, kind: ActionKind) -> Option<&PendingAction> {
        self.entries.get(&(pos, kind)).map(|(_, action)| action)
    }

    /// Records a locally applied action.
    ///
    /// A live entry with the same key is replaced and becomes the newest.
    pub fn submit(
        &mut self,
        pos: BlockPos,
        kind: ActionKind,
        predicted_position: DVec3,
        effect: EffectParams,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let key = (pos, kind);
        self.entries.insert(
            key,
            (
                seq,
                PendingAction {
                    predicted_position,
                    effect,
                },
            ),
        );
        self.order.push_back((seq, key));

        if self.entries.len() > self.capacity {
            self.evict_oldest();
        }
        self.compact_if_sparse();
    }

    /// Drops every pending entry targeting `pos`. Returns how many were
    /// removed.
    pub fn cancel(&mut self, pos: BlockPos) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(p, _), _| *p != pos);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Cancelled {} pending action(s) at {}", removed, pos);
        }
        removed
    }

    /// Matches a server acknowledgment and decides whether `local` must be
    /// corrected to `authoritative`.
    ///
    /// Only a `StartDestroy` the server accepted may legitimately differ
    /// from the local state (breaking has begun, the block is still there).
    /// Every other mismatch is corrected. A second resolve for the same key
    /// finds no entry and carries no restore position.
    pub fn resolve(
        &mut self,
        pos: BlockPos,
        kind: ActionKind,
        authoritative: BlockState,
        accepted: bool,
        local: BlockState,
    ) -> RollbackDecision {
        let entry = self.entries.remove(&(pos, kind)).map(|(_, action)| action);
        if entry.is_none() {
            debug!("Ack for unknown action {:?} at {}", kind, pos);
        }

        if local == authoritative {
            return RollbackDecision::Keep;
        }
        let must_correct = entry.is_none() || !accepted || kind != ActionKind::StartDestroy;
        if !must_correct {
            return RollbackDecision::Keep;
        }

        RollbackDecision::Correct {
            state: authoritative,
            restore_to: entry.map(|action| action.predicted_position),
        }
    }

    /// Removes the oldest live entry.
    fn evict_oldest(&mut self) {
        while let Some((seq, key)) = self.order.pop_front() {
            let live = self.entries.get(&key).is_some_and(|(s, _)| *s == seq);
            if live {
                self.entries.remove(&key);
                warn!(
                    "Action ledger full ({}), dropped oldest pending {:?} at {}",
                    self.capacity, key.1, key.0
                );
                return;
            }
        }
    }

    /// Bounds the order deque when cancels and resolves leave many dead
    /// records behind.
    fn compact_if_sparse(&mut self) {
        if self.order.len() <= self.capacity * 2 {
            return;
        }
        let entries = &self.entries;
        self.order
            .retain(|(seq, key)| entries.get(key).is_some_and(|(s, _)| s == seq));
    }
}

impl Default for ActionLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const STONE: BlockState = BlockState(1);

    fn p(i: i32) -> BlockPos {
        BlockPos::new(i, 64, 0)
    }

    fn submit(ledger: &mut ActionLedger, pos: BlockPos, kind: ActionKind) {
        ledger.submit(pos, kind, DVec3::new(0.5, 65.0, 0.5), EffectParams::default());
    }

    #[test]
    fn test_capacity_evicts_single_oldest() {
        let mut ledger = ActionLedger::new();
        for i in 0..50 {
            submit(&mut ledger, p(i), ActionKind::StartDestroy);
        }
        assert_eq!(ledger.len(), 50);

        submit(&mut ledger, p(50), ActionKind::StartDestroy);
        assert_eq!(ledger.len(), 50);
        assert!(!ledger.contains(p(0), ActionKind::StartDestroy));
        assert!(ledger.contains(p(1), ActionKind::StartDestroy));
        assert!(ledger.contains(p(50), ActionKind::StartDestroy));
    }

    #[test]
    fn test_resubmit_moves_key_to_newest() {
        let mut ledger = ActionLedger::with_capacity(3);
        submit(&mut ledger, p(0), ActionKind::StartDestroy);
        submit(&mut ledger, p(1), ActionKind::StartDestroy);
        submit(&mut ledger, p(0), ActionKind::StartDestroy);
        assert_eq!(ledger.len(), 2);

        submit(&mut ledger, p(2), ActionKind::StartDestroy);
        submit(&mut ledger, p(3), ActionKind::StartDestroy);
        // p(1) was oldest once p(0) was refreshed.
        assert!(!ledger.contains(p(1), ActionKind::StartDestroy));
        assert!(ledger.contains(p(0), ActionKind::StartDestroy));
    }

    #[test]
    fn test_eviction_skips_resolved_records() {
        let mut ledger = ActionLedger::with_capacity(2);
        submit(&mut ledger, p(0), ActionKind::StartDestroy);
        submit(&mut ledger, p(1), ActionKind::StartDestroy);
        ledger.resolve(p(0), ActionKind::StartDestroy, STONE, true, STONE);
        submit(&mut ledger, p(2), ActionKind::StartDestroy);
        assert_eq!(ledger.len(), 2);

        submit(&mut ledger, p(3), ActionKind::StartDestroy);
        assert!(!ledger.contains(p(1), ActionKind::StartDestroy));
        assert!(ledger.contains(p(2), ActionKind::StartDestroy));
        assert!(ledger.contains(p(3), ActionKind::StartDestroy));
    }

    #[test]
    fn test_order_deque_stays_bounded() {
        let mut ledger = ActionLedger::with_capacity(4);
        for i in 0..1000 {
            submit(&mut ledger, p(i % 3), ActionKind::StopDestroy);
            ledger.cancel(p(i % 3));
        }
        assert!(ledger.is_empty());
        assert!(ledger.order.len() <= 9);
    }

    #[test]
    fn test_cancel_removes_all_kinds_at_position() {
        let mut ledger = ActionLedger::new();
        submit(&mut ledger, p(0), ActionKind::StartDestroy);
        submit(&mut ledger, p(0), ActionKind::StopDestroy);
        submit(&mut ledger, p(1), ActionKind::StartDestroy);
        assert_eq!(ledger.cancel(p(0)), 2);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.cancel(p(0)), 0);
    }

    #[test]
    fn test_matching_state_keeps_prediction() {
        let mut ledger = ActionLedger::new();
        submit(&mut ledger, p(0), ActionKind::StopDestroy);
        let decision = ledger.resolve(
            p(0),
            ActionKind::StopDestroy,
            BlockState::AIR,
            true,
            BlockState::AIR,
        );
        assert_eq!(decision, RollbackDecision::Keep);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_accepted_start_may_differ() {
        let mut ledger = ActionLedger::new();
        submit(&mut ledger, p(0), ActionKind::StartDestroy);
        let decision = ledger.resolve(p(0), ActionKind::StartDestroy, STONE, true, BlockState::AIR);
        assert_eq!(decision, RollbackDecision::Keep);
    }

    #[test]
    fn test_rejected_action_restores_snapshot() {
        let mut ledger = ActionLedger::new();
        let snapshot = DVec3::new(1.5, 64.0, 2.5);
        ledger.submit(p(0), ActionKind::StopDestroy, snapshot, EffectParams::default());
        let decision = ledger.resolve(p(0), ActionKind::StopDestroy, STONE, false, BlockState::AIR);
        assert_eq!(
            decision,
            RollbackDecision::Correct {
                state: STONE,
                restore_to: Some(snapshot),
            }
        );
    }

    #[test]
    fn test_accepted_stop_with_mismatch_is_corrected() {
        let mut ledger = ActionLedger::new();
        submit(&mut ledger, p(0), ActionKind::StopDestroy);
        let decision = ledger.resolve(p(0), ActionKind::StopDestroy, STONE, true, BlockState::AIR);
        assert!(matches!(
            decision,
            RollbackDecision::Correct {
                state: STONE,
                restore_to: Some(_)
            }
        ));
    }

    #[test]
    fn test_unknown_ack_with_matching_state_is_noop() {
        // Rejected ack for an entry already resolved, block still solid locally.
        let mut ledger = ActionLedger::new();
        let decision = ledger.resolve(p(0), ActionKind::StartDestroy, STONE, false, STONE);
        assert_eq!(decision, RollbackDecision::Keep);
    }

    #[test]
    fn test_unknown_ack_with_mismatch_corrects_without_restore() {
        let mut ledger = ActionLedger::new();
        let decision = ledger.resolve(p(0), ActionKind::StartDestroy, STONE, true, BlockState::AIR);
        assert_eq!(
            decision,
            RollbackDecision::Correct {
                state: STONE,
                restore_to: None,
            }
        );
    }

    #[test]
    fn test_second_resolve_has_no_restore() {
        let mut ledger = ActionLedger::new();
        submit(&mut ledger, p(0), ActionKind::StopDestroy);
        let first = ledger.resolve(p(0), ActionKind::StopDestroy, STONE, false, BlockState::AIR);
        assert!(matches!(
            first,
            RollbackDecision::Correct {
                restore_to: Some(_),
                ..
            }
        ));
        // Local state was corrected by the caller; the repeat sees agreement.
        let second = ledger.resolve(p(0), ActionKind::StopDestroy, STONE, false, STONE);
        assert_eq!(second, RollbackDecision::Keep);
    }

    #[test]
    fn test_resolve_then_submit_same_key() {
        let mut ledger = ActionLedger::with_capacity(1);
        submit(&mut ledger, p(0), ActionKind::StartDestroy);
        ledger.resolve(p(0), ActionKind::StartDestroy, STONE, true, STONE);
        submit(&mut ledger, p(0), ActionKind::StartDestroy);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(p(0), ActionKind::StartDestroy));
    }
}
