//! Client-side prediction for block actions.
//!
//! The [`Session`] owns the column cache, the [`ActionLedger`] of
//! unacknowledged actions and the [`DestructionController`], and advances
//! them once per tick. Actions are applied locally first and reconciled when
//! the server acknowledges them.

pub mod actor;
pub mod destruction;
pub mod feedback;
pub mod ledger;
pub mod session;
pub mod tool;

pub use actor::{Aabb, Actor};
pub use destruction::{
    DestructionContext, DestructionController, DestructionInput, DestructionProgress,
    DestructionSettings, TargetHit, TickOutcome, TickReport, break_rate,
};
pub use feedback::FeedbackCue;
pub use ledger::{
    ActionKey, ActionLedger, DEFAULT_LEDGER_CAPACITY, EffectParams, PendingAction,
    RollbackDecision,
};
pub use session::{Session, SessionSettings, SessionStats};
pub use tool::{ItemIdentity, ToolState, efficiency};
