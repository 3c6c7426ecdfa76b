//! Scripted input standing in for a player.
//!
//! Phases, by tick:
//! - `0..10`: idle while the initial view streams in.
//! - `10..74`: mine a row of stone with a pickaxe, one block every 8 ticks.
//! - `74..80`: start on deepslate bare-handed, then switch to the pickaxe.
//! - `80..100`: dig inside the protected area, which the server rejects.
//! - after that: idle.

use vantage_sync::{DestructionInput, ItemIdentity, TargetHit, ToolState};
use vantage_world::{BlockPos, Facing, ToolClass};

/// Ticks spent on each block of the stone row.
const ROW_STRIDE: u64 = 8;

/// Hotbar slot holding the pickaxe.
pub const PICKAXE_SLOT: u8 = 0;
/// Empty hotbar slot.
pub const HAND_SLOT: u8 = 1;

/// The pickaxe carried in [`PICKAXE_SLOT`].
pub fn pickaxe() -> ItemIdentity {
    ItemIdentity {
        item_id: 1,
        component_hash: 0,
        damage: 0,
        damageable: true,
        tool_class: Some(ToolClass::Pickaxe),
        speed: 2.0,
    }
}

fn aim(pos: BlockPos, tool: ToolState) -> DestructionInput {
    DestructionInput {
        target: Some(TargetHit {
            pos,
            facing: Facing::Up,
        }),
        tool,
        fast_path: false,
    }
}

/// Input for `tick`.
pub fn input_for(tick: u64) -> DestructionInput {
    match tick {
        10..74 => {
            let i = ((tick - 10) / ROW_STRIDE) as i32;
            aim(
                BlockPos::new(1 + i, 63, 4),
                ToolState::holding(PICKAXE_SLOT, pickaxe()),
            )
        }
        74..76 => aim(BlockPos::new(2, 20, 4), ToolState::empty(HAND_SLOT)),
        76..80 => aim(
            BlockPos::new(2, 20, 4),
            ToolState::holding(PICKAXE_SLOT, pickaxe()),
        ),
        80..100 => aim(BlockPos::new(-3, 63, 4), ToolState::empty(HAND_SLOT)),
        _ => DestructionInput::default(),
    }
}
