//! Held-tool model used by destruction progress and break-rate computation.

use serde::{Deserialize, Serialize};
use vantage_world::ToolClass;

/// Identity of the item held in the actor's hand, reduced to what matters
/// for breaking blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemIdentity {
    /// Item type id.
    pub item_id: u32,
    /// Hash of the item's extra components (enchantments, custom data).
    pub component_hash: u64,
    /// Current damage value.
    pub damage: u32,
    /// Whether the item wears down with use.
    pub damageable: bool,
    /// Tool category, if the item is a tool.
    pub tool_class: Option<ToolClass>,
    /// Break speed multiplier when used on a matching material.
    pub speed: f32,
}

impl ItemIdentity {
    /// Whether swapping from `a` to `b` lets breaking continue.
    ///
    /// A tool that only took damage while breaking is still the same tool;
    /// any other difference restarts progress.
    pub fn same_for_breaking(a: Option<&Self>, b: Option<&Self>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.item_id == b.item_id
                    && a.component_hash == b.component_hash
                    && (a.damageable || a.damage == b.damage)
            }
            _ => false,
        }
    }
}

/// Break speed of `tool` against a material preferring `preferred`.
///
/// Bare hands and mismatched tools break at the base rate of 1.0.
pub fn efficiency(tool: Option<&ItemIdentity>, preferred: Option<ToolClass>) -> f32 {
    match (tool, preferred) {
        (Some(tool), Some(class)) if tool.tool_class == Some(class) => tool.speed,
        _ => 1.0,
    }
}

/// Tool selection reported by the input layer each tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolState {
    /// Selected hotbar slot.
    pub selected_slot: u8,
    /// Item in that slot, if any.
    pub held: Option<ItemIdentity>,
}

impl ToolState {
    /// Tool state holding `item` in `slot`.
    pub fn holding(slot: u8, item: ItemIdentity) -> Self {
        Self {
            selected_slot: slot,
            held: Some(item),
        }
    }

    /// Empty hand in `slot`.
    pub fn empty(slot: u8) -> Self {
        Self {
            selected_slot: slot,
            held: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pickaxe(damage: u32) -> ItemIdentity {
        ItemIdentity {
            item_id: 7,
            component_hash: 0,
            damage,
            damageable: true,
            tool_class: Some(ToolClass::Pickaxe),
            speed: 4.0,
        }
    }

    #[test]
    fn test_empty_hands_are_compatible() {
        assert!(ItemIdentity::same_for_breaking(None, None));
    }

    #[test]
    fn test_one_empty_hand_is_incompatible() {
        let tool = pickaxe(0);
        assert!(!ItemIdentity::same_for_breaking(Some(&tool), None));
        assert!(!ItemIdentity::same_for_breaking(None, Some(&tool)));
    }

    #[test]
    fn test_damage_ignored_for_damageable_tools() {
        assert!(ItemIdentity::same_for_breaking(
            Some(&pickaxe(0)),
            Some(&pickaxe(3))
        ));
    }

    #[test]
    fn test_damage_matters_for_non_damageable_items() {
        let mut a = pickaxe(0);
        a.damageable = false;
        let mut b = a.clone();
        b.damage = 1;
        assert!(!ItemIdentity::same_for_breaking(Some(&a), Some(&b)));
    }

    #[test]
    fn test_component_hash_difference_resets() {
        let a = pickaxe(0);
        let mut b = pickaxe(0);
        b.component_hash = 99;
        assert!(!ItemIdentity::same_for_breaking(Some(&a), Some(&b)));
    }

    #[test]
    fn test_efficiency_requires_matching_class() {
        let tool = pickaxe(0);
        assert_eq!(efficiency(Some(&tool), Some(ToolClass::Pickaxe)), 4.0);
        assert_eq!(efficiency(Some(&tool), Some(ToolClass::Shovel)), 1.0);
        assert_eq!(efficiency(Some(&tool), None), 1.0);
        assert_eq!(efficiency(None, Some(ToolClass::Pickaxe)), 1.0);
    }
}
