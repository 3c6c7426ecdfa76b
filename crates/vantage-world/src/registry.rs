//! Block registry: maps compact [`BlockState`] ids to the material properties
//! the client needs for prediction (hardness, collision, tool affinity, sound).
//!
//! The registry is built once when the session starts. Air is always id 0 so
//! that an absent section reads as empty space.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact block state identifier stored in every block cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState(pub u16);

impl BlockState {
    /// Air / empty space.
    pub const AIR: Self = Self(0);

    /// Returns `true` if this is air.
    pub fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// Broad tool category a material prefers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolClass {
    /// Stone, ores.
    Pickaxe,
    /// Dirt, sand, gravel.
    Shovel,
    /// Wood.
    Axe,
}

/// Sound parameters of a material.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundProfile {
    /// Base volume.
    pub volume: f32,
    /// Base pitch.
    pub pitch: f32,
}

impl Default for SoundProfile {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
        }
    }
}

/// Full descriptor for a block state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockDef {
    /// Human-readable name (e.g. "stone").
    pub name: String,
    /// Seconds-equivalent hardness. Negative values are unbreakable, zero
    /// breaks instantly.
    pub hardness: f32,
    /// Whether actors collide with this block.
    pub solid: bool,
    /// Tool class that breaks this block faster.
    pub preferred_tool: Option<ToolClass>,
    /// Sound parameters used for break feedback.
    pub sound: SoundProfile,
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// All 65 536 ids have been consumed.
    #[error("block registry is full (max 65536 states)")]
    RegistryFull,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockState`] → [`BlockDef`] with O(1) lookup by id and by name.
pub struct BlockRegistry {
    /// Dense array where `index == BlockState.0`.
    defs: Vec<BlockDef>,
    name_to_id: FxHashMap<String, BlockState>,
}

impl BlockRegistry {
    /// Creates a registry with air pre-registered as id 0.
    pub fn new() -> Self {
        let air = BlockDef {
            name: "air".to_string(),
            hardness: 0.0,
            solid: false,
            preferred_tool: None,
            sound: SoundProfile::default(),
        };

        let mut name_to_id = FxHashMap::default();
        name_to_id.insert("air".to_string(), BlockState::AIR);

        Self {
            defs: vec![air],
            name_to_id,
        }
    }

    /// Registers a block and returns its id. Ids are assigned sequentially
    /// from 1.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the name is taken, or
    /// [`RegistryError::RegistryFull`] once every id is used.
    pub fn register(&mut self, def: BlockDef) -> Result<BlockState, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.defs.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockState(self.defs.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.defs.push(def);
        Ok(id)
    }

    /// Definition for `state`, or `None` for ids the server sent that this
    /// client does not know.
    pub fn get(&self, state: BlockState) -> Option<&BlockDef> {
        self.defs.get(state.0 as usize)
    }

    /// Id for a named block.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockState> {
        self.name_to_id.get(name).copied()
    }

    /// Hardness of `state`. Unknown ids are treated as unbreakable.
    pub fn hardness(&self, state: BlockState) -> f32 {
        self.get(state).map_or(-1.0, |d| d.hardness)
    }

    /// Whether `state` blocks actor movement. Unknown ids are solid so the
    /// actor never walks into data it cannot interpret.
    pub fn is_solid(&self, state: BlockState) -> bool {
        self.get(state).is_none_or(|d| d.solid)
    }

    /// Sound profile of `state`.
    pub fn sound(&self, state: BlockState) -> SoundProfile {
        self.get(state).map(|d| d.sound).unwrap_or_default()
    }

    /// Number of registered states (including air).
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.len() <= 1
    }
}

impl Default for BlockRegistry {
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

    fn stone_def() -> BlockDef {
        BlockDef {
            name: "stone".to_string(),
            hardness: 1.5,
            solid: true,
            preferred_tool: Some(ToolClass::Pickaxe),
            sound: SoundProfile {
                volume: 1.0,
                pitch: 1.0,
            },
        }
    }

    #[test]
    fn test_air_is_id_zero() {
        let registry = BlockRegistry::new();
        assert_eq!(registry.lookup_by_name("air"), Some(BlockState::AIR));
        assert!(!registry.is_solid(BlockState::AIR));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(stone_def()).unwrap();
        let dirt = registry
            .register(BlockDef {
                name: "dirt".to_string(),
                hardness: 0.5,
                solid: true,
                preferred_tool: Some(ToolClass::Shovel),
                sound: SoundProfile::default(),
            })
            .unwrap();
        assert_eq!(stone, BlockState(1));
        assert_eq!(dirt, BlockState(2));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.hardness(stone), 1.5);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = BlockRegistry::new();
        registry.register(stone_def()).unwrap();
        let err = registry.register(stone_def()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(ref n) if n == "stone"));
    }

    #[test]
    fn test_unknown_state_is_solid_and_unbreakable() {
        let registry = BlockRegistry::new();
        let unknown = BlockState(999);
        assert!(registry.get(unknown).is_none());
        assert!(registry.is_solid(unknown));
        assert!(registry.hardness(unknown) < 0.0);
    }
}
