//! Block set and terrain shared by the client and the simulated server.

use vantage_world::{
    BlockDef, BlockRegistry, BlockState, ColumnPayload, RegistryError, SectionBlocks,
    SectionPayload, SoundProfile, ToolClass,
};

/// Ids of the blocks the demo world is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoBlocks {
    /// Unbreakable floor.
    pub bedrock: BlockState,
    /// Hard layer, slow without a pickaxe.
    pub deepslate: BlockState,
    /// Surface layer.
    pub stone: BlockState,
}

/// Builds the registry used by both ends of the connection.
pub fn demo_registry() -> Result<(BlockRegistry, DemoBlocks), RegistryError> {
    let mut registry = BlockRegistry::new();
    let bedrock = registry.register(BlockDef {
        name: "bedrock".into(),
        hardness: -1.0,
        solid: true,
        preferred_tool: None,
        sound: SoundProfile::default(),
    })?;
    let deepslate = registry.register(BlockDef {
        name: "deepslate".into(),
        hardness: 8.0,
        solid: true,
        preferred_tool: Some(ToolClass::Pickaxe),
        sound: SoundProfile {
            volume: 1.0,
            pitch: 0.8,
        },
    })?;
    let stone = registry.register(BlockDef {
        name: "stone".into(),
        hardness: 4.0,
        solid: true,
        preferred_tool: Some(ToolClass::Pickaxe),
        sound: SoundProfile::default(),
    })?;
    Ok((
        registry,
        DemoBlocks {
            bedrock,
            deepslate,
            stone,
        },
    ))
}

/// Flat terrain: bedrock in section 0, deepslate in section 1, stone up to
/// y = 63, air above.
pub fn ground_payload(blocks: &DemoBlocks) -> ColumnPayload {
    let layer = |index: u8, state: BlockState| SectionPayload {
        index,
        blocks: SectionBlocks::Uniform(state),
    };
    ColumnPayload {
        sections: vec![
            layer(0, blocks.bedrock),
            layer(1, blocks.deepslate),
            layer(2, blocks.stone),
            layer(3, blocks.stone),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_world::{ChunkColumn, ColumnKey};

    #[test]
    fn test_registry_ids_are_distinct() {
        let (registry, blocks) = demo_registry().unwrap();
        assert_eq!(registry.len(), 4);
        assert_ne!(blocks.stone, blocks.deepslate);
        assert_eq!(registry.lookup_by_name("stone"), Some(blocks.stone));
    }

    #[test]
    fn test_ground_layers() {
        let (_, blocks) = demo_registry().unwrap();
        let column =
            ChunkColumn::from_payload(ColumnKey::new(0, 0), &ground_payload(&blocks), true)
                .unwrap();
        assert_eq!(column.block(0, 0, 0), blocks.bedrock);
        assert_eq!(column.block(0, 20, 0), blocks.deepslate);
        assert_eq!(column.block(0, 63, 0), blocks.stone);
        assert!(column.block(0, 64, 0).is_air());
    }
}
