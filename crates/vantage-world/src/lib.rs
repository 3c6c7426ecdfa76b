//! Client-side world view: block registry, column storage, and the toroidal
//! column cache that follows the local viewpoint.

pub mod chunk_cache;
pub mod column;
pub mod events;
pub mod position;
pub mod registry;
pub mod section;

pub use chunk_cache::{ChunkCache, InsertOutcome, MIN_RADIUS, VIEW_MARGIN};
pub use column::{
    ChunkColumn, ColumnPayload, PayloadError, SECTIONS_PER_COLUMN, SectionBlocks, SectionPayload,
    WORLD_HEIGHT,
};
pub use events::{WorldEvent, WorldEventBuffer};
pub use position::{BlockPos, COLUMN_WIDTH, ColumnKey, Facing};
pub use registry::{BlockDef, BlockRegistry, BlockState, RegistryError, SoundProfile, ToolClass};
pub use section::{SECTION_SIZE, SECTION_VOLUME, Section};
