//! The local actor: position and collision box used for rollback checks.

use glam::DVec3;
use vantage_world::BlockPos;

/// Default half-width of the actor's collision box, in blocks.
pub const ACTOR_HALF_WIDTH: f64 = 0.3;

/// Default height of the actor's collision box, in blocks.
pub const ACTOR_HEIGHT: f64 = 1.8;

/// Axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// Creates a box from its corners.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// The unit cube occupied by a block.
    pub fn block(pos: BlockPos) -> Self {
        let min = DVec3::new(f64::from(pos.x), f64::from(pos.y), f64::from(pos.z));
        Self::new(min, min + DVec3::ONE)
    }

    /// Returns `true` if the boxes share interior volume. Touching faces do
    /// not count, so an actor standing on a block does not collide with it.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

/// The locally controlled actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    /// Feet position (bottom center of the collision box).
    pub position: DVec3,
    half_width: f64,
    height: f64,
}

impl Actor {
    /// Actor with the default collision box at `position`.
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            half_width: ACTOR_HALF_WIDTH,
            height: ACTOR_HEIGHT,
        }
    }

    /// Current collision box.
    pub fn bounds(&self) -> Aabb {
        let half = DVec3::new(self.half_width, 0.0, self.half_width);
        Aabb::new(
            self.position - half,
            self.position + half + DVec3::new(0.0, self.height, 0.0),
        )
    }

    /// Returns `true` if the actor occupies part of the block at `pos`.
    pub fn intersects_block(&self, pos: BlockPos) -> bool {
        self.bounds().overlaps(&Aabb::block(pos))
    }

    /// Moves the actor without collision checks.
    pub fn teleport(&mut self, position: DVec3) {
        self.position = position;
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new(DVec3::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
