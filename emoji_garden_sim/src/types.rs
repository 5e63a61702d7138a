// Core types shared across the simulation.
//
// Defines canvas positions (`Position`), the stable entity handle
// (`EntityId`), the closed set of entity kinds (`EntityKind`) and the
// simulation speed setting. Everything derives `Serialize`/`Deserialize` so
// commands and events can cross the collaborator boundary as JSON.
//
// Coordinates follow the canvas convention: x grows to the right, y grows
// downward, and a token's position is the top-left corner of its box. The
// ground line is therefore a *large* y value.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A point on the play area, in canvas units (pixels in the browser build).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two positions.
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Move up to `speed` units toward `target` without overshooting it.
    pub fn step_toward(self, target: Self, speed: f32) -> Self {
        let distance = self.distance(target);
        if distance <= speed || distance == 0.0 {
            return target;
        }
        let scale = speed / distance;
        self.offset((target.x - self.x) * scale, (target.y - self.y) * scale)
    }

    /// Clamp into the box `[0, max_x] × [0, max_y]`.
    pub fn clamped(self, max_x: f32, max_y: f32) -> Self {
        Self::new(self.x.clamp(0.0, max_x.max(0.0)), self.y.clamp(0.0, max_y.max(0.0)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Entity handles
// ---------------------------------------------------------------------------

/// Stable handle for an entity in the registry.
///
/// Handles are allocated from a monotonic counter and never reused, so a
/// handle held by another entity (a butterfly's home bush, a bird's home
/// tree) either resolves to the entity it was created for or to nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Simulation enums
// ---------------------------------------------------------------------------

/// Every kind of token the garden simulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Bird,
    Butterfly,
    Bush,
    Tree,
    Nest,
    Worm,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Bird,
        EntityKind::Butterfly,
        EntityKind::Bush,
        EntityKind::Tree,
        EntityKind::Nest,
        EntityKind::Worm,
    ];

    /// Lowercase name used in event-feed messages.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Bird => "bird",
            EntityKind::Butterfly => "butterfly",
            EntityKind::Bush => "bush",
            EntityKind::Tree => "tree",
            EntityKind::Nest => "nest",
            EntityKind::Worm => "worm",
        }
    }

    /// The emoji glyph the token is drawn with.
    pub fn emoji(self) -> &'static str {
        match self {
            EntityKind::Bird => "🐦",
            EntityKind::Butterfly => "🦋",
            EntityKind::Bush => "🌺",
            EntityKind::Tree => "🌳",
            EntityKind::Nest => "🥚",
            EntityKind::Worm => "🐛",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Simulation speed settings. Only `SimState::update` (the per-frame entry
/// point) honors this; `SimState::step` always advances one tick at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimSpeed {
    Paused,
    #[default]
    Normal,
    Fast,
}

impl SimSpeed {
    /// How many simulation ticks one rendered frame advances.
    pub fn ticks_per_frame(self) -> u32 {
        match self {
            SimSpeed::Paused => 0,
            SimSpeed::Normal => 1,
            SimSpeed::Fast => 2,
        }
    }
}
