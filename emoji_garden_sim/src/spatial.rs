// Axis-aligned bounding boxes for token collisions.
//
// Every token occupies a square of side `GardenConfig::token_size` anchored at
// its position (top-left corner). Two tokens collide when their boxes
// overlap; touching edges count as overlap. This is the only collision test in
// the garden. Distance thresholds elsewhere (a bird arriving at its perch, a
// butterfly spotting a bush) are navigation checks, not collisions.

use crate::types::Position;

/// An axis-aligned box, closed on all sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    /// The box covered by a token of side `size` anchored at `position`.
    pub fn token(position: Position, size: f32) -> Self {
        Self {
            min_x: position.x,
            min_y: position.y,
            max_x: position.x + size,
            max_y: position.y + size,
        }
    }

    /// Standard AABB test: the boxes overlap unless one lies entirely to one
    /// side of the other on either axis.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }
}

/// Whether two equally sized tokens overlap.
pub fn tokens_overlap(a: Position, b: Position, size: f32) -> bool {
    Aabb::token(a, size).overlaps(&Aabb::token(b, size))
}
