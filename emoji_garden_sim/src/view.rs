// Rendering collaborator interface.
//
// The garden does not draw anything. A platform layer (a DOM canvas, the
// headless terminal runner, a test recorder) implements `GardenView` and
// `SimState::sync_view` pushes each step's changes to it: every live token's
// current look, every removed token, and every new event-feed line.

use crate::entity::Entity;
use crate::types::{EntityId, EntityKind, Position};
use serde::Serialize;

/// How one token should currently be drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub emoji: &'static str,
    /// Draw position; includes a worm's wiggle offset.
    pub position: Position,
    pub state: &'static str,
}

impl TokenView {
    pub fn of(entity: &Entity) -> Self {
        let kind = entity.kind();
        Self {
            id: entity.id,
            kind,
            emoji: kind.emoji(),
            position: entity.display_position(),
            state: entity.state_label(),
        }
    }
}

pub trait GardenView {
    /// Create or move the token for `token.id`.
    fn render_token(&mut self, token: &TokenView);
    /// The entity is gone; drop its token.
    fn remove_token(&mut self, id: EntityId);
    /// Append a line to the event feed.
    fn log_event(&mut self, message: &str);
}
