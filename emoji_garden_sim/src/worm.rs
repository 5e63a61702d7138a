// Worm: stationary prey with a wiggle animation.
//
// Worms never move; they sit where they were dropped until a walking bird
// eats them. Walking birds keep to the ground line, so worms live on the
// ground band: user drops snap onto the ground line and scattered worms land
// within half a token of it (`ground_position`, `scatter_position`). They
// alternate between `Still` and short `Wiggling` spells on a
// per-worm deadline. The wiggle is a horizontal draw offset only, so it never
// affects collisions.

use crate::config::{GardenConfig, WormParams};
use crate::entity::TickContext;
use crate::prng::GardenRng;
use crate::types::{EntityId, Position};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WormState {
    Still,
    Wiggling,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Worm {
    pub state: WormState,
    /// Horizontal draw offset of the current wiggle.
    pub wiggle_offset: f32,
    /// When the worm next toggles between still and wiggling.
    pub next_change_ms: u64,
}

impl Worm {
    pub fn new(now_ms: u64, params: &WormParams, rng: &mut GardenRng) -> Self {
        let (low, high) = params.first_wiggle_ms;
        Self {
            state: WormState::Still,
            wiggle_offset: 0.0,
            next_change_ms: now_ms.saturating_add(rng.range_u64_inclusive(low, high)),
        }
    }

    pub fn tick(&mut self, id: EntityId, ctx: &TickContext<'_>, rng: &mut GardenRng) {
        if ctx.now_ms < self.next_change_ms {
            return;
        }
        let params = &ctx.config.worm;
        match self.state {
            WormState::Still => {
                self.state = WormState::Wiggling;
                self.wiggle_offset = rng.jitter(params.wiggle_amplitude);
                self.next_change_ms = ctx.now_ms.saturating_add(params.wiggle_duration_ms);
            }
            WormState::Wiggling => {
                let (low, high) = params.wiggle_interval_ms;
                self.state = WormState::Still;
                self.wiggle_offset = 0.0;
                self.next_change_ms = ctx.now_ms.saturating_add(rng.range_u64_inclusive(low, high));
            }
        }
        trace!(worm = %id, state = ?self.state, "worm toggled");
    }
}

/// Where a worm dropped at `at` lands: same column, on the ground line.
pub fn ground_position(at: Position, config: &GardenConfig) -> Position {
    Position::new(at.x, config.ground_y).clamped(config.max_x(), config.max_y())
}

/// A uniformly random column on the ground band.
pub fn scatter_position(config: &GardenConfig, rng: &mut GardenRng) -> Position {
    let x = rng.range_f32(0.0, config.max_x());
    let y = config.ground_y + rng.jitter(config.token_size / 2.0);
    Position::new(x, y).clamped(config.max_x(), config.max_y())
}
