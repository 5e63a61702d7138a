// Flowering bush: a stationary butterfly source that needs pollination.
//
// Every tick the pollination meter decays; a bush whose meter reaches zero
// withers and requests its own removal. Outside its cooldown the bush rolls
// `spawn_chance` for a new butterfly homed on it; a successful roll starts a
// cooldown of `cooldown_ms`. The cooldown is a deadline on the bush itself,
// so a withered bush takes its pending cooldown with it.
//
// Butterflies raise the meter through `Bush::pollinate` (called by the
// collision pass). `butterflies` tracks the live butterflies homed here; the
// drain keeps it current as butterflies are born and die.

use crate::config::METER_MAX;
use crate::entity::TickContext;
use crate::lifecycle::{DespawnCause, LifecycleRequest};
use crate::prng::GardenRng;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bush {
    /// Pollination in [0, 100]; the bush withers at 0.
    pub pollination_meter: f32,
    /// Simulation time (ms) until which the bush cannot spawn.
    pub cooldown_until_ms: Option<u64>,
    /// Live butterflies whose home is this bush.
    pub butterflies: SmallVec<[EntityId; 4]>,
}

impl Default for Bush {
    fn default() -> Self {
        Self::new()
    }
}

impl Bush {
    pub fn new() -> Self {
        Self {
            pollination_meter: METER_MAX,
            cooldown_until_ms: None,
            butterflies: SmallVec::new(),
        }
    }

    pub fn in_cooldown(&self, now_ms: u64) -> bool {
        self.cooldown_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Raise the meter, capped at the maximum.
    pub fn pollinate(&mut self, amount: f32) {
        self.pollination_meter = (self.pollination_meter + amount).min(METER_MAX);
    }

    /// Advance one tick. Returns `false` when the bush withered.
    pub fn tick(
        &mut self,
        id: EntityId,
        ctx: &TickContext<'_>,
        rng: &mut GardenRng,
        requests: &mut Vec<LifecycleRequest>,
    ) -> bool {
        let params = &ctx.config.bush;

        self.pollination_meter =
            (self.pollination_meter - params.meter_decay_per_tick).clamp(0.0, METER_MAX);
        if self.pollination_meter <= 0.0 {
            debug!(bush = %id, "bush withered");
            requests.push(LifecycleRequest::Despawn {
                id,
                cause: DespawnCause::Withered,
            });
            return false;
        }

        if self.cooldown_until_ms.is_some() && !self.in_cooldown(ctx.now_ms) {
            self.cooldown_until_ms = None;
        }

        if self.cooldown_until_ms.is_none() && rng.chance(params.spawn_chance) {
            let (low, high) = params.cooldown_ms;
            let cooldown = rng.range_u64_inclusive(low, high);
            self.cooldown_until_ms = Some(ctx.now_ms.saturating_add(cooldown));
            debug!(bush = %id, cooldown_ms = cooldown, "bush spawns a butterfly");
            requests.push(LifecycleRequest::SpawnButterfly { home_bush: id });
        }
        true
    }
}
