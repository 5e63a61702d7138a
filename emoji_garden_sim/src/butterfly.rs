// Butterfly behavior: flit between bushes, carry pollen, starve.
//
// A butterfly is either Flying or Resting. A flying butterfly keeps a flight
// target until it reaches it. New targets favor the home bush
// (`home_bias`); otherwise the butterfly heads for another bush it can see
// (within `detection_radius`) or, failing that, a random point on the play
// area. Directed movement is overlaid with per-axis flutter noise. On
// arrival the target is dropped and the butterfly may settle to rest.
//
// Pollination happens on contact, not on arrival: the collision pass
// (`interaction.rs`) calls `Butterfly::visit` for every bush whose token the
// butterfly overlaps. Delivering pollen picked up at a *different* bush may
// pollinate the visited one; every visit then loads fresh pollen from the
// visited bush and feeds the butterfly.
//
// Hunger decays every tick, resting or not. At zero the butterfly dies and
// requests its own removal.

use crate::config::{ButterflyParams, GardenConfig, METER_MAX};
use crate::entity::TickContext;
use crate::lifecycle::{DespawnCause, LifecycleRequest};
use crate::prng::GardenRng;
use crate::types::{EntityId, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButterflyState {
    Flying,
    Resting,
}

/// Where a flying butterfly is headed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FlightTarget {
    /// A bush, aimed at a point on its token.
    Bush { bush: EntityId, aim: Position },
    /// An arbitrary point on the play area.
    Point(Position),
}

impl FlightTarget {
    pub fn point(&self) -> Position {
        match self {
            FlightTarget::Bush { aim, .. } => *aim,
            FlightTarget::Point(point) => *point,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Butterfly {
    /// Satiation in [0, 100]; the butterfly dies at 0.
    pub hunger: f32,
    pub state: ButterflyState,
    pub carries_pollen: bool,
    pub pollen_source: Option<EntityId>,
    pub home_bush: Option<EntityId>,
    pub target: Option<FlightTarget>,
}

impl Butterfly {
    pub fn new(home_bush: Option<EntityId>) -> Self {
        Self {
            hunger: METER_MAX,
            state: ButterflyState::Flying,
            carries_pollen: false,
            pollen_source: None,
            home_bush,
            target: None,
        }
    }

    /// Advance one tick. Returns `false` when the butterfly starved.
    pub fn tick(
        &mut self,
        id: EntityId,
        position: &mut Position,
        ctx: &TickContext<'_>,
        rng: &mut GardenRng,
        requests: &mut Vec<LifecycleRequest>,
    ) -> bool {
        let params = &ctx.config.butterfly;

        self.hunger = (self.hunger - params.hunger_decay_per_tick).clamp(0.0, METER_MAX);
        if self.hunger <= 0.0 {
            debug!(butterfly = %id, "butterfly starved");
            requests.push(LifecycleRequest::Despawn {
                id,
                cause: DespawnCause::Starved,
            });
            return false;
        }

        if self.state == ButterflyState::Resting {
            if !rng.chance(params.wake_chance) {
                return true;
            }
            debug!(butterfly = %id, "butterfly takes off");
            self.state = ButterflyState::Flying;
        }

        self.fly(id, position, ctx, rng);
        trace!(butterfly = %id, state = ?self.state, hunger = self.hunger, %position, "butterfly ticked");
        true
    }

    fn fly(
        &mut self,
        id: EntityId,
        position: &mut Position,
        ctx: &TickContext<'_>,
        rng: &mut GardenRng,
    ) {
        let params = &ctx.config.butterfly;

        // A bush target whose bush withered is forgotten.
        if let Some(FlightTarget::Bush { bush, .. }) = self.target {
            if ctx.world.bush_position(bush).is_none() {
                self.target = None;
            }
        }
        let target = match self.target {
            Some(target) => target,
            None => {
                let target = self.choose_target(*position, ctx, rng);
                self.target = Some(target);
                target
            }
        };

        let goal = target.point();
        if position.distance(goal) < params.arrival_distance {
            self.target = None;
            if rng.chance(params.rest_chance) {
                debug!(butterfly = %id, "butterfly settles to rest");
                self.state = ButterflyState::Resting;
                *position = goal;
                return;
            }
        } else {
            *position = position.step_toward(goal, params.speed);
        }

        *position = position
            .offset(rng.jitter(params.flutter), rng.jitter(params.flutter))
            .clamped(ctx.config.max_x(), ctx.config.max_y());
    }

    fn choose_target(
        &self,
        position: Position,
        ctx: &TickContext<'_>,
        rng: &mut GardenRng,
    ) -> FlightTarget {
        let params = &ctx.config.butterfly;
        let home = self
            .home_bush
            .and_then(|bush| ctx.world.bush_position(bush).map(|at| (bush, at)));

        if let Some((bush, at)) = home {
            if rng.chance(params.home_bias) {
                return aim_at_bush(bush, at, ctx.config, rng);
            }
        }

        let nearby = ctx.world.bushes().find(|(bush, at)| {
            Some(*bush) != self.home_bush && position.distance(*at) < params.detection_radius
        });
        if let Some((bush, at)) = nearby {
            return aim_at_bush(bush, at, ctx.config, rng);
        }

        FlightTarget::Point(Position::new(
            rng.range_f32(0.0, ctx.config.max_x()),
            rng.range_f32(0.0, ctx.config.max_y()),
        ))
    }

    /// Visit a bush the butterfly is touching. Returns the pollination to
    /// apply to that bush, if this visit pollinated it.
    pub fn visit(&mut self, bush: EntityId, params: &ButterflyParams, rng: &mut GardenRng) -> Option<f32> {
        let mut pollination = None;
        if self.carries_pollen && self.pollen_source != Some(bush) {
            if rng.chance(params.pollination_chance) {
                pollination = Some(params.pollination_amount);
            }
            self.carries_pollen = false;
            self.pollen_source = None;
        }
        self.carries_pollen = true;
        self.pollen_source = Some(bush);
        self.hunger = (self.hunger + params.visit_nutrition).clamp(0.0, METER_MAX);
        pollination
    }
}

fn aim_at_bush(bush: EntityId, at: Position, config: &GardenConfig, rng: &mut GardenRng) -> FlightTarget {
    let spread = config.butterfly.bush_aim_spread;
    let aim = at
        .offset(rng.jitter(spread), rng.jitter(spread))
        .clamped(config.max_x(), config.max_y());
    FlightTarget::Bush { bush, aim }
}

/// A spawn point `spawn_radius` away from `center`, inside the play area.
pub fn spawn_point_around(center: Position, config: &GardenConfig, rng: &mut GardenRng) -> Position {
    let (low, high) = config.butterfly.spawn_radius;
    let heading = rng.angle();
    let radius = rng.range_f32(low, high);
    center
        .offset(radius * heading.cos(), radius * heading.sin())
        .clamped(config.max_x(), config.max_y())
}
