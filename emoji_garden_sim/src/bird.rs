// Bird behavior: a hunger-driven locomotion cycle.
//
// A bird cycles Flying → Perching → Descending → Walking → Ascending →
// Flying. Locomotion states advance on their own (arrival at the perch,
// reaching the ground, reaching the canopy), but hunger overrides them every
// tick: a hungry bird (hunger < `descend_below_hunger`) that is not already
// on the ground drops to forage, and a fed bird (hunger >
// `ascend_above_hunger`) walking on the ground takes off again.
//
// Eating is not scheduled. The collision pass (`interaction.rs`) calls
// `Bird::eat` when a walking bird overlaps a worm or a flying bird overlaps a
// butterfly; the bird shows `Eating` for the rest of that tick and resumes its
// previous state on its next tick. Food eaten accumulates in `food_consumed`;
// crossing `nest_food_threshold` resets it and asks for a nest on the home
// tree.
//
// The home tree is a weak handle. If the tree is gone the bird free-roams:
// random diffusion instead of homing, and the configured default canopy
// height instead of the tree's perch when ascending.

use crate::config::{GardenConfig, METER_MAX};
use crate::entity::TickContext;
use crate::prng::GardenRng;
use crate::types::{EntityId, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BirdState {
    Flying,
    Perching,
    Descending,
    Walking,
    Ascending,
    Eating,
}

/// What a bird can eat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prey {
    Worm,
    Butterfly,
}

impl Prey {
    pub fn name(self) -> &'static str {
        match self {
            Prey::Worm => "worm",
            Prey::Butterfly => "butterfly",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bird {
    /// Satiation in [0, 100]; 100 is full.
    pub hunger: f32,
    /// Food eaten since the last nest request.
    pub food_consumed: f32,
    pub state: BirdState,
    pub home_tree: Option<EntityId>,
    /// The state to go back to after an `Eating` tick.
    pub resume_state: Option<BirdState>,
}

impl Bird {
    pub fn new(home_tree: Option<EntityId>) -> Self {
        Self {
            hunger: METER_MAX,
            food_consumed: 0.0,
            state: BirdState::Flying,
            home_tree,
            resume_state: None,
        }
    }

    fn set_state(&mut self, id: EntityId, next: BirdState) {
        if self.state != next {
            debug!(bird = %id, from = ?self.state, to = ?next, "bird state transition");
            self.state = next;
        }
    }

    /// The perch point on the home tree, if the tree is still standing.
    fn perch_point(&self, ctx: &TickContext<'_>) -> Option<Position> {
        let config = ctx.config;
        self.home_tree
            .and_then(|tree| ctx.world.tree_position(tree))
            .map(|tree| {
                tree.offset(0.0, config.bird.perch_offset_y)
                    .clamped(config.max_x(), config.max_y())
            })
    }

    /// Advance one tick.
    pub fn tick(
        &mut self,
        id: EntityId,
        position: &mut Position,
        ctx: &TickContext<'_>,
        rng: &mut GardenRng,
    ) {
        let params = &ctx.config.bird;

        if self.state == BirdState::Eating {
            let resume = self.resume_state.take().unwrap_or(BirdState::Flying);
            self.set_state(id, resume);
        }

        if let Some(tree) = self.home_tree {
            if ctx.world.tree_position(tree).is_none() {
                debug!(bird = %id, tree = %tree, "home tree gone, free-roaming");
                self.home_tree = None;
            }
        }

        self.hunger = (self.hunger - params.hunger_decay_per_tick).clamp(0.0, METER_MAX);

        if self.hunger < params.descend_below_hunger
            && !matches!(self.state, BirdState::Walking | BirdState::Descending)
        {
            self.set_state(id, BirdState::Descending);
        } else if self.hunger > params.ascend_above_hunger && self.state == BirdState::Walking {
            self.set_state(id, BirdState::Ascending);
        }

        match self.state {
            BirdState::Flying => self.fly(id, position, ctx, rng),
            BirdState::Perching => self.perch(id, position, ctx, rng),
            BirdState::Descending => self.descend(id, position, ctx.config),
            BirdState::Walking => walk(position, ctx.config, rng),
            BirdState::Ascending => self.ascend(id, position, ctx),
            BirdState::Eating => {}
        }
        trace!(bird = %id, state = ?self.state, hunger = self.hunger, %position, "bird ticked");
    }

    fn fly(
        &mut self,
        id: EntityId,
        position: &mut Position,
        ctx: &TickContext<'_>,
        rng: &mut GardenRng,
    ) {
        let params = &ctx.config.bird;
        match self.perch_point(ctx) {
            Some(perch) => {
                if position.distance(perch) <= params.perch_arrival_distance {
                    *position = perch;
                    self.set_state(id, BirdState::Perching);
                } else {
                    *position = position.step_toward(perch, params.flight_speed);
                }
            }
            None => {
                let heading = rng.angle();
                let (low, high) = params.diffusion_step;
                let step = rng.range_f32(low, high);
                *position = position
                    .offset(step * heading.cos(), step * heading.sin())
                    .clamped(ctx.config.max_x(), ctx.config.max_y());
            }
        }
    }

    fn perch(
        &mut self,
        id: EntityId,
        position: &mut Position,
        ctx: &TickContext<'_>,
        rng: &mut GardenRng,
    ) {
        let params = &ctx.config.bird;
        let Some(perch) = self.perch_point(ctx) else {
            self.set_state(id, BirdState::Flying);
            return;
        };
        if rng.chance(params.resume_flying_chance) {
            self.set_state(id, BirdState::Flying);
            return;
        }
        *position = perch
            .offset(
                rng.jitter(params.perch_jitter),
                rng.jitter(params.perch_jitter),
            )
            .clamped(ctx.config.max_x(), ctx.config.max_y());
    }

    fn descend(&mut self, id: EntityId, position: &mut Position, config: &GardenConfig) {
        position.y += config.bird.vertical_speed;
        if position.y >= config.ground_y {
            position.y = config.ground_y;
            self.set_state(id, BirdState::Walking);
        }
    }

    fn ascend(&mut self, id: EntityId, position: &mut Position, ctx: &TickContext<'_>) {
        let canopy_y = self
            .perch_point(ctx)
            .map_or(ctx.config.bird.default_canopy_y, |perch| perch.y);
        position.y -= ctx.config.bird.vertical_speed;
        if position.y <= canopy_y {
            position.y = canopy_y;
            self.set_state(id, BirdState::Flying);
        }
    }

    /// Feed the bird. Returns `true` when this meal crossed the nest
    /// threshold (and `food_consumed` was reset).
    pub fn eat(&mut self, prey: Prey, config: &GardenConfig) -> bool {
        let params = &config.bird;
        let amount = match prey {
            Prey::Worm => params.worm_nutrition,
            Prey::Butterfly => params.butterfly_nutrition,
        };
        if self.state != BirdState::Eating {
            self.resume_state = Some(self.state);
            self.state = BirdState::Eating;
        }
        self.hunger = (self.hunger + amount).clamp(0.0, METER_MAX);
        self.food_consumed += amount;
        if self.food_consumed >= params.nest_food_threshold {
            self.food_consumed = 0.0;
            true
        } else {
            false
        }
    }
}

/// Random walk along the ground line.
fn walk(position: &mut Position, config: &GardenConfig, rng: &mut GardenRng) {
    let (low, high) = config.bird.walk_step;
    let step = rng.range_f32(low, high);
    let direction = if rng.chance(0.5) { 1.0 } else { -1.0 };
    position.x = (position.x + direction * step).clamp(0.0, config.max_x());
    position.y = config.ground_y;
}
