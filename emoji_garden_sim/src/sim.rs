// Core simulation state and frame loop.
//
// `SimState` is the single source of truth for the garden. It owns the entity
// registry, the lifecycle manager (with its follow-up queue), the PRNG, the
// config, the simulation clock and the event feed. The sim is a pure
// function: `(state, actions, frame delta) -> (new_state, events)`.
//
// There are two entry points:
// - `update(dt_ms, actions)` is the per-frame call a rendering host makes.
//   It applies the frame's actions, then advances `speed.ticks_per_frame()`
//   ticks of `dt_ms` each (none while paused).
// - `step(commands, target_tick)` is the scripted driver used by the headless
//   runner and tests. It advances fixed `tick_duration_ms` ticks up to
//   `target_tick`, applying each command just before the tick it names, and
//   ignores the speed setting.
//
// One tick (`advance`) runs four passes in a fixed order:
// 1. Snapshot the bushes and trees (`WorldSnapshot`).
// 2. Tick every live entity in handle order against that snapshot,
//    collecting lifecycle requests.
// 3. Resolve collisions (`interaction.rs`).
// 4. Drain lifecycle requests and due follow-ups, compacting the registry
//    (`lifecycle.rs`).
//
// Entities spawned during a tick's drain first tick on the next tick.
//
// See also: `command.rs` for the input types, `view.rs` for pushing results
// to a renderer, `event.rs` for the narrative events and feed.
//
// **Critical constraint: determinism.** `SimState` is deterministic given the
// same seed, config, actions and frame deltas. No system time, no OS entropy,
// no unordered iteration.

use crate::command::{SimAction, SimCommand};
use crate::config::{ConfigError, GardenConfig};
use crate::entity::{TickContext, WorldSnapshot};
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::interaction;
use crate::lifecycle::{Garden, LifecycleManager};
use crate::prng::GardenRng;
use crate::registry::EntityRegistry;
use crate::types::*;
use crate::view::{GardenView, TokenView};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// The complete garden.
#[derive(Clone, Debug, Serialize)]
pub struct SimState {
    /// Ticks advanced so far.
    pub tick: u64,
    /// Simulation clock in milliseconds. Every deadline is on this clock.
    pub elapsed_ms: u64,
    pub rng: GardenRng,
    pub config: GardenConfig,
    pub speed: SimSpeed,
    pub registry: EntityRegistry,
    pub lifecycle: LifecycleManager,
    pub event_log: EventLog,
}

/// What happened during an `update` or `step` call.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    /// Narrative events, in the order they happened.
    pub events: Vec<SimEvent>,
    /// Entities removed from the garden.
    pub removed: Vec<EntityId>,
}

impl StepResult {
    fn absorb(&mut self, tick: u64, kinds: Vec<SimEventKind>) {
        self.events
            .extend(kinds.into_iter().map(|kind| SimEvent { tick, kind }));
    }
}

impl SimState {
    /// Create an empty garden with default config and the given seed.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GardenConfig::default())
    }

    /// Validate `config`, then create an empty garden with it.
    pub fn try_with_config(seed: u64, config: GardenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(seed, config))
    }

    /// Create an empty garden with the given seed and config.
    ///
    /// `config` must already be valid (`GardenConfig::from_json`, `load` and
    /// `validate` all check it); an invalid one can panic mid-tick. Use
    /// `try_with_config` for configs built in code.
    pub fn with_config(seed: u64, config: GardenConfig) -> Self {
        info!(seed, "garden created");
        Self {
            tick: 0,
            elapsed_ms: 0,
            rng: GardenRng::new(seed),
            event_log: EventLog::new(config.event_log_capacity),
            config,
            speed: SimSpeed::default(),
            registry: EntityRegistry::new(),
            lifecycle: LifecycleManager::new(),
        }
    }

    /// Per-frame entry point: apply `actions`, then advance as many ticks of
    /// `dt_ms` as the current speed asks for.
    pub fn update(&mut self, dt_ms: u64, actions: &[SimAction]) -> StepResult {
        let mut result = StepResult::default();
        for action in actions {
            self.apply_action(action, &mut result);
        }
        for _ in 0..self.speed.ticks_per_frame() {
            self.advance(dt_ms, &mut result);
        }
        result
    }

    /// Scripted entry point: advance fixed-length ticks until `target_tick`.
    ///
    /// A command for tick `t` is applied just before the tick that moves the
    /// clock from `t` to `t + 1`. Commands outside `[self.tick, target_tick)`
    /// are ignored, so a long script can be replayed window by window.
    /// Commands for the same tick apply in slice order.
    pub fn step(&mut self, commands: &[SimCommand], target_tick: u64) -> StepResult {
        let mut result = StepResult::default();
        let mut pending: Vec<&SimCommand> = commands
            .iter()
            .filter(|c| c.tick >= self.tick && c.tick < target_tick)
            .collect();
        pending.sort_by_key(|c| c.tick);
        let mut next = 0;
        let dt_ms = self.config.tick_duration_ms;

        while self.tick < target_tick {
            while let Some(command) = pending.get(next).filter(|c| c.tick <= self.tick) {
                self.apply_action(&command.action, &mut result);
                next += 1;
            }
            self.advance(dt_ms, &mut result);
        }
        result
    }

    fn apply_action(&mut self, action: &SimAction, result: &mut StepResult) {
        let mut kinds = Vec::new();
        match action {
            SimAction::Spawn { kind, position } => {
                let mut garden = Garden {
                    registry: &mut self.registry,
                    config: &self.config,
                    rng: &mut self.rng,
                    now_ms: self.elapsed_ms,
                    events: &mut kinds,
                };
                if let Err(reason) = self.lifecycle.spawn_requested(&mut garden, *kind, *position) {
                    debug!(%kind, %position, %reason, "drop refused");
                }
            }
            SimAction::ScatterWorms { count } => {
                let mut garden = Garden {
                    registry: &mut self.registry,
                    config: &self.config,
                    rng: &mut self.rng,
                    now_ms: self.elapsed_ms,
                    events: &mut kinds,
                };
                self.lifecycle.scatter_worms(&mut garden, *count);
            }
            SimAction::SetSimSpeed { speed } => {
                if self.speed != *speed {
                    info!(?speed, "simulation speed changed");
                    self.speed = *speed;
                    kinds.push(SimEventKind::SpeedChanged { speed: *speed });
                }
            }
        }
        self.record(kinds, result);
    }

    /// Advance one tick of `dt_ms`.
    fn advance(&mut self, dt_ms: u64, result: &mut StepResult) {
        self.tick += 1;
        self.elapsed_ms += dt_ms;

        let world = WorldSnapshot::capture(&self.registry);
        let ctx = TickContext {
            now_ms: self.elapsed_ms,
            config: &self.config,
            world: &world,
        };
        let mut requests = Vec::new();
        for entity in self.registry.iter_mut() {
            entity.tick(&ctx, &mut self.rng, &mut requests);
        }

        let mut kinds = Vec::new();
        interaction::resolve(
            &mut self.registry,
            &self.config,
            &mut self.rng,
            &mut requests,
            &mut kinds,
        );

        let mut garden = Garden {
            registry: &mut self.registry,
            config: &self.config,
            rng: &mut self.rng,
            now_ms: self.elapsed_ms,
            events: &mut kinds,
        };
        let removed = self.lifecycle.drain(&mut garden, requests);
        result.removed.extend(removed.iter().map(|e| e.id));
        trace!(
            tick = self.tick,
            entities = self.registry.len(),
            removed = removed.len(),
            "tick advanced"
        );
        self.record(kinds, result);
    }

    fn record(&mut self, kinds: Vec<SimEventKind>, result: &mut StepResult) {
        for kind in &kinds {
            self.event_log.push(kind.message());
        }
        result.absorb(self.tick, kinds);
    }

    /// Handles of the live entities of `kind`, in handle order.
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.registry
            .of_kind(kind)
            .into_iter()
            .filter(|id| self.registry.live(*id).is_some())
            .collect()
    }

    /// Live entity count per kind, every kind present.
    pub fn population(&self) -> BTreeMap<EntityKind, usize> {
        EntityKind::ALL
            .iter()
            .map(|kind| (*kind, self.registry.count(*kind)))
            .collect()
    }

    /// Push a step's changes to a renderer: removals, then every live token,
    /// then the step's event messages.
    pub fn sync_view(&self, result: &StepResult, view: &mut impl GardenView) {
        for id in &result.removed {
            view.remove_token(*id);
        }
        for entity in self.registry.iter().filter(|e| e.alive) {
            view.render_token(&TokenView::of(entity));
        }
        for event in &result.events {
            view.log_event(&event.kind.message());
        }
    }
}
