// Lifecycle: every way an entity enters or leaves the garden.
//
// Entities never create or destroy each other directly. During a frame they
// push `LifecycleRequest`s (a starved butterfly, a bush rolling a new
// butterfly, a bird that has eaten enough for a nest, a nest whose hatch
// deadline passed); `LifecycleManager::drain` applies them once every entity
// has ticked and the collision pass has run.
//
// The manager also owns the user-facing spawn path (`spawn_requested`) with
// its preconditions (no user-placed nests, trees locked until the first
// bush) and the delayed follow-ups a drop schedules: butterflies arriving at a
// new bush, a bird moving into a new tree. Follow-ups live in an `EventQueue`
// and name their source; a follow-up whose source is gone by the time it is
// due is dropped.
//
// Drain order within a frame:
// 1. Fire due follow-ups.
// 2. Apply requests in push order (tick order, then collision order).
//    Despawns are deduplicated; a request naming an entity that died earlier
//    in the frame is skipped.
// 3. Compact the registry and clear back-references to removed entities
//    (a bush's butterfly list, a tree's nest link).
//
// See also: `event.rs` for the queue and narrative events, `interaction.rs`
// for the collision pass that produces `Eaten` despawns and nest requests.

use crate::bird::Bird;
use crate::bush::Bush;
use crate::butterfly::{Butterfly, spawn_point_around};
use crate::config::GardenConfig;
use crate::entity::{Entity, EntityBody};
use crate::event::{EventQueue, ScheduledEventKind, SimEventKind};
use crate::prng::GardenRng;
use crate::registry::EntityRegistry;
use crate::tree::{Nest, Tree};
use crate::types::{EntityId, EntityKind, Position};
use crate::worm::{self, Worm};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

/// A structural change requested during a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LifecycleRequest {
    Despawn { id: EntityId, cause: DespawnCause },
    /// A bush rolled a new butterfly.
    SpawnButterfly { home_bush: EntityId },
    /// A bird homed on `tree` has eaten enough to nest.
    CreateNest { tree: EntityId, requested_by: EntityId },
    /// A nest's hatch deadline passed.
    HatchNest { nest: EntityId, tree: EntityId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DespawnCause {
    Starved,
    Withered,
    Eaten { by: EntityId },
}

/// Why a user drop was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SpawnRejected {
    #[error("nests are built by birds and cannot be placed")]
    NestNotPlaceable,
    #[error("trees are locked until a flowering bush has been planted")]
    TreeLocked,
}

/// Mutable garden state a lifecycle pass works on.
pub struct Garden<'a> {
    pub registry: &'a mut EntityRegistry,
    pub config: &'a GardenConfig,
    pub rng: &'a mut GardenRng,
    pub now_ms: u64,
    pub events: &'a mut Vec<SimEventKind>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LifecycleManager {
    queue: EventQueue,
    tree_unlocked: bool,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the tree token can be placed yet.
    pub fn tree_unlocked(&self) -> bool {
        self.tree_unlocked
    }

    /// Follow-ups still waiting for their deadline.
    pub fn pending_follow_ups(&self) -> usize {
        self.queue.len()
    }

    /// Place a token the user dropped at `position`.
    pub fn spawn_requested(
        &mut self,
        garden: &mut Garden<'_>,
        kind: EntityKind,
        position: Position,
    ) -> Result<EntityId, SpawnRejected> {
        match kind {
            EntityKind::Nest => return Err(SpawnRejected::NestNotPlaceable),
            EntityKind::Tree if !self.tree_unlocked => return Err(SpawnRejected::TreeLocked),
            _ => {}
        }
        let config = garden.config;
        let position = position.clamped(config.max_x(), config.max_y());

        let body = match kind {
            EntityKind::Bush => EntityBody::Bush(Bush::new()),
            EntityKind::Tree => EntityBody::Tree(Tree::new()),
            EntityKind::Butterfly => {
                EntityBody::Butterfly(Butterfly::new(nearest(garden.registry, EntityKind::Bush, position)))
            }
            EntityKind::Bird => {
                EntityBody::Bird(Bird::new(nearest(garden.registry, EntityKind::Tree, position)))
            }
            EntityKind::Worm => {
                EntityBody::Worm(Worm::new(garden.now_ms, &config.worm, garden.rng))
            }
            EntityKind::Nest => return Err(SpawnRejected::NestNotPlaceable),
        };
        let position = match kind {
            EntityKind::Worm => worm::ground_position(position, config),
            _ => position,
        };
        let id = garden.registry.insert(position, body);
        info!(id = %id, %kind, %position, "token dropped");
        garden.events.push(SimEventKind::EntityAdded { id, kind });

        match kind {
            EntityKind::Bush => {
                if !self.tree_unlocked {
                    self.tree_unlocked = true;
                    info!("tree token unlocked");
                    garden.events.push(SimEventKind::TreeUnlocked);
                }
                let due = garden.now_ms.saturating_add(follow_up_delay(config, garden.rng));
                self.queue.schedule(due, ScheduledEventKind::ButterfliesArrive { bush: id });
            }
            EntityKind::Tree => {
                let due = garden.now_ms.saturating_add(follow_up_delay(config, garden.rng));
                self.queue.schedule(due, ScheduledEventKind::BirdArrives { tree: id });
            }
            EntityKind::Butterfly => {
                if let Some(entity) = garden.registry.get(id) {
                    let home = entity.as_butterfly().and_then(|b| b.home_bush);
                    if let Some(home) = home {
                        adopt_butterfly(garden.registry, home, id);
                    }
                }
            }
            _ => {}
        }
        Ok(id)
    }

    /// Drop `count` worms at uniformly random columns on the ground band.
    pub fn scatter_worms(&mut self, garden: &mut Garden<'_>, count: u32) -> Vec<EntityId> {
        let mut worms = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let position = worm::scatter_position(garden.config, garden.rng);
            let body = Worm::new(garden.now_ms, &garden.config.worm, garden.rng);
            let worm = garden.registry.insert(position, EntityBody::Worm(body));
            garden.events.push(SimEventKind::WormAppeared { worm });
            worms.push(worm);
        }
        debug!(count, "worms scattered");
        worms
    }

    /// Apply this frame's follow-ups and requests, then remove the dead.
    /// Returns the removed entities in handle order.
    pub fn drain(
        &mut self,
        garden: &mut Garden<'_>,
        requests: Vec<LifecycleRequest>,
    ) -> Vec<Entity> {
        self.fire_follow_ups(garden);

        let mut despawned: FxHashSet<EntityId> = FxHashSet::default();
        for request in requests {
            match request {
                LifecycleRequest::Despawn { id, cause } => {
                    if !despawned.insert(id) {
                        trace!(id = %id, "duplicate despawn skipped");
                        continue;
                    }
                    despawn(garden, id, cause);
                }
                LifecycleRequest::SpawnButterfly { home_bush } => {
                    spawn_bush_butterfly(garden, home_bush);
                }
                LifecycleRequest::CreateNest { tree, requested_by } => {
                    create_nest(garden, tree, requested_by);
                }
                LifecycleRequest::HatchNest { nest, tree } => {
                    hatch_nest(garden, nest, tree);
                }
            }
        }

        let removed = garden.registry.compact();
        for entity in &removed {
            clear_back_references(garden.registry, entity);
        }
        removed
    }

    fn fire_follow_ups(&mut self, garden: &mut Garden<'_>) {
        while let Some(event) = self.queue.pop_if_ready(garden.now_ms) {
            let source = event.kind.source();
            let Some(at) = garden.registry.live(source).map(|e| e.position) else {
                debug!(source = %source, "follow-up cancelled, source gone");
                continue;
            };
            match event.kind {
                ScheduledEventKind::ButterfliesArrive { bush } => {
                    let (low, high) = garden.config.lifecycle.drop_butterflies;
                    let count = garden.rng.range_u64_inclusive(low, high);
                    let mut butterflies = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        let position = spawn_point_around(at, garden.config, garden.rng);
                        let id = garden
                            .registry
                            .insert(position, EntityBody::Butterfly(Butterfly::new(Some(bush))));
                        adopt_butterfly(garden.registry, bush, id);
                        butterflies.push(id);
                    }
                    debug!(bush = %bush, count, "butterflies arrived");
                    if !butterflies.is_empty() {
                        garden
                            .events
                            .push(SimEventKind::ButterfliesAppeared { bush, butterflies });
                    }
                }
                ScheduledEventKind::BirdArrives { tree } => {
                    let position = at.offset(0.0, garden.config.bird.perch_offset_y).clamped(
                        garden.config.max_x(),
                        garden.config.max_y(),
                    );
                    let bird = garden
                        .registry
                        .insert(position, EntityBody::Bird(Bird::new(Some(tree))));
                    debug!(tree = %tree, bird = %bird, "bird arrived");
                    garden.events.push(SimEventKind::BirdArrived { tree, bird });
                }
            }
        }
    }
}

/// The live entity of `kind` closest to `position`; ties go to the lower
/// handle.
fn nearest(registry: &EntityRegistry, kind: EntityKind, position: Position) -> Option<EntityId> {
    let mut best: Option<(EntityId, f32)> = None;
    for id in registry.of_kind(kind) {
        let Some(entity) = registry.live(id) else {
            continue;
        };
        let distance = entity.position.distance(position);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((id, distance));
        }
    }
    best.map(|(id, _)| id)
}

fn follow_up_delay(config: &GardenConfig, rng: &mut GardenRng) -> u64 {
    let (low, high) = config.lifecycle.follow_up_delay_ms;
    rng.range_u64_inclusive(low, high)
}

fn adopt_butterfly(registry: &mut EntityRegistry, bush: EntityId, butterfly: EntityId) {
    if let Some(bush) = registry.get_mut(bush).and_then(Entity::as_bush_mut) {
        bush.butterflies.push(butterfly);
    }
}

fn despawn(garden: &mut Garden<'_>, id: EntityId, cause: DespawnCause) {
    let Some(entity) = garden.registry.get_mut(id) else {
        trace!(id = %id, "despawn of unknown entity skipped");
        return;
    };
    // Eaten prey and starved or withered entities already cleared `alive`
    // when the request was pushed; the drain just records the removal.
    entity.alive = false;
    let kind = entity.kind();
    debug!(id = %id, %kind, ?cause, "entity removed");
    match (kind, cause) {
        (EntityKind::Butterfly, DespawnCause::Starved) => {
            garden.events.push(SimEventKind::ButterflyDied { butterfly: id });
        }
        (EntityKind::Bush, DespawnCause::Withered) => {
            garden.events.push(SimEventKind::BushWithered { bush: id });
        }
        _ => {}
    }
}

fn spawn_bush_butterfly(garden: &mut Garden<'_>, home_bush: EntityId) {
    let Some(at) = garden.registry.live(home_bush).map(|e| e.position) else {
        trace!(bush = %home_bush, "butterfly spawn from a removed bush skipped");
        return;
    };
    let position = spawn_point_around(at, garden.config, garden.rng);
    let butterfly = garden
        .registry
        .insert(position, EntityBody::Butterfly(Butterfly::new(Some(home_bush))));
    adopt_butterfly(garden.registry, home_bush, butterfly);
    garden.events.push(SimEventKind::ButterflyBorn {
        bush: home_bush,
        butterfly,
    });
}

fn create_nest(garden: &mut Garden<'_>, tree: EntityId, requested_by: EntityId) {
    if garden.registry.live(requested_by).is_none() {
        trace!(bird = %requested_by, "nest request from a removed bird skipped");
        return;
    }
    let Some(tree_entity) = garden.registry.live(tree) else {
        debug!(tree = %tree, "nest request for a removed tree skipped");
        return;
    };
    let Some(tree_state) = tree_entity.as_tree() else {
        return;
    };
    if tree_state.has_nest() {
        debug!(tree = %tree, "tree already has a nest");
        return;
    }
    let position = tree_entity
        .position
        .offset(0.0, garden.config.nest.offset_y)
        .clamped(garden.config.max_x(), garden.config.max_y());

    let body = Nest::new(tree, garden.now_ms, &garden.config.nest, garden.rng);
    let deadline = body.hatch_deadline_ms;
    let nest = garden.registry.insert(position, EntityBody::Nest(body));
    if let Some(tree_state) = garden.registry.get_mut(tree).and_then(Entity::as_tree_mut) {
        tree_state.attach_nest(nest);
    }
    info!(tree = %tree, nest = %nest, hatch_at_ms = deadline, "nest created");
    garden.events.push(SimEventKind::NestCreated { tree, nest });
}

fn hatch_nest(garden: &mut Garden<'_>, nest: EntityId, tree: EntityId) {
    let Some(entity) = garden.registry.get_mut(nest) else {
        return;
    };
    if !entity.alive {
        return;
    }
    entity.alive = false;
    let nest_position = entity.position;

    // Hatchlings gather around the tree; a nest whose tree is gone hatches
    // where it sits and the brood free-roams.
    let (center, home) = match garden.registry.live(tree) {
        Some(tree_entity) => (tree_entity.position, Some(tree)),
        None => (nest_position, None),
    };
    if let Some(tree_state) = garden.registry.get_mut(tree).and_then(Entity::as_tree_mut) {
        if tree_state.nest == Some(nest) {
            tree_state.nest = None;
        }
    }

    let params = &garden.config.nest;
    let count = garden
        .rng
        .range_u64_inclusive(params.hatchlings.0, params.hatchlings.1);
    let mut hatchlings = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let position = center
            .offset(
                garden.rng.jitter(params.hatch_spread),
                garden.rng.jitter(params.hatch_spread),
            )
            .clamped(garden.config.max_x(), garden.config.max_y());
        hatchlings.push(
            garden
                .registry
                .insert(position, EntityBody::Bird(Bird::new(home))),
        );
    }
    info!(nest = %nest, tree = %tree, count, "nest hatched");
    garden
        .events
        .push(SimEventKind::NestHatched { tree, hatchlings });
}

/// Forget handles to an entity that just left the registry.
fn clear_back_references(registry: &mut EntityRegistry, removed: &Entity) {
    match &removed.body {
        EntityBody::Butterfly(butterfly) => {
            if let Some(home) = butterfly.home_bush {
                if let Some(bush) = registry.get_mut(home).and_then(Entity::as_bush_mut) {
                    bush.butterflies.retain(|b| *b != removed.id);
                }
            }
        }
        EntityBody::Nest(nest) => {
            if let Some(tree) = registry.get_mut(nest.tree).and_then(Entity::as_tree_mut) {
                if tree.nest == Some(removed.id) {
                    tree.nest = None;
                }
            }
        }
        EntityBody::Tree(tree) => {
            // A nest cannot outlive its tree.
            if let Some(nest) = tree.nest {
                if let Some(entity) = registry.get_mut(nest) {
                    entity.alive = false;
                }
            }
        }
        _ => {}
    }
}
