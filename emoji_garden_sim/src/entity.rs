// Entities: the tagged union of every simulated token, and the read-only
// context each one sees while it ticks.
//
// `Entity` holds the fields every token shares (handle, position, liveness)
// and an `EntityBody` carrying the kind-specific state. The per-kind modules
// own the behavior; `Entity::tick` only dispatches.
//
// Entities tick one after another against a `WorldSnapshot` captured at the
// start of the frame, so an entity's view of bushes and trees never depends
// on how far through the registry the tick loop has got. Entities do not
// mutate each other during ticks. Everything that crosses entity boundaries
// (starvation, withering, new butterflies, hatching) is pushed as a
// `LifecycleRequest` and applied afterwards by `lifecycle.rs`.

use crate::bird::Bird;
use crate::bush::Bush;
use crate::butterfly::Butterfly;
use crate::config::GardenConfig;
use crate::lifecycle::LifecycleRequest;
use crate::prng::GardenRng;
use crate::registry::EntityRegistry;
use crate::tree::{Nest, Tree};
use crate::types::{EntityId, EntityKind, Position};
use crate::worm::Worm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One simulated token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Position,
    /// Cleared the moment the entity dies or is eaten. Dead entities stay in
    /// the registry until the end-of-frame drain removes them, but every
    /// later pass in the same frame skips them.
    pub alive: bool,
    pub body: EntityBody,
}

/// Kind-specific state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EntityBody {
    Bird(Bird),
    Butterfly(Butterfly),
    Bush(Bush),
    Tree(Tree),
    Nest(Nest),
    Worm(Worm),
}

impl EntityBody {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityBody::Bird(_) => EntityKind::Bird,
            EntityBody::Butterfly(_) => EntityKind::Butterfly,
            EntityBody::Bush(_) => EntityKind::Bush,
            EntityBody::Tree(_) => EntityKind::Tree,
            EntityBody::Nest(_) => EntityKind::Nest,
            EntityBody::Worm(_) => EntityKind::Worm,
        }
    }
}

impl Entity {
    pub fn new(id: EntityId, position: Position, body: EntityBody) -> Self {
        Self {
            id,
            position,
            alive: true,
            body,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn as_bird(&self) -> Option<&Bird> {
        match &self.body {
            EntityBody::Bird(bird) => Some(bird),
            _ => None,
        }
    }

    pub fn as_bird_mut(&mut self) -> Option<&mut Bird> {
        match &mut self.body {
            EntityBody::Bird(bird) => Some(bird),
            _ => None,
        }
    }

    pub fn as_butterfly(&self) -> Option<&Butterfly> {
        match &self.body {
            EntityBody::Butterfly(butterfly) => Some(butterfly),
            _ => None,
        }
    }

    pub fn as_butterfly_mut(&mut self) -> Option<&mut Butterfly> {
        match &mut self.body {
            EntityBody::Butterfly(butterfly) => Some(butterfly),
            _ => None,
        }
    }

    pub fn as_bush(&self) -> Option<&Bush> {
        match &self.body {
            EntityBody::Bush(bush) => Some(bush),
            _ => None,
        }
    }

    pub fn as_bush_mut(&mut self) -> Option<&mut Bush> {
        match &mut self.body {
            EntityBody::Bush(bush) => Some(bush),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match &self.body {
            EntityBody::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_tree_mut(&mut self) -> Option<&mut Tree> {
        match &mut self.body {
            EntityBody::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Short label of the entity's current behavior state, for views and
    /// debugging.
    pub fn state_label(&self) -> &'static str {
        use crate::bird::BirdState;
        use crate::butterfly::ButterflyState;
        use crate::worm::WormState;
        match &self.body {
            EntityBody::Bird(bird) => match bird.state {
                BirdState::Flying => "flying",
                BirdState::Perching => "perching",
                BirdState::Descending => "descending",
                BirdState::Walking => "walking",
                BirdState::Ascending => "ascending",
                BirdState::Eating => "eating",
            },
            EntityBody::Butterfly(butterfly) => match butterfly.state {
                ButterflyState::Flying => "flying",
                ButterflyState::Resting => "resting",
            },
            EntityBody::Bush(bush) => {
                if bush.cooldown_until_ms.is_some() {
                    "cooldown"
                } else {
                    "blooming"
                }
            }
            EntityBody::Tree(tree) => {
                if tree.has_nest() {
                    "nesting"
                } else {
                    "standing"
                }
            }
            EntityBody::Nest(_) => "incubating",
            EntityBody::Worm(worm) => match worm.state {
                WormState::Still => "still",
                WormState::Wiggling => "wiggling",
            },
        }
    }

    /// Where the token is drawn. Equals `position` except for a wiggling worm.
    pub fn display_position(&self) -> Position {
        match &self.body {
            EntityBody::Worm(worm) => self.position.offset(worm.wiggle_offset, 0.0),
            _ => self.position,
        }
    }

    /// Advance this entity one tick. Dead entities are skipped. A kind whose
    /// tick reports death clears `alive`; the matching despawn request is
    /// already in `requests`.
    pub fn tick(
        &mut self,
        ctx: &TickContext<'_>,
        rng: &mut GardenRng,
        requests: &mut Vec<LifecycleRequest>,
    ) {
        if !self.alive {
            return;
        }
        let id = self.id;
        let alive = match &mut self.body {
            EntityBody::Bird(bird) => {
                bird.tick(id, &mut self.position, ctx, rng);
                true
            }
            EntityBody::Butterfly(butterfly) => {
                butterfly.tick(id, &mut self.position, ctx, rng, requests)
            }
            EntityBody::Bush(bush) => bush.tick(id, ctx, rng, requests),
            // Trees are passive; their nest link is maintained by the drain.
            EntityBody::Tree(_) => true,
            // A hatching nest stays in play until the drain replaces it
            // with birds; it is not "dead" in the starved sense.
            EntityBody::Nest(nest) => {
                nest.tick(id, ctx, requests);
                true
            }
            EntityBody::Worm(worm) => {
                worm.tick(id, ctx, rng);
                true
            }
        };
        self.alive = alive;
    }
}

/// Read-only inputs to a single entity tick.
pub struct TickContext<'a> {
    /// Simulation clock at this tick, in milliseconds.
    pub now_ms: u64,
    pub config: &'a GardenConfig,
    pub world: &'a WorldSnapshot,
}

/// Positions of the stationary landmarks (bushes and trees), captured once
/// per frame before entities tick.
#[derive(Clone, Debug, Default)]
pub struct WorldSnapshot {
    bushes: BTreeMap<EntityId, Position>,
    trees: BTreeMap<EntityId, Position>,
}

impl WorldSnapshot {
    /// Snapshot the live bushes and trees of `registry`.
    pub fn capture(registry: &EntityRegistry) -> Self {
        let mut world = Self::default();
        for entity in registry.iter().filter(|e| e.alive) {
            match entity.body {
                EntityBody::Bush(_) => world.add_bush(entity.id, entity.position),
                EntityBody::Tree(_) => world.add_tree(entity.id, entity.position),
                _ => {}
            }
        }
        world
    }

    pub fn add_bush(&mut self, id: EntityId, position: Position) {
        self.bushes.insert(id, position);
    }

    pub fn add_tree(&mut self, id: EntityId, position: Position) {
        self.trees.insert(id, position);
    }

    pub fn bush_position(&self, id: EntityId) -> Option<Position> {
        self.bushes.get(&id).copied()
    }

    pub fn tree_position(&self, id: EntityId) -> Option<Position> {
        self.trees.get(&id).copied()
    }

    /// Bushes in handle order.
    pub fn bushes(&self) -> impl Iterator<Item = (EntityId, Position)> + '_ {
        self.bushes.iter().map(|(id, position)| (*id, *position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bush::Bush;

    #[test]
    fn capture_skips_dead_landmarks_and_mobile_entities() {
        let mut registry = EntityRegistry::new();
        let bush = registry.insert(Position::new(10.0, 10.0), EntityBody::Bush(Bush::new()));
        let tree = registry.insert(Position::new(50.0, 50.0), EntityBody::Tree(Tree::new()));
        let withered = registry.insert(Position::new(90.0, 90.0), EntityBody::Bush(Bush::new()));
        registry.insert(Position::new(5.0, 5.0), EntityBody::Bird(Bird::new(None)));
        if let Some(entity) = registry.get_mut(withered) {
            entity.alive = false;
        }

        let world = WorldSnapshot::capture(&registry);
        assert_eq!(world.bush_position(bush), Some(Position::new(10.0, 10.0)));
        assert_eq!(world.tree_position(tree), Some(Position::new(50.0, 50.0)));
        assert_eq!(world.bush_position(withered), None);
        assert_eq!(world.bushes().count(), 1);
    }

    #[test]
    fn dead_entities_do_not_tick() {
        let config = GardenConfig::default();
        let world = WorldSnapshot::default();
        let ctx = TickContext {
            now_ms: 0,
            config: &config,
            world: &world,
        };
        let mut rng = GardenRng::new(1);
        let mut requests = Vec::new();
        let mut entity = Entity::new(
            EntityId(1),
            Position::new(10.0, 10.0),
            EntityBody::Bird(Bird::new(None)),
        );
        entity.alive = false;
        entity.tick(&ctx, &mut rng, &mut requests);
        assert_eq!(entity.as_bird().map(|b| b.hunger), Some(100.0));
        assert_eq!(entity.position, Position::new(10.0, 10.0));
    }

    #[test]
    fn state_labels_follow_the_body() {
        let mut entity = Entity::new(
            EntityId(2),
            Position::default(),
            EntityBody::Bird(Bird::new(None)),
        );
        assert_eq!(entity.kind(), EntityKind::Bird);
        assert_eq!(entity.state_label(), "flying");
        if let Some(bird) = entity.as_bird_mut() {
            bird.state = crate::bird::BirdState::Walking;
        }
        assert_eq!(entity.state_label(), "walking");
        assert!(entity.as_bush().is_none());
    }
}
