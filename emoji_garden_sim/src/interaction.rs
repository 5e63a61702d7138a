// Collision pass: the only place entities affect each other directly.
//
// Runs once per frame after every entity has ticked, in three fixed phases:
// 1. Walking birds eat worms they overlap.
// 2. Flying birds eat butterflies they overlap.
// 3. Surviving butterflies visit every bush they overlap.
//
// Within a phase, predators (or visitors) are taken in handle order and each
// eats at most one prey per frame. Eaten prey has `alive` cleared on the
// spot, so a worm under two walking birds is eaten by the lower handle only,
// and a butterfly eaten in phase 2 makes no visits in phase 3. Structural
// removal is left to the lifecycle drain.
//
// All collisions are token-box overlaps (`spatial.rs`).

use crate::bird::{BirdState, Prey};
use crate::config::GardenConfig;
use crate::entity::Entity;
use crate::event::SimEventKind;
use crate::lifecycle::{DespawnCause, LifecycleRequest};
use crate::prng::GardenRng;
use crate::registry::EntityRegistry;
use crate::spatial::tokens_overlap;
use crate::types::{EntityId, EntityKind, Position};
use tracing::debug;

/// Resolve this frame's collisions.
pub fn resolve(
    registry: &mut EntityRegistry,
    config: &GardenConfig,
    rng: &mut GardenRng,
    requests: &mut Vec<LifecycleRequest>,
    events: &mut Vec<SimEventKind>,
) {
    predation(registry, config, BirdState::Walking, Prey::Worm, requests, events);
    predation(registry, config, BirdState::Flying, Prey::Butterfly, requests, events);
    pollination(registry, config, rng, events);
}

fn live_positions(registry: &EntityRegistry, kind: EntityKind) -> Vec<(EntityId, Position)> {
    registry
        .of_kind(kind)
        .into_iter()
        .filter_map(|id| registry.live(id).map(|e| (id, e.position)))
        .collect()
}

fn predation(
    registry: &mut EntityRegistry,
    config: &GardenConfig,
    hunting: BirdState,
    prey: Prey,
    requests: &mut Vec<LifecycleRequest>,
    events: &mut Vec<SimEventKind>,
) {
    let prey_kind = match prey {
        Prey::Worm => EntityKind::Worm,
        Prey::Butterfly => EntityKind::Butterfly,
    };
    let mut targets = live_positions(registry, prey_kind);
    if targets.is_empty() {
        return;
    }
    let hunters: Vec<(EntityId, Position)> = live_positions(registry, EntityKind::Bird)
        .into_iter()
        .filter(|(id, _)| {
            registry
                .get(*id)
                .and_then(Entity::as_bird)
                .is_some_and(|bird| bird.state == hunting)
        })
        .collect();

    for (bird_id, bird_at) in hunters {
        let Some(index) = targets
            .iter()
            .position(|(_, at)| tokens_overlap(bird_at, *at, config.token_size))
        else {
            continue;
        };
        let (prey_id, _) = targets.remove(index);
        if let Some(prey_entity) = registry.get_mut(prey_id) {
            prey_entity.alive = false;
        }
        let Some(bird) = registry.get_mut(bird_id).and_then(Entity::as_bird_mut) else {
            continue;
        };
        let nest_ready = bird.eat(prey, config);
        let home_tree = bird.home_tree;
        debug!(bird = %bird_id, prey = %prey_id, kind = prey.name(), "bird ate");

        requests.push(LifecycleRequest::Despawn {
            id: prey_id,
            cause: DespawnCause::Eaten { by: bird_id },
        });
        events.push(SimEventKind::BirdAte {
            bird: bird_id,
            prey,
            prey_id,
        });
        if nest_ready {
            match home_tree {
                Some(tree) => requests.push(LifecycleRequest::CreateNest {
                    tree,
                    requested_by: bird_id,
                }),
                None => debug!(bird = %bird_id, "well fed but homeless, no nest"),
            }
        }
    }
}

fn pollination(
    registry: &mut EntityRegistry,
    config: &GardenConfig,
    rng: &mut GardenRng,
    events: &mut Vec<SimEventKind>,
) {
    let bushes = live_positions(registry, EntityKind::Bush);
    if bushes.is_empty() {
        return;
    }
    for (butterfly_id, at) in live_positions(registry, EntityKind::Butterfly) {
        for &(bush_id, bush_at) in &bushes {
            if !tokens_overlap(at, bush_at, config.token_size) {
                continue;
            }
            let Some(butterfly) = registry
                .get_mut(butterfly_id)
                .and_then(Entity::as_butterfly_mut)
            else {
                break;
            };
            let Some(amount) = butterfly.visit(bush_id, &config.butterfly, rng) else {
                continue;
            };
            if let Some(bush) = registry.get_mut(bush_id).and_then(Entity::as_bush_mut) {
                bush.pollinate(amount);
                debug!(butterfly = %butterfly_id, bush = %bush_id, meter = bush.pollination_meter, "bush pollinated");
                events.push(SimEventKind::Pollinated {
                    butterfly: butterfly_id,
                    bush: bush_id,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bird::Bird;
    use crate::bush::Bush;
    use crate::butterfly::Butterfly;
    use crate::entity::EntityBody;
    use crate::worm::Worm;

    fn walking_bird(hunger: f32) -> EntityBody {
        let mut bird = Bird::new(None);
        bird.state = BirdState::Walking;
        bird.hunger = hunger;
        EntityBody::Bird(bird)
    }

    fn worm(rng: &mut GardenRng, config: &GardenConfig) -> EntityBody {
        EntityBody::Worm(Worm::new(0, &config.worm, rng))
    }

    #[test]
    fn worm_under_two_birds_is_eaten_once() {
        let config = GardenConfig::default();
        let mut rng = GardenRng::new(1);
        let mut registry = EntityRegistry::new();
        let first = registry.insert(Position::new(100.0, 540.0), walking_bird(20.0));
        let second = registry.insert(Position::new(105.0, 540.0), walking_bird(20.0));
        let worm_id = registry.insert(Position::new(102.0, 545.0), worm(&mut rng, &config));

        let mut requests = Vec::new();
        let mut events = Vec::new();
        resolve(&mut registry, &config, &mut rng, &mut requests, &mut events);

        assert!(!registry.get(worm_id).unwrap().alive);
        assert_eq!(
            requests,
            vec![LifecycleRequest::Despawn {
                id: worm_id,
                cause: DespawnCause::Eaten { by: first }
            }]
        );
        assert_eq!(events.len(), 1);
        let first_bird = registry.get(first).unwrap().as_bird().unwrap();
        assert_eq!(first_bird.state, BirdState::Eating);
        assert_eq!(first_bird.hunger, 40.0);
        let second_bird = registry.get(second).unwrap().as_bird().unwrap();
        assert_eq!(second_bird.state, BirdState::Walking);
        assert_eq!(second_bird.hunger, 20.0);
    }

    #[test]
    fn flying_birds_ignore_worms_and_walking_birds_ignore_butterflies() {
        let config = GardenConfig::default();
        let mut rng = GardenRng::new(2);
        let mut registry = EntityRegistry::new();
        registry.insert(Position::new(100.0, 100.0), EntityBody::Bird(Bird::new(None)));
        registry.insert(Position::new(100.0, 100.0), worm(&mut rng, &config));
        registry.insert(Position::new(300.0, 540.0), walking_bird(50.0));
        registry.insert(
            Position::new(300.0, 540.0),
            EntityBody::Butterfly(Butterfly::new(None)),
        );

        let mut requests = Vec::new();
        let mut events = Vec::new();
        resolve(&mut registry, &config, &mut rng, &mut requests, &mut events);
        assert!(requests.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn eaten_butterfly_makes_no_visits() {
        let config = GardenConfig::default();
        let mut rng = GardenRng::new(3);
        let mut registry = EntityRegistry::new();
        let bush = registry.insert(Position::new(200.0, 200.0), EntityBody::Bush(Bush::new()));
        let bird = registry.insert(Position::new(200.0, 200.0), EntityBody::Bird(Bird::new(None)));
        let butterfly = registry.insert(
            Position::new(205.0, 205.0),
            EntityBody::Butterfly(Butterfly::new(Some(bush))),
        );

        let mut requests = Vec::new();
        let mut events = Vec::new();
        resolve(&mut registry, &config, &mut rng, &mut requests, &mut events);

        assert_eq!(
            requests,
            vec![LifecycleRequest::Despawn {
                id: butterfly,
                cause: DespawnCause::Eaten { by: bird }
            }]
        );
        let eaten = registry.get(butterfly).unwrap().as_butterfly().unwrap();
        assert!(!eaten.carries_pollen);
        let bird_state = registry.get(bird).unwrap().as_bird().unwrap();
        assert_eq!(bird_state.hunger, 100.0);
    }

    #[test]
    fn butterfly_carries_pollen_between_bushes() {
        let mut config = GardenConfig::default();
        config.butterfly.pollination_chance = 1.0;
        let mut rng = GardenRng::new(4);
        let mut registry = EntityRegistry::new();
        let a = registry.insert(Position::new(100.0, 100.0), EntityBody::Bush(Bush::new()));
        let b = registry.insert(Position::new(400.0, 100.0), EntityBody::Bush(Bush::new()));
        let butterfly = registry.insert(
            Position::new(105.0, 100.0),
            EntityBody::Butterfly(Butterfly::new(Some(a))),
        );
        registry.get_mut(b).unwrap().as_bush_mut().unwrap().pollination_meter = 50.0;

        let mut requests = Vec::new();
        let mut events = Vec::new();
        resolve(&mut registry, &config, &mut rng, &mut requests, &mut events);
        assert!(events.is_empty());
        let carrier = registry.get(butterfly).unwrap().as_butterfly().unwrap();
        assert_eq!(carrier.pollen_source, Some(a));

        registry.get_mut(butterfly).unwrap().position = Position::new(395.0, 105.0);
        resolve(&mut registry, &config, &mut rng, &mut requests, &mut events);
        assert_eq!(
            events,
            vec![SimEventKind::Pollinated {
                butterfly,
                bush: b
            }]
        );
        let meter = registry.get(b).unwrap().as_bush().unwrap().pollination_meter;
        assert_eq!(meter, 60.0);
    }

    #[test]
    fn well_fed_homed_bird_requests_a_nest() {
        let mut config = GardenConfig::default();
        config.bird.nest_food_threshold = 20.0;
        let mut rng = GardenRng::new(5);
        let mut registry = EntityRegistry::new();
        let tree = EntityId(77);
        let mut bird = Bird::new(Some(tree));
        bird.state = BirdState::Walking;
        let bird_id = registry.insert(Position::new(50.0, 540.0), EntityBody::Bird(bird));
        registry.insert(Position::new(55.0, 540.0), worm(&mut rng, &config));

        let mut requests = Vec::new();
        let mut events = Vec::new();
        resolve(&mut registry, &config, &mut rng, &mut requests, &mut events);
        assert!(requests.contains(&LifecycleRequest::CreateNest {
            tree,
            requested_by: bird_id
        }));
    }
}
