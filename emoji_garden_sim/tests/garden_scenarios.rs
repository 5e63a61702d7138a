// End-to-end garden scenarios.
//
// Each test drives a `SimState` only through its public entry points
// (`update`, `step`, actions and commands) plus direct registry tweaks to set
// up a precise starting situation, then checks the garden-level outcome:
// nests hatching on schedule, prey eaten exactly once, bushes spawning at
// their configured rate, and identical runs from identical seeds.

use emoji_garden_sim::bird::BirdState;
use emoji_garden_sim::command::{SimAction, SimCommand};
use emoji_garden_sim::config::{GardenConfig, METER_MAX};
use emoji_garden_sim::entity::EntityBody;
use emoji_garden_sim::event::SimEventKind;
use emoji_garden_sim::sim::SimState;
use emoji_garden_sim::types::{EntityId, EntityKind, Position};

fn spawn(kind: EntityKind, x: f32, y: f32) -> SimAction {
    SimAction::Spawn {
        kind,
        position: Position::new(x, y),
    }
}

/// Put a bird on the ground at `x`, walking, neither hungry nor full.
fn ground_bird(sim: &mut SimState, bird: EntityId, x: f32, food_consumed: f32) {
    let ground_y = sim.config.ground_y;
    let entity = sim.registry.get_mut(bird).unwrap();
    entity.position = Position::new(x, ground_y);
    let state = entity.as_bird_mut().unwrap();
    state.state = BirdState::Walking;
    state.hunger = 50.0;
    state.food_consumed = food_consumed;
}

fn scripted_commands() -> Vec<SimCommand> {
    vec![
        SimCommand {
            tick: 0,
            action: spawn(EntityKind::Bush, 150.0, 300.0),
        },
        SimCommand {
            tick: 0,
            action: spawn(EntityKind::Bush, 450.0, 320.0),
        },
        SimCommand {
            tick: 10,
            action: spawn(EntityKind::Tree, 300.0, 150.0),
        },
        SimCommand {
            tick: 20,
            action: SimAction::ScatterWorms { count: 10 },
        },
        SimCommand {
            tick: 30,
            action: spawn(EntityKind::Bird, 600.0, 100.0),
        },
    ]
}

#[test]
fn identical_seeds_evolve_identically() {
    let commands = scripted_commands();
    let mut a = SimState::new(1234);
    let mut b = SimState::new(1234);
    let result_a = a.step(&commands, 3_000);
    let result_b = b.step(&commands, 3_000);

    assert_eq!(result_a.events, result_b.events);
    assert_eq!(result_a.removed, result_b.removed);
    assert_eq!(a.population(), b.population());
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );

    let mut c = SimState::new(4321);
    c.step(&commands, 3_000);
    assert_ne!(
        serde_json::to_string(&a.registry).unwrap(),
        serde_json::to_string(&c.registry).unwrap()
    );
}

#[test]
fn tree_is_locked_until_the_first_bush() {
    let mut config = GardenConfig::default();
    config.bush.spawn_chance = 0.0;
    let mut sim = SimState::with_config(2, config);
    let commands = vec![
        SimCommand {
            tick: 0,
            action: spawn(EntityKind::Tree, 300.0, 150.0),
        },
        SimCommand {
            tick: 5,
            action: spawn(EntityKind::Bush, 100.0, 300.0),
        },
        SimCommand {
            tick: 6,
            action: spawn(EntityKind::Tree, 300.0, 150.0),
        },
    ];
    let result = sim.step(&commands, 10);
    assert_eq!(sim.entities_of_kind(EntityKind::Tree).len(), 1);
    let messages: Vec<String> = result.events.iter().map(|e| e.kind.message()).collect();
    assert_eq!(
        messages,
        vec![
            "A bush has been added to the ecosystem!",
            "Trees can now be planted!",
            "A tree has been added to the ecosystem!",
        ]
    );
}

#[test]
fn worm_under_two_walking_birds_is_eaten_once() {
    let mut sim = SimState::new(3);
    sim.update(16, &[spawn(EntityKind::Bird, 300.0, 100.0), spawn(EntityKind::Bird, 310.0, 100.0)]);
    let birds = sim.entities_of_kind(EntityKind::Bird);
    assert_eq!(birds.len(), 2);
    ground_bird(&mut sim, birds[0], 300.0, 0.0);
    ground_bird(&mut sim, birds[1], 302.0, 0.0);

    let ground_y = sim.config.ground_y;
    let result = sim.update(16, &[spawn(EntityKind::Worm, 301.0, ground_y)]);

    let meals: Vec<&SimEventKind> = result
        .events
        .iter()
        .map(|e| &e.kind)
        .filter(|kind| matches!(kind, SimEventKind::BirdAte { .. }))
        .collect();
    assert_eq!(meals.len(), 1);
    assert!(sim.entities_of_kind(EntityKind::Worm).is_empty());
    assert_eq!(result.removed.len(), 1);

    let fed: Vec<f32> = birds
        .iter()
        .map(|id| sim.registry.get(*id).unwrap().as_bird().unwrap().food_consumed)
        .collect();
    assert_eq!(fed, vec![20.0, 0.0]);
}

#[test]
fn starving_butterfly_is_removed_within_one_tick() {
    let mut sim = SimState::new(4);
    sim.update(16, &[spawn(EntityKind::Butterfly, 200.0, 200.0)]);
    let butterfly = sim.entities_of_kind(EntityKind::Butterfly)[0];
    sim.registry
        .get_mut(butterfly)
        .and_then(|e| e.as_butterfly_mut())
        .unwrap()
        .hunger = 0.05;

    let result = sim.update(16, &[]);
    assert_eq!(result.removed, vec![butterfly]);
    assert!(sim.entities_of_kind(EntityKind::Butterfly).is_empty());
    assert!(
        result
            .events
            .iter()
            .any(|e| e.kind == SimEventKind::ButterflyDied { butterfly })
    );
}

#[test]
fn bush_spawns_about_one_butterfly_per_hundred_ticks() {
    let mut config = GardenConfig::default();
    config.bush.cooldown_ms = (0, 0);
    config.bush.meter_decay_per_tick = 0.0;
    let mut sim = SimState::with_config(5, config);
    let commands = vec![SimCommand {
        tick: 0,
        action: spawn(EntityKind::Bush, 100.0, 100.0),
    }];
    let result = sim.step(&commands, 10_000);
    let born = result
        .events
        .iter()
        .filter(|e| matches!(e.kind, SimEventKind::ButterflyBorn { .. }))
        .count();
    assert!((60..=140).contains(&born), "{born} butterflies in 10,000 ticks");
}

#[test]
fn nest_hatches_on_schedule_near_its_tree() {
    let mut config = GardenConfig::default();
    config.bush.spawn_chance = 0.0;
    let mut sim = SimState::with_config(6, config);
    let tree_at = Position::new(200.0, 300.0);
    sim.update(
        16,
        &[
            spawn(EntityKind::Bush, 600.0, 300.0),
            spawn(EntityKind::Tree, tree_at.x, tree_at.y),
        ],
    );
    let tree = sim.entities_of_kind(EntityKind::Tree)[0];
    sim.update(16, &[spawn(EntityKind::Bird, 200.0, 500.0)]);
    let bird = sim.entities_of_kind(EntityKind::Bird)[0];
    assert_eq!(
        sim.registry.get(bird).unwrap().as_bird().unwrap().home_tree,
        Some(tree)
    );

    // One more worm crosses the nest threshold.
    ground_bird(&mut sim, bird, 200.0, 90.0);
    let ground_y = sim.config.ground_y;
    let result = sim.update(16, &[spawn(EntityKind::Worm, 200.0, ground_y)]);
    assert!(
        result
            .events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::NestCreated { tree: t, .. } if t == tree))
    );
    let created_at = sim.elapsed_ms;
    let nest = sim.entities_of_kind(EntityKind::Nest)[0];
    let deadline = match &sim.registry.get(nest).unwrap().body {
        EntityBody::Nest(nest) => nest.hatch_deadline_ms,
        other => panic!("expected a nest, got {other:?}"),
    };
    assert!((created_at + 120_000..=created_at + 180_000).contains(&deadline));
    assert_eq!(
        sim.registry.get(tree).unwrap().as_tree().unwrap().nest,
        Some(nest)
    );

    let mut hatchlings = None;
    while sim.elapsed_ms <= created_at + 180_000 + 16 {
        let result = sim.update(16, &[]);
        // A tree never holds a second nest while the first is alive.
        assert!(sim.entities_of_kind(EntityKind::Nest).len() <= 1);
        if let Some(event) = result
            .events
            .iter()
            .find(|e| matches!(e.kind, SimEventKind::NestHatched { .. }))
        {
            if let SimEventKind::NestHatched { hatchlings: birds, .. } = &event.kind {
                hatchlings = Some(birds.clone());
            }
            break;
        }
    }
    let hatchlings = hatchlings.expect("nest never hatched");
    assert!(sim.elapsed_ms >= deadline);
    assert!(sim.elapsed_ms >= created_at + 120_000);
    assert!((2..=3).contains(&hatchlings.len()));
    for id in &hatchlings {
        let entity = sim.registry.get(*id).unwrap();
        assert!((entity.position.x - tree_at.x).abs() <= 20.0);
        assert!((entity.position.y - tree_at.y).abs() <= 20.0);
        assert_eq!(entity.as_bird().unwrap().home_tree, Some(tree));
    }
    assert!(sim.entities_of_kind(EntityKind::Nest).is_empty());
    assert_eq!(sim.registry.get(tree).unwrap().as_tree().unwrap().nest, None);
}

#[test]
fn meters_stay_in_range_in_a_busy_garden() {
    let mut sim = SimState::new(7);
    let mut commands = scripted_commands();
    commands.push(SimCommand {
        tick: 40,
        action: spawn(EntityKind::Butterfly, 50.0, 50.0),
    });
    for window in 1..=20u64 {
        sim.step(&commands, window * 250);
        for entity in sim.registry.iter().filter(|e| e.alive) {
            let meter = match &entity.body {
                EntityBody::Bird(bird) => bird.hunger,
                EntityBody::Butterfly(butterfly) => butterfly.hunger,
                EntityBody::Bush(bush) => bush.pollination_meter,
                _ => continue,
            };
            assert!((0.0..=METER_MAX).contains(&meter), "{} at {meter}", entity.id);
            let max_x = sim.config.max_x();
            let max_y = sim.config.max_y();
            assert!((0.0..=max_x).contains(&entity.position.x));
            assert!((0.0..=max_y).contains(&entity.position.y));
        }
    }
}
