// emoji_garden_sim: the emoji garden's entity simulation, as a pure Rust
// library.
//
// The garden is a canvas of emoji tokens (flowering bushes, trees, butterflies,
// birds, worms, nests). Each token is a simulated entity with a small finite
// state machine; once per frame every live entity ticks, then cross-kind
// collisions are resolved, then spawn/despawn requests are drained. The
// platform layer (drag and drop, DOM or terminal rendering, the event feed)
// lives outside this crate and talks to it through `command.rs` (input),
// `SimState::entities_of_kind` (queries) and `view.rs` (output).
//
// Module overview:
// - `sim.rs`:         SimState, the simulation clock and per-frame update loop.
// - `registry.rs`:    Entity arena keyed by stable handles, plus a kind index.
// - `entity.rs`:      Entity sum type, per-tick context and world snapshot.
// - `bird.rs`:        Bird FSM (fly, perch, descend, walk, ascend, eat).
// - `butterfly.rs`:   Butterfly FSM (fly, rest, bush visits and pollination).
// - `bush.rs`:        Flowering bush (pollination meter, butterfly spawning).
// - `tree.rs`:        Tree and Nest (one nest per tree, timed hatching).
// - `worm.rs`:        Worm (wiggle animation timer).
// - `interaction.rs`: Collision pass (bird×worm, bird×butterfly, butterfly×bush).
// - `lifecycle.rs`:   Spawn validation, delayed follow-ups, despawn drain.
// - `event.rs`:       Follow-up scheduling queue, narrative events, event log.
// - `spatial.rs`:     Axis-aligned bounding boxes for token collisions.
// - `command.rs`:     SimCommand / SimAction, the only external mutations.
// - `view.rs`:        GardenView, the rendering collaborator interface.
// - `config.rs`:      GardenConfig, every tunable number, loaded from JSON.
// - `types.rs`:       Position, EntityId, EntityKind, SimSpeed.
// - `prng`:           Re-exported from `emoji_garden_prng`.
//
// **Critical constraint: determinism.** Given a seed, a config and the same
// sequence of commands and frame deltas, the garden evolves identically. All
// randomness comes from the single `GardenRng` owned by `SimState`; ordered
// collections (`BTreeMap`/`BTreeSet`) are used wherever iteration order
// affects results.

pub mod bird;
pub mod bush;
pub mod butterfly;
pub mod command;
pub mod config;
pub mod entity;
pub mod event;
pub mod interaction;
pub mod lifecycle;
pub mod registry;
pub mod sim;
pub mod spatial;
pub mod tree;
pub mod types;
pub mod view;
pub mod worm;

pub use emoji_garden_prng as prng;
