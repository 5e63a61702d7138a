// Trees and nests.
//
// A tree is a passive landmark: birds perch on it and it holds at most one
// nest. A nest is created by the drain when a bird homed on the tree has
// eaten enough (see `Bird::eat`), and hatches once its deadline passes,
// turning into a small brood of birds homed on the same tree.
//
// The hatch deadline is drawn when the nest is created and lives on the nest,
// so removing the nest (or its tree) cancels the hatch.

use crate::config::NestParams;
use crate::entity::TickContext;
use crate::lifecycle::LifecycleRequest;
use crate::prng::GardenRng;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tree {
    pub nest: Option<EntityId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_nest(&self) -> bool {
        self.nest.is_some()
    }

    /// Record a nest on this tree. Returns `false` (and changes nothing) if
    /// the tree already has one.
    pub fn attach_nest(&mut self, nest: EntityId) -> bool {
        if self.nest.is_some() {
            return false;
        }
        self.nest = Some(nest);
        true
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nest {
    pub tree: EntityId,
    pub hatch_deadline_ms: u64,
}

impl Nest {
    pub fn new(tree: EntityId, now_ms: u64, params: &NestParams, rng: &mut GardenRng) -> Self {
        let (low, high) = params.hatch_delay_ms;
        Self {
            tree,
            hatch_deadline_ms: now_ms.saturating_add(rng.range_u64_inclusive(low, high)),
        }
    }

    /// Request hatching once the deadline has passed.
    pub fn tick(&self, id: EntityId, ctx: &TickContext<'_>, requests: &mut Vec<LifecycleRequest>) {
        if ctx.now_ms >= self.hatch_deadline_ms {
            debug!(nest = %id, tree = %self.tree, "nest hatching");
            requests.push(LifecycleRequest::HatchNest {
                nest: id,
                tree: self.tree,
            });
        }
    }
}
