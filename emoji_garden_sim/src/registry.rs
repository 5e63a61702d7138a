// Entity arena keyed by stable handles.
//
// The registry owns every entity. Handles come from a monotonic counter and
// are never reused, so stale handles held by other entities resolve to
// nothing rather than to a newcomer. A per-kind index answers "all live
// butterflies" without scanning the whole arena.
//
// **Critical constraint: determinism.** Both the arena and the index are
// ordered maps; iteration is always in handle order, which is insertion
// order.

use crate::entity::{Entity, EntityBody};
use crate::types::{EntityId, EntityKind, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    by_kind: BTreeMap<EntityKind, BTreeSet<EntityId>>,
    next_id: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live entity and return its fresh handle.
    pub fn insert(&mut self, position: Position, body: EntityBody) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.by_kind.entry(body.kind()).or_default().insert(id);
        self.entities.insert(id, Entity::new(id, position, body));
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// The entity behind `id`, if it exists and is still alive.
    pub fn live(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id).filter(|e| e.alive)
    }

    /// Handles of every entity of `kind` (dead ones included until the next
    /// `compact`), in handle order.
    pub fn of_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.by_kind
            .get(&kind)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Live entities of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.by_kind.get(&kind).map_or(0, |ids| {
            ids.iter()
                .filter(|id| self.entities.get(id).is_some_and(|e| e.alive))
                .count()
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every dead entity and return them in handle order.
    pub fn compact(&mut self) -> Vec<Entity> {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| !e.alive)
            .map(|e| e.id)
            .collect();
        let mut removed = Vec::with_capacity(dead.len());
        for id in dead {
            if let Some(entity) = self.entities.remove(&id) {
                if let Some(ids) = self.by_kind.get_mut(&entity.kind()) {
                    ids.remove(&id);
                }
                removed.push(entity);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bush::Bush;
    use crate::tree::Tree;

    #[test]
    fn handles_are_never_reused() {
        let mut registry = EntityRegistry::new();
        let a = registry.insert(Position::new(1.0, 1.0), EntityBody::Bush(Bush::new()));
        registry.get_mut(a).unwrap().alive = false;
        registry.compact();
        let b = registry.insert(Position::new(2.0, 2.0), EntityBody::Bush(Bush::new()));
        assert_ne!(a, b);
        assert!(registry.get(a).is_none());
    }

    #[test]
    fn compact_removes_dead_and_updates_index() {
        let mut registry = EntityRegistry::new();
        let bush = registry.insert(Position::default(), EntityBody::Bush(Bush::new()));
        let tree = registry.insert(Position::default(), EntityBody::Tree(Tree::new()));
        registry.get_mut(bush).unwrap().alive = false;

        assert_eq!(registry.count(EntityKind::Bush), 0);
        assert_eq!(registry.of_kind(EntityKind::Bush), vec![bush]);
        assert!(registry.live(bush).is_none());

        let removed = registry.compact();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, bush);
        assert!(registry.of_kind(EntityKind::Bush).is_empty());
        assert_eq!(registry.of_kind(EntityKind::Tree), vec![tree]);
        assert_eq!(registry.len(), 1);
    }
}
