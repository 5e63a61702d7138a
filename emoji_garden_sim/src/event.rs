// Garden events: the follow-up scheduling queue and the narrative feed.
//
// This file defines three related but distinct concepts:
// - `ScheduledEvent`: delayed follow-ups waiting in a priority queue (the
//   butterflies that arrive a few seconds after a bush is dropped, the bird
//   that arrives after a tree). Ordered by `(due_ms, sequence)`.
// - `SimEvent`: narrative events emitted as simulation output.
// - `EventLog`: the bounded feed of recent event messages shown to the user.
//
// Per-entity timers (bush cooldowns, nest hatching, worm wiggles) are not in
// the queue; they are deadline fields on the entity itself, so removing the
// entity cancels them. Queued follow-ups name their source entity and are
// dropped when it is gone by the time they fire (see `lifecycle.rs`).
//
// **Critical constraint: determinism.** The `(due_ms, sequence)` key gives
// a total order, so follow-ups due in the same millisecond always fire in
// scheduling order.

use crate::bird::Prey;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;

// ---------------------------------------------------------------------------
// Scheduled follow-ups (priority queue)
// ---------------------------------------------------------------------------

/// A follow-up waiting for its deadline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Simulation time (ms) at which the follow-up becomes due.
    pub due_ms: u64,
    /// Tiebreaker within the same deadline. Lower values fire first.
    pub sequence: u64,
    pub kind: ScheduledEventKind,
}

/// The follow-ups the garden schedules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEventKind {
    /// Butterflies arrive at a freshly dropped bush.
    ButterfliesArrive { bush: EntityId },
    /// A bird arrives at a freshly dropped tree.
    BirdArrives { tree: EntityId },
}

impl ScheduledEventKind {
    /// The entity whose removal cancels this follow-up.
    pub fn source(&self) -> EntityId {
        match self {
            ScheduledEventKind::ButterfliesArrive { bush } => *bush,
            ScheduledEventKind::BirdArrives { tree } => *tree,
        }
    }
}

// BinaryHeap is a max-heap; reverse the ordering so the earliest deadline
// comes out first.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.sequence == other.sequence
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap of pending follow-ups keyed by deadline.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a follow-up due at `due_ms`.
    pub fn schedule(&mut self, due_ms: u64, kind: ScheduledEventKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(ScheduledEvent {
            due_ms,
            sequence,
            kind,
        });
    }

    /// Deadline of the earliest pending follow-up.
    pub fn peek_due(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.due_ms)
    }

    /// Pop the earliest follow-up if it is due at or before `now_ms`.
    pub fn pop_if_ready(&mut self, now_ms: u64) -> Option<ScheduledEvent> {
        if self.peek_due().is_some_and(|due| due <= now_ms) {
            self.heap.pop()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Narrative events (output)
// ---------------------------------------------------------------------------

/// A narrative event emitted by the simulation for the event feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

/// Things that happen in the garden worth telling the user about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// The user dropped a token onto the canvas.
    EntityAdded { id: EntityId, kind: EntityKind },
    /// The first bush made the tree token available.
    TreeUnlocked,
    /// The follow-up butterflies of a dropped bush arrived.
    ButterfliesAppeared { bush: EntityId, butterflies: Vec<EntityId> },
    /// A bush spawned a butterfly on its own.
    ButterflyBorn { bush: EntityId, butterfly: EntityId },
    /// The follow-up bird of a dropped tree arrived.
    BirdArrived { tree: EntityId, bird: EntityId },
    WormAppeared { worm: EntityId },
    BirdAte { bird: EntityId, prey: Prey, prey_id: EntityId },
    Pollinated { butterfly: EntityId, bush: EntityId },
    ButterflyDied { butterfly: EntityId },
    BushWithered { bush: EntityId },
    NestCreated { tree: EntityId, nest: EntityId },
    NestHatched { tree: EntityId, hatchlings: Vec<EntityId> },
    SpeedChanged { speed: SimSpeed },
}

impl SimEventKind {
    /// The line shown in the event feed.
    pub fn message(&self) -> String {
        match self {
            SimEventKind::EntityAdded { kind, .. } => {
                format!("A {kind} has been added to the ecosystem!")
            }
            SimEventKind::TreeUnlocked => "Trees can now be planted!".to_string(),
            SimEventKind::ButterfliesAppeared { butterflies, .. } => match butterflies.len() {
                1 => "A new butterfly has appeared!".to_string(),
                n => format!("{n} new butterflies have appeared!"),
            },
            SimEventKind::ButterflyBorn { .. } => {
                "A new butterfly has appeared near a flowering bush!".to_string()
            }
            SimEventKind::BirdArrived { .. } => "A bird has moved into a tree!".to_string(),
            SimEventKind::WormAppeared { .. } => "A worm has appeared!".to_string(),
            SimEventKind::BirdAte { prey, .. } => format!("A bird has eaten a {}!", prey.name()),
            SimEventKind::Pollinated { .. } => {
                "A butterfly has pollinated a flowering bush!".to_string()
            }
            SimEventKind::ButterflyDied { .. } => "A butterfly has died.".to_string(),
            SimEventKind::BushWithered { .. } => {
                "A flowering bush has withered away due to lack of pollination.".to_string()
            }
            SimEventKind::NestCreated { .. } => "A nest has been created in a tree.".to_string(),
            SimEventKind::NestHatched { .. } => {
                "A nest has hatched! New birds have appeared.".to_string()
            }
            SimEventKind::SpeedChanged { speed } => format!("Simulation speed set to {speed:?}."),
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tick {}] {}", self.tick, self.kind.message())
    }
}

// ---------------------------------------------------------------------------
// Event feed
// ---------------------------------------------------------------------------

/// The most recent event messages, oldest dropped first.
#[derive(Clone, Debug, Serialize)]
pub struct EventLog {
    capacity: usize,
    messages: VecDeque<String>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            messages: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, message: String) {
        while self.messages.len() >= self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Messages from oldest to newest.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_fires_in_deadline_then_sequence_order() {
        let mut queue = EventQueue::new();
        queue.schedule(3_000, ScheduledEventKind::BirdArrives { tree: EntityId(1) });
        queue.schedule(1_500, ScheduledEventKind::ButterfliesArrive { bush: EntityId(2) });
        queue.schedule(1_500, ScheduledEventKind::ButterfliesArrive { bush: EntityId(3) });

        let first = queue.pop_if_ready(10_000).unwrap();
        assert_eq!(first.due_ms, 1_500);
        assert_eq!(first.kind.source(), EntityId(2));

        let second = queue.pop_if_ready(10_000).unwrap();
        assert_eq!(second.kind.source(), EntityId(3));

        let third = queue.pop_if_ready(10_000).unwrap();
        assert_eq!(third.due_ms, 3_000);
        assert!(queue.pop_if_ready(10_000).is_none());
    }

    #[test]
    fn pop_if_ready_waits_for_deadline() {
        let mut queue = EventQueue::new();
        queue.schedule(1_000, ScheduledEventKind::BirdArrives { tree: EntityId(9) });
        assert_eq!(queue.peek_due(), Some(1_000));
        assert!(queue.pop_if_ready(999).is_none());
        assert!(queue.pop_if_ready(1_000).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn event_log_keeps_most_recent() {
        let mut log = EventLog::new(5);
        for i in 0..8 {
            log.push(format!("message {i}"));
        }
        assert_eq!(log.len(), 5);
        let kept: Vec<&str> = log.messages().collect();
        assert_eq!(kept.first(), Some(&"message 3"));
        assert_eq!(kept.last(), Some(&"message 7"));
    }

    #[test]
    fn messages_match_the_feed() {
        let added = SimEventKind::EntityAdded {
            id: EntityId(1),
            kind: EntityKind::Bush,
        };
        assert_eq!(added.message(), "A bush has been added to the ecosystem!");

        let ate = SimEventKind::BirdAte {
            bird: EntityId(2),
            prey: Prey::Worm,
            prey_id: EntityId(3),
        };
        assert_eq!(ate.message(), "A bird has eaten a worm!");

        let two = SimEventKind::ButterfliesAppeared {
            bush: EntityId(1),
            butterflies: vec![EntityId(4), EntityId(5)],
        };
        assert_eq!(two.message(), "2 new butterflies have appeared!");
    }

    #[test]
    fn sim_event_serializes_for_the_feed() {
        let event = SimEvent {
            tick: 12,
            kind: SimEventKind::NestHatched {
                tree: EntityId(4),
                hatchlings: vec![EntityId(10), EntityId(11)],
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let restored: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, restored);
        assert_eq!(
            event.to_string(),
            "[tick 12] A nest has hatched! New birds have appeared."
        );
    }
}
