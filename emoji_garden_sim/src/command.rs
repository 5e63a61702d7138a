// Commands that mutate garden state from outside.
//
// All external mutations to the simulation go through `SimAction`: a token
// dropped on the canvas, a handful of worms scattered at random, a speed
// change. Nothing else outside the crate can change garden state.
//
// The flow for a user drop:
//   platform drag-and-drop → `SimAction::Spawn { kind, position }` →
//   `SimState::update()` (per frame) or `SimState::step()` (scripted, wrapped
//   in a `SimCommand` carrying its application tick) → `lifecycle.rs`.
//
// Current actions:
// - `Spawn`: place a token of any user-placeable kind. Nests are refused and
//   trees are refused until the first bush; refusals are logged, not errors.
// - `ScatterWorms`: drop `count` worms at random points.
// - `SetSimSpeed`: pause / normal / fast.
//
// **Critical constraint: determinism.** Commands are the sole external input
// to the garden. Scripted runs apply a tick's commands in the order given.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// An action scheduled for a specific simulation tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimCommand {
    pub tick: u64,
    pub action: SimAction,
}

/// The specific action a command performs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimAction {
    /// Drop a token at `position` (clamped to the play area).
    Spawn { kind: EntityKind, position: Position },
    /// Drop `count` worms at uniformly random points.
    ScatterWorms { count: u32 },
    /// Change the simulation speed.
    SetSimSpeed { speed: SimSpeed },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_json_parses() {
        let json = r#"[
            { "tick": 0, "action": { "Spawn": { "kind": "Bush", "position": { "x": 100.0, "y": 100.0 } } } },
            { "tick": 60, "action": { "ScatterWorms": { "count": 3 } } },
            { "tick": 90, "action": { "SetSimSpeed": { "speed": "Fast" } } }
        ]"#;
        let commands: Vec<SimCommand> = serde_json::from_str(json).unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0].action,
            SimAction::Spawn {
                kind: EntityKind::Bush,
                position: Position::new(100.0, 100.0)
            }
        );
        assert_eq!(commands[1].action, SimAction::ScatterWorms { count: 3 });
        assert_eq!(commands[2].tick, 90);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{ "tick": 0, "action": { "Spawn": { "kind": "Dragon", "position": { "x": 1.0, "y": 1.0 } } } }"#;
        assert!(serde_json::from_str::<SimCommand>(json).is_err());
    }
}
