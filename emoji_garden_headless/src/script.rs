// Command scripts: the scripted stand-in for a user dragging tokens around.
//
// A script is a JSON array of `SimCommand`s, e.g.
//
//   [
//     { "tick": 0,   "action": { "Spawn": { "kind": "Bush", "position": { "x": 120, "y": 300 } } } },
//     { "tick": 120, "action": { "ScatterWorms": { "count": 6 } } }
//   ]
//
// Without `--script` the runner uses `demo_script`, a small garden with two
// bushes, a tree, a bird and a handful of worms.

use emoji_garden_sim::command::{SimAction, SimCommand};
use emoji_garden_sim::config::GardenConfig;
use emoji_garden_sim::types::{EntityKind, Position};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed script JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_script(json: &str) -> Result<Vec<SimCommand>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_script(path: &Path) -> Result<Vec<SimCommand>, ScriptError> {
    let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&json)
}

/// The built-in garden: bushes first (which unlocks trees), then a tree, a
/// bird, and worms on the ground.
pub fn demo_script(config: &GardenConfig) -> Vec<SimCommand> {
    let (width, _) = config.play_area;
    let ground = config.ground_y;
    let at = |tick: u64, kind: EntityKind, x: f32, y: f32| SimCommand {
        tick,
        action: SimAction::Spawn {
            kind,
            position: Position::new(x, y),
        },
    };
    vec![
        at(0, EntityKind::Bush, width * 0.2, ground - 80.0),
        at(30, EntityKind::Bush, width * 0.6, ground - 60.0),
        at(60, EntityKind::Tree, width * 0.4, ground - 200.0),
        at(90, EntityKind::Bird, width * 0.8, 80.0),
        SimCommand {
            tick: 120,
            action: SimAction::ScatterWorms { count: 6 },
        },
        at(180, EntityKind::Worm, width * 0.4, ground),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_script() {
        let json = r#"[
            { "tick": 0, "action": { "Spawn": { "kind": "Bush", "position": { "x": 120.0, "y": 300.0 } } } },
            { "tick": 120, "action": { "ScatterWorms": { "count": 6 } } }
        ]"#;
        let script = parse_script(json).unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script[1].action, SimAction::ScatterWorms { count: 6 });
    }

    #[test]
    fn malformed_script_is_a_json_error() {
        assert!(matches!(
            parse_script(r#"[{ "tick": "soon" }]"#),
            Err(ScriptError::Json(_))
        ));
    }

    #[test]
    fn missing_script_is_an_io_error() {
        let err = load_script(Path::new("/no/such/script.json")).unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
        assert!(err.to_string().contains("/no/such/script.json"));
    }

    #[test]
    fn demo_plants_a_bush_before_the_tree() {
        let script = demo_script(&GardenConfig::default());
        let first_tree = script
            .iter()
            .find(|c| matches!(c.action, SimAction::Spawn { kind: EntityKind::Tree, .. }))
            .unwrap();
        let first_bush = script
            .iter()
            .find(|c| matches!(c.action, SimAction::Spawn { kind: EntityKind::Bush, .. }))
            .unwrap();
        assert!(first_bush.tick < first_tree.tick);
    }
}
