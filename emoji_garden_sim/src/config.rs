// Data-driven garden configuration.
//
// Every tunable number in the simulation lives in `GardenConfig`: frame
// timing, the play area, token size, and one parameter group per entity kind
// (`BirdParams`, `ButterflyParams`, `BushParams`, `NestParams`, `WormParams`)
// plus `LifecycleParams` for delayed follow-up spawns. The sim never uses
// magic numbers; it reads from the config. `Default` reproduces the values of
// the browser version of the garden.
//
// Configs load from JSON. Every struct is `#[serde(default)]`, so a config
// file only needs the fields it overrides. `GardenConfig::from_json` parses
// and then validates: probabilities must lie in [0, 1], ranges must not be
// inverted, sizes must be positive. Validation failures name the offending
// field so a balance tweak that breaks the garden is caught at load time
// instead of as a panic deep inside a tick.
//
// Rates are per tick; delays are in simulation milliseconds. Hunger and meter
// values share the [0, 100] scale.
//
// See also: `sim.rs` which owns the config as part of `SimState`, and the
// per-kind modules (`bird.rs`, `butterfly.rs`, ...) that read their group.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound of every hunger and pollination scale.
pub const METER_MAX: f32 = 100.0;

/// Most creatures a single hatch or bush drop may produce.
pub const MAX_BROOD: u64 = 32;

/// Errors from loading or validating a `GardenConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Per-kind parameter groups
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdParams {
    /// Hunger lost every tick.
    pub hunger_decay_per_tick: f32,
    /// Below this hunger a bird that is not walking drops to the ground.
    pub descend_below_hunger: f32,
    /// Above this hunger a walking bird takes off again.
    pub ascend_above_hunger: f32,
    /// Units per tick when flying toward the home tree.
    pub flight_speed: f32,
    /// Step length range (units) of homeless random diffusion.
    pub diffusion_step: (f32, f32),
    /// Step length range (units) of the ground random walk.
    pub walk_step: (f32, f32),
    /// Units per tick when descending or ascending.
    pub vertical_speed: f32,
    /// Distance at which a flying bird counts as arrived at its perch.
    pub perch_arrival_distance: f32,
    /// Positional noise while perching.
    pub perch_jitter: f32,
    /// Vertical offset of the perch point from the tree's position.
    pub perch_offset_y: f32,
    /// Per-tick chance a perching bird takes off.
    pub resume_flying_chance: f32,
    /// Height an ascending bird climbs to when it has no live home tree.
    pub default_canopy_y: f32,
    pub worm_nutrition: f32,
    pub butterfly_nutrition: f32,
    /// Food consumed since the last nest that triggers a new nest request.
    pub nest_food_threshold: f32,
}

impl Default for BirdParams {
    fn default() -> Self {
        Self {
            hunger_decay_per_tick: 0.1,
            descend_below_hunger: 30.0,
            ascend_above_hunger: 70.0,
            flight_speed: 3.0,
            diffusion_step: (2.0, 7.0),
            walk_step: (1.0, 4.0),
            vertical_speed: 2.0,
            perch_arrival_distance: 5.0,
            perch_jitter: 1.0,
            perch_offset_y: -20.0,
            resume_flying_chance: 0.01,
            default_canopy_y: 200.0,
            worm_nutrition: 20.0,
            butterfly_nutrition: 5.0,
            nest_food_threshold: 100.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ButterflyParams {
    pub hunger_decay_per_tick: f32,
    /// Units per tick of directed flight.
    pub speed: f32,
    /// Per-axis noise added to every flying step.
    pub flutter: f32,
    /// Chance a new flight target is the home bush.
    pub home_bias: f32,
    /// How far away a butterfly notices bushes other than its home.
    pub detection_radius: f32,
    /// Distance at which a flight target counts as reached.
    pub arrival_distance: f32,
    /// Chance of settling to rest on reaching a target.
    pub rest_chance: f32,
    /// Per-tick chance a resting butterfly takes off.
    pub wake_chance: f32,
    /// Chance that delivering foreign pollen actually pollinates.
    pub pollination_chance: f32,
    /// Meter gained by a bush on successful pollination.
    pub pollination_amount: f32,
    /// Hunger restored by every bush visit.
    pub visit_nutrition: f32,
    /// Spread of the aim point around a target bush's token.
    pub bush_aim_spread: f32,
    /// Radius range around the bush at which new butterflies appear.
    pub spawn_radius: (f32, f32),
}

impl Default for ButterflyParams {
    fn default() -> Self {
        Self {
            hunger_decay_per_tick: 0.1,
            speed: 2.0,
            flutter: 1.0,
            home_bias: 0.8,
            detection_radius: 200.0,
            arrival_distance: 5.0,
            rest_chance: 0.3,
            wake_chance: 0.1,
            pollination_chance: 0.1,
            pollination_amount: 10.0,
            visit_nutrition: 20.0,
            bush_aim_spread: 6.0,
            spawn_radius: (50.0, 150.0),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BushParams {
    pub meter_decay_per_tick: f32,
    /// Per-tick chance of spawning a butterfly while not in cooldown.
    pub spawn_chance: f32,
    /// Cooldown after each spawn, in milliseconds.
    pub cooldown_ms: (u64, u64),
}

impl Default for BushParams {
    fn default() -> Self {
        Self {
            meter_decay_per_tick: 0.02,
            spawn_chance: 0.01,
            cooldown_ms: (30_000, 60_000),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NestParams {
    /// Time from nest creation to hatching, in milliseconds.
    pub hatch_delay_ms: (u64, u64),
    /// Number of birds a hatching nest yields (inclusive range).
    pub hatchlings: (u64, u64),
    /// Hatchlings appear within this many units of the tree on each axis.
    pub hatch_spread: f32,
    /// Vertical offset of the nest token from its tree.
    pub offset_y: f32,
}

impl Default for NestParams {
    fn default() -> Self {
        Self {
            hatch_delay_ms: (120_000, 180_000),
            hatchlings: (2, 3),
            hatch_spread: 20.0,
            offset_y: -30.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WormParams {
    /// Delay before a new worm's first wiggle.
    pub first_wiggle_ms: (u64, u64),
    pub wiggle_duration_ms: u64,
    /// Rest between wiggles.
    pub wiggle_interval_ms: (u64, u64),
    /// Maximum horizontal displacement of a wiggle.
    pub wiggle_amplitude: f32,
}

impl Default for WormParams {
    fn default() -> Self {
        Self {
            first_wiggle_ms: (2_000, 5_000),
            wiggle_duration_ms: 500,
            wiggle_interval_ms: (2_000, 5_000),
            wiggle_amplitude: 5.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleParams {
    /// Delay between dropping a bush or tree and its inhabitants arriving.
    pub follow_up_delay_ms: (u64, u64),
    /// Butterflies that arrive at a newly dropped bush (inclusive range).
    pub drop_butterflies: (u64, u64),
}

impl Default for LifecycleParams {
    fn default() -> Self {
        Self {
            follow_up_delay_ms: (1_000, 4_000),
            drop_butterflies: (1, 2),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Frame delta used by `SimState::step` (fixed-delta driving).
    pub tick_duration_ms: u64,
    /// Width and height of the play area.
    pub play_area: (f32, f32),
    /// The y coordinate birds land on and walk along.
    pub ground_y: f32,
    /// Side length of every token's collision box.
    pub token_size: f32,
    /// How many messages the event feed keeps.
    pub event_log_capacity: usize,
    pub bird: BirdParams,
    pub butterfly: ButterflyParams,
    pub bush: BushParams,
    pub nest: NestParams,
    pub worm: WormParams,
    pub lifecycle: LifecycleParams,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms: 16,
            play_area: (800.0, 600.0),
            ground_y: 560.0,
            token_size: 20.0,
            event_log_capacity: 5,
            bird: BirdParams::default(),
            butterfly: ButterflyParams::default(),
            bush: BushParams::default(),
            nest: NestParams::default(),
            worm: WormParams::default(),
            lifecycle: LifecycleParams::default(),
        }
    }
}

impl GardenConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Largest x a token's anchor may take while staying on the play area.
    pub fn max_x(&self) -> f32 {
        self.play_area.0 - self.token_size
    }

    /// Largest y a token's anchor may take while staying on the play area.
    pub fn max_y(&self) -> f32 {
        self.play_area.1 - self.token_size
    }

    /// Check every invariant the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tick_duration_ms", self.tick_duration_ms as f32)?;
        positive("play_area.0", self.play_area.0)?;
        positive("play_area.1", self.play_area.1)?;
        positive("token_size", self.token_size)?;
        if self.token_size >= self.play_area.0.min(self.play_area.1) {
            return Err(invalid("token_size", "must be smaller than the play area"));
        }
        if !(0.0..=self.max_y()).contains(&self.ground_y) {
            return Err(invalid(
                "ground_y",
                format!("{} lies outside [0, {}]", self.ground_y, self.max_y()),
            ));
        }
        if self.event_log_capacity == 0 {
            return Err(invalid("event_log_capacity", "must keep at least one message"));
        }

        let bird = &self.bird;
        non_negative("bird.hunger_decay_per_tick", bird.hunger_decay_per_tick)?;
        meter("bird.descend_below_hunger", bird.descend_below_hunger)?;
        meter("bird.ascend_above_hunger", bird.ascend_above_hunger)?;
        if bird.descend_below_hunger >= bird.ascend_above_hunger {
            return Err(invalid(
                "bird.descend_below_hunger",
                "must be below bird.ascend_above_hunger",
            ));
        }
        positive("bird.flight_speed", bird.flight_speed)?;
        span("bird.diffusion_step", bird.diffusion_step)?;
        span("bird.walk_step", bird.walk_step)?;
        positive("bird.vertical_speed", bird.vertical_speed)?;
        non_negative("bird.perch_arrival_distance", bird.perch_arrival_distance)?;
        non_negative("bird.perch_jitter", bird.perch_jitter)?;
        probability("bird.resume_flying_chance", bird.resume_flying_chance)?;
        non_negative("bird.worm_nutrition", bird.worm_nutrition)?;
        non_negative("bird.butterfly_nutrition", bird.butterfly_nutrition)?;
        positive("bird.nest_food_threshold", bird.nest_food_threshold)?;

        let butterfly = &self.butterfly;
        non_negative("butterfly.hunger_decay_per_tick", butterfly.hunger_decay_per_tick)?;
        positive("butterfly.speed", butterfly.speed)?;
        non_negative("butterfly.flutter", butterfly.flutter)?;
        probability("butterfly.home_bias", butterfly.home_bias)?;
        non_negative("butterfly.detection_radius", butterfly.detection_radius)?;
        non_negative("butterfly.arrival_distance", butterfly.arrival_distance)?;
        probability("butterfly.rest_chance", butterfly.rest_chance)?;
        probability("butterfly.wake_chance", butterfly.wake_chance)?;
        probability("butterfly.pollination_chance", butterfly.pollination_chance)?;
        non_negative("butterfly.pollination_amount", butterfly.pollination_amount)?;
        non_negative("butterfly.visit_nutrition", butterfly.visit_nutrition)?;
        non_negative("butterfly.bush_aim_spread", butterfly.bush_aim_spread)?;
        span("butterfly.spawn_radius", butterfly.spawn_radius)?;

        non_negative("bush.meter_decay_per_tick", self.bush.meter_decay_per_tick)?;
        probability("bush.spawn_chance", self.bush.spawn_chance)?;
        ordered("bush.cooldown_ms", self.bush.cooldown_ms)?;

        ordered("nest.hatch_delay_ms", self.nest.hatch_delay_ms)?;
        brood("nest.hatchlings", self.nest.hatchlings)?;
        if self.nest.hatchlings.0 == 0 {
            return Err(invalid("nest.hatchlings", "a nest must yield at least one bird"));
        }
        non_negative("nest.hatch_spread", self.nest.hatch_spread)?;

        ordered("worm.first_wiggle_ms", self.worm.first_wiggle_ms)?;
        ordered("worm.wiggle_interval_ms", self.worm.wiggle_interval_ms)?;
        non_negative("worm.wiggle_amplitude", self.worm.wiggle_amplitude)?;

        ordered("lifecycle.follow_up_delay_ms", self.lifecycle.follow_up_delay_ms)?;
        brood("lifecycle.drop_butterflies", self.lifecycle.drop_butterflies)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be positive")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must not be negative")))
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not a probability")))
    }
}

fn meter(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=METER_MAX).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} lies outside [0, {METER_MAX}]")))
    }
}

fn span(field: &'static str, (low, high): (f32, f32)) -> Result<(), ConfigError> {
    if low >= 0.0 && low <= high {
        Ok(())
    } else {
        Err(invalid(field, format!("({low}, {high}) is not a valid range")))
    }
}

fn ordered(field: &'static str, (low, high): (u64, u64)) -> Result<(), ConfigError> {
    if low <= high {
        Ok(())
    } else {
        Err(invalid(field, format!("({low}, {high}) is inverted")))
    }
}

fn brood(field: &'static str, counts: (u64, u64)) -> Result<(), ConfigError> {
    ordered(field, counts)?;
    if counts.1 > MAX_BROOD {
        return Err(invalid(field, format!("{} exceeds {MAX_BROOD}", counts.1)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        GardenConfig::default().validate().unwrap();
    }

    #[test]
    fn default_config_survives_json() {
        let config = GardenConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored = GardenConfig::from_json(&json).unwrap();
        assert_eq!(config.tick_duration_ms, restored.tick_duration_ms);
        assert_eq!(config.play_area, restored.play_area);
        assert_eq!(config.nest.hatch_delay_ms, restored.nest.hatch_delay_ms);
        assert_eq!(
            config.bird.nest_food_threshold,
            restored.bird.nest_food_threshold
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{
            "tick_duration_ms": 33,
            "bush": { "spawn_chance": 0.05 },
            "nest": { "hatchlings": [3, 3] }
        }"#;
        let config = GardenConfig::from_json(json).unwrap();
        assert_eq!(config.tick_duration_ms, 33);
        assert_eq!(config.bush.spawn_chance, 0.05);
        assert_eq!(config.bush.cooldown_ms, (30_000, 60_000));
        assert_eq!(config.nest.hatchlings, (3, 3));
        assert_eq!(config.bird.worm_nutrition, 20.0);
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let json = r#"{ "butterfly": { "rest_chance": 1.5 } }"#;
        match GardenConfig::from_json(json) {
            Err(ConfigError::Invalid { field, .. }) => {
                assert_eq!(field, "butterfly.rest_chance")
            }
            other => panic!("expected invalid rest_chance, got {other:?}"),
        }
    }

    #[test]
    fn rejects_inverted_hatch_window() {
        let json = r#"{ "nest": { "hatch_delay_ms": [180000, 120000] } }"#;
        let err = GardenConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("nest.hatch_delay_ms"), "{err}");
    }

    #[test]
    fn rejects_crossed_hunger_thresholds() {
        let json = r#"{ "bird": { "descend_below_hunger": 80.0 } }"#;
        let err = GardenConfig::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "bird.descend_below_hunger",
                ..
            }
        ));
    }

    #[test]
    fn full_width_delay_ranges_are_accepted() {
        let json = r#"{ "bush": { "cooldown_ms": [0, 18446744073709551615] } }"#;
        let config = GardenConfig::from_json(json).unwrap();
        assert_eq!(config.bush.cooldown_ms, (0, u64::MAX));
    }

    #[test]
    fn rejects_oversized_brood() {
        let json = r#"{ "nest": { "hatchlings": [2, 1000000] } }"#;
        let err = GardenConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("nest.hatchlings"), "{err}");
    }

    #[test]
    fn rejects_ground_below_play_area() {
        let json = r#"{ "ground_y": 900.0 }"#;
        assert!(GardenConfig::from_json(json).is_err());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            GardenConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GardenConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
