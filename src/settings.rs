//! Game settings and balance
//!
//! Every tuning value the simulation reads lives here. Defaults match
//! `crate::consts`; a JSON file can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Failure to read a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game balance and control settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Fish ===
    pub fish_size: f32,
    /// Pixels per frame
    pub launch_speed: f32,
    /// Keyboard aim increment (radians)
    pub aim_step: f32,
    /// Allow the horizontal wrap-around launch from the bottom of the screen
    pub dodge_mode: bool,
    /// Fraction of screen height (from the bottom) that triggers dodge mode
    pub dodge_zone_fraction: f32,

    // === Birds ===
    /// Starting bird size
    pub bird_size: f32,
    pub bird_size_min: f32,
    pub bird_size_max: f32,
    pub bird_speed_min: f32,
    /// Starting ceiling for bird speed
    pub bird_speed_max: f32,
    /// The speed ceiling itself moves inside [floor, ceiling]
    pub bird_speed_max_floor: f32,
    pub bird_speed_max_ceiling: f32,
    pub max_bird_count: usize,
    pub spawn_probability: f32,
    pub spawn_cooldown_frames: u32,
    /// Chance a new bird bobs vertically
    pub bob_chance: f32,
    pub bob_amplitude_min: f32,
    pub bob_amplitude_max: f32,

    // === Scoring ===
    pub reward_for_catch: i64,
    pub penalty_for_miss: i64,
    pub progress_step: i32,
    pub size_step: f32,
    pub speed_step: f32,

    // === HUD ===
    pub hit_marker_duration_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fish_size: FISH_SIZE,
            launch_speed: LAUNCH_SPEED,
            aim_step: AIM_STEP,
            dodge_mode: true,
            dodge_zone_fraction: DODGE_ZONE_FRACTION,

            bird_size: BIRD_SIZE,
            bird_size_min: BIRD_SIZE_MIN,
            bird_size_max: BIRD_SIZE_MAX,
            bird_speed_min: BIRD_SPEED_MIN,
            bird_speed_max: BIRD_SPEED_MAX,
            bird_speed_max_floor: BIRD_SPEED_MAX_RANGE.0,
            bird_speed_max_ceiling: BIRD_SPEED_MAX_RANGE.1,
            max_bird_count: MAX_BIRD_COUNT,
            spawn_probability: SPAWN_PROBABILITY,
            spawn_cooldown_frames: SPAWN_COOLDOWN_FRAMES,
            bob_chance: BOB_CHANCE,
            bob_amplitude_min: BOB_AMPLITUDE_RANGE.0,
            bob_amplitude_max: BOB_AMPLITUDE_RANGE.1,

            reward_for_catch: REWARD_FOR_CATCH,
            penalty_for_miss: PENALTY_FOR_MISS,
            progress_step: PROGRESS_STEP,
            size_step: SIZE_STEP,
            speed_step: SPEED_STEP,

            hit_marker_duration_ms: HIT_MARKER_DURATION_MS,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings.sanitized())
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Normalise out-of-range values instead of rejecting them
    pub fn sanitized(mut self) -> Self {
        if self.bird_size_min > self.bird_size_max {
            std::mem::swap(&mut self.bird_size_min, &mut self.bird_size_max);
        }
        self.bird_size_min = self.bird_size_min.max(1.0);
        self.bird_size_max = self.bird_size_max.max(self.bird_size_min);
        self.bird_size = self.bird_size.clamp(self.bird_size_min, self.bird_size_max);

        if self.bird_speed_max_floor > self.bird_speed_max_ceiling {
            std::mem::swap(
                &mut self.bird_speed_max_floor,
                &mut self.bird_speed_max_ceiling,
            );
        }
        self.bird_speed_min = self.bird_speed_min.max(0.0);
        self.bird_speed_max_floor = self.bird_speed_max_floor.max(self.bird_speed_min);
        self.bird_speed_max_ceiling = self.bird_speed_max_ceiling.max(self.bird_speed_max_floor);
        self.bird_speed_max = self
            .bird_speed_max
            .clamp(self.bird_speed_max_floor, self.bird_speed_max_ceiling);

        if self.bob_amplitude_min > self.bob_amplitude_max {
            std::mem::swap(&mut self.bob_amplitude_min, &mut self.bob_amplitude_max);
        }

        self.spawn_probability = self.spawn_probability.clamp(0.0, 1.0);
        self.bob_chance = self.bob_chance.clamp(0.0, 1.0);
        self.dodge_zone_fraction = self.dodge_zone_fraction.clamp(0.0, 1.0);
        self.progress_step = self.progress_step.max(1);
        self.size_step = self.size_step.abs();
        self.speed_step = self.speed_step.abs();
        self.launch_speed = self.launch_speed.abs();
        self.hit_marker_duration_ms = self.hit_marker_duration_ms.max(0.0);
        self
    }
}
