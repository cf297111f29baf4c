//! Fish Launch - an aim-and-intercept arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, scoring, trial log)
//! - `platform`: Input boundary (pointer/keyboard events to tick input)
//! - `persistence`: Session log export
//! - `settings`: Data-driven game balance
//! - `ui`: Read-only render/HUD view

pub mod autopilot;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod ui;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, kinematics are per-frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default screen dimensions
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// Fish (projectile)
    pub const FISH_SIZE: f32 = 100.0;
    /// Launch point sits this far above the bottom edge
    pub const FISH_ORIGIN_OFFSET: f32 = 50.0;
    /// Pixels per frame
    pub const LAUNCH_SPEED: f32 = 8.0;
    /// Keyboard aim increment (radians)
    pub const AIM_STEP: f32 = std::f32::consts::PI / 30.0;
    /// Launches from the bottom 20% of the screen use dodge mode
    pub const DODGE_ZONE_FRACTION: f32 = 0.2;

    /// Birds (targets)
    pub const BIRD_SIZE: f32 = 80.0;
    pub const BIRD_SIZE_MIN: f32 = 30.0;
    pub const BIRD_SIZE_MAX: f32 = 80.0;
    pub const BIRD_SPEED_MIN: f32 = 3.0;
    pub const BIRD_SPEED_MAX: f32 = 5.0;
    pub const BIRD_SPEED_MAX_RANGE: (f32, f32) = (5.0, 9.0);
    pub const MAX_BIRD_COUNT: usize = 2;
    /// Vertical slack before a bird counts as offscreen
    pub const BIRD_VERTICAL_SLACK: f32 = 200.0;
    /// Spawn band stops this far above the screen midline
    pub const BIRD_SPAWN_MARGIN: f32 = 50.0;
    pub const SPAWN_PROBABILITY: f32 = 0.01;
    pub const SPAWN_COOLDOWN_FRAMES: u32 = 30;
    /// Wing flap period (frames) for the slowest and fastest birds
    pub const FLAP_FRAMES_SLOW: f32 = 25.0;
    pub const FLAP_FRAMES_FAST: f32 = 15.0;
    /// Oscillating birds bob with an amplitude in this range
    pub const BOB_AMPLITUDE_RANGE: (f32, f32) = (1.0, 3.0);
    pub const BOB_CHANCE: f32 = 0.5;

    /// Scoring
    pub const REWARD_FOR_CATCH: i64 = 10;
    pub const PENALTY_FOR_MISS: i64 = 5;
    /// Progress magnitude that triggers a difficulty step
    pub const PROGRESS_STEP: i32 = 2;
    pub const SIZE_STEP: f32 = 2.0;
    pub const SPEED_STEP: f32 = 0.2;
    /// Hits remembered for the stats overlay
    pub const HIT_HISTORY_LEN: usize = 20;

    /// Hit/miss markers
    pub const HIT_MARKER_DURATION_MS: f64 = 250.0;
    pub const HIT_MARKER_SIZE: f32 = 50.0;
}

/// Linearly re-map `value` from `[in_lo, in_hi]` onto `[out_lo, out_hi]`.
///
/// A degenerate input range maps everything to `out_lo`.
#[inline]
pub fn map_range(value: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let span = in_hi - in_lo;
    if span.abs() < f32::EPSILON {
        return out_lo;
    }
    out_lo + (value - in_lo) / span * (out_hi - out_lo)
}

/// Clamp without panicking on an inverted range (lower bound wins)
#[inline]
pub fn constrain(value: f32, lo: f32, hi: f32) -> f32 {
    value.min(hi).max(lo)
}

/// Aim angle from the launch point toward the cursor (screen coordinates, y down)
#[inline]
pub fn aim_angle(cursor: Vec2, origin: Vec2) -> f32 {
    let d = cursor - origin;
    d.y.atan2(d.x)
}
