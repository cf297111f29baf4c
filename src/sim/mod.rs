//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Per-frame kinematics, the tick's `dt` only drives the session clock
//! - Seeded RNG only
//! - Stable iteration order (birds kept in spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod scoring;
pub mod state;
pub mod tick;
pub mod trial;

pub use collision::{bird_offscreen, fish_hits_bird, fish_offscreen, nearest_bird};
pub use scoring::{Difficulty, DifficultyStep, HitOutcome, Score};
pub use state::{
    Dodge, FlapAnimation, GameEvent, GameSession, HitMarker, Projectile, Target, TargetBehavior,
};
pub use tick::{TickInput, tick};
pub use trial::{LaunchContext, LogEntry, RECORD_VERSION, TargetRecord, TrialRecord, TrialRecorder};
