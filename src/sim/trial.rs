//! Trial and bird telemetry
//!
//! One [`TrialRecord`] spans a single launch: opened on launch, refined every
//! frame while the fish is in flight, closed on a catch or a miss. Birds
//! leaving play append a [`TargetRecord`] to the same log.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::nearest_bird;
use super::state::{Projectile, Target};

/// Schema version stamped on every exported record
pub const RECORD_VERSION: u32 = 1;

/// Snapshot of one launch and its resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub version: u32,
    pub trial_index: u32,
    pub time_start: f64,

    // Session state before the launch
    pub score: i64,
    pub streak_length: i32,
    pub difficulty: i32,

    // Agent at launch
    pub agent_cursor_x: f32,
    pub agent_cursor_y: f32,
    pub agent_size: f32,
    pub agent_pos_x: f32,
    pub agent_pos_y: f32,
    pub launch_angle: f32,
    pub launch_speed: f32,
    pub dodge: bool,

    // First two birds at launch
    pub bird1_index: Option<u32>,
    pub bird1_pos_x: Option<f32>,
    pub bird1_pos_y: Option<f32>,
    pub bird1_speed: Option<f32>,
    pub bird1_size: Option<f32>,
    pub bird2_index: Option<u32>,
    pub bird2_pos_x: Option<f32>,
    pub bird2_pos_y: Option<f32>,
    pub bird2_speed: Option<f32>,
    pub bird2_size: Option<f32>,

    // Closest approach during flight
    pub closest_distance: Option<f32>,
    pub closest_agent_pos_x: Option<f32>,
    pub closest_agent_pos_y: Option<f32>,
    pub closest_bird_pos_x: Option<f32>,
    pub closest_bird_pos_y: Option<f32>,

    // Resolution
    pub time_end: Option<f64>,
    pub was_success: bool,
    pub bird_index_caught: Option<u32>,
}

/// Terminal record of a bird leaving play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub version: u32,
    pub bird_index: u32,
    pub time_start: f64,
    pub time_end: f64,
    pub start_pos_x: f32,
    pub start_pos_y: f32,
    pub end_pos_x: f32,
    pub end_pos_y: f32,
    pub speed: f32,
    pub size: f32,
    pub behavior: String,
    pub amplitude: f32,
    pub caught: bool,
}

impl TargetRecord {
    /// Close out `target` at session time `now_ms`
    pub fn closing(target: &Target, now_ms: f64, caught: bool) -> Self {
        Self {
            version: RECORD_VERSION,
            bird_index: target.index,
            time_start: target.spawn_ms,
            time_end: now_ms.max(target.spawn_ms),
            start_pos_x: target.start_pos.x,
            start_pos_y: target.start_pos.y,
            end_pos_x: target.pos.x,
            end_pos_y: target.pos.y,
            speed: target.speed,
            size: target.size,
            behavior: target.behavior.name().to_string(),
            amplitude: target.behavior.amplitude(),
            caught,
        }
    }
}

/// One entry of the exported session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum LogEntry {
    Trial(TrialRecord),
    Bird(TargetRecord),
}

/// Session state captured at the instant of launch
#[derive(Debug, Clone, Copy)]
pub struct LaunchContext<'a> {
    pub time_ms: f64,
    pub score: i64,
    pub streak: i32,
    pub level: i32,
    pub cursor: Vec2,
    pub projectile: &'a Projectile,
    pub launch_angle: f32,
    pub launch_speed: f32,
    pub targets: &'a [Target],
}

/// Holds the open trial and the append-only session log
#[derive(Debug, Clone, Default)]
pub struct TrialRecorder {
    next_index: u32,
    open: Option<TrialRecord>,
    log: Vec<LogEntry>,
}

impl TrialRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a trial for a launch and return its index.
    ///
    /// A trial still open from a dodge launch is replaced without being logged.
    pub fn start(&mut self, ctx: LaunchContext<'_>) -> u32 {
        let trial_index = self.next_index;
        self.next_index += 1;

        if let Some(stale) = self.open.take() {
            log::debug!("Dropping unresolved trial {}", stale.trial_index);
        }

        let bird = |i: usize| ctx.targets.get(i);
        let projectile = ctx.projectile;
        self.open = Some(TrialRecord {
            version: RECORD_VERSION,
            trial_index,
            time_start: ctx.time_ms,
            score: ctx.score,
            streak_length: ctx.streak,
            difficulty: ctx.level,
            agent_cursor_x: ctx.cursor.x,
            agent_cursor_y: ctx.cursor.y,
            agent_size: projectile.size,
            agent_pos_x: projectile.pos.x,
            agent_pos_y: projectile.pos.y,
            launch_angle: ctx.launch_angle,
            launch_speed: ctx.launch_speed,
            dodge: projectile.dodge.is_some(),
            bird1_index: bird(0).map(|b| b.index),
            bird1_pos_x: bird(0).map(|b| b.pos.x),
            bird1_pos_y: bird(0).map(|b| b.pos.y),
            bird1_speed: bird(0).map(|b| b.speed),
            bird1_size: bird(0).map(|b| b.size),
            bird2_index: bird(1).map(|b| b.index),
            bird2_pos_x: bird(1).map(|b| b.pos.x),
            bird2_pos_y: bird(1).map(|b| b.pos.y),
            bird2_speed: bird(1).map(|b| b.speed),
            bird2_size: bird(1).map(|b| b.size),
            closest_distance: None,
            closest_agent_pos_x: None,
            closest_agent_pos_y: None,
            closest_bird_pos_x: None,
            closest_bird_pos_y: None,
            time_end: None,
            was_success: false,
            bird_index_caught: None,
        });
        self.update(projectile.pos, ctx.targets);
        trial_index
    }

    /// Tighten the closest-approach fields of the open trial
    pub fn update(&mut self, agent_pos: Vec2, targets: &[Target]) {
        let Some(trial) = self.open.as_mut() else {
            return;
        };
        let Some((i, d)) = nearest_bird(agent_pos, targets) else {
            return;
        };
        if trial.closest_distance.is_none_or(|best| d < best) {
            let bird = targets[i].pos;
            trial.closest_distance = Some(d);
            trial.closest_agent_pos_x = Some(agent_pos.x);
            trial.closest_agent_pos_y = Some(agent_pos.y);
            trial.closest_bird_pos_x = Some(bird.x);
            trial.closest_bird_pos_y = Some(bird.y);
        }
    }

    /// Close the open trial and append it to the log.
    ///
    /// Returns the closed trial's index, or `None` if nothing was open.
    pub fn end(&mut self, time_ms: f64, success: bool, caught: Option<u32>) -> Option<u32> {
        let mut trial = self.open.take()?;
        trial.time_end = Some(time_ms);
        trial.was_success = success;
        trial.bird_index_caught = caught;
        let index = trial.trial_index;
        self.log.push(LogEntry::Trial(trial));
        Some(index)
    }

    pub fn archive_target(&mut self, record: TargetRecord) {
        self.log.push(LogEntry::Bird(record));
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_trial(&self) -> Option<&TrialRecord> {
        self.open.as_ref()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn trials(&self) -> impl Iterator<Item = &TrialRecord> {
        self.log.iter().filter_map(|e| match e {
            LogEntry::Trial(t) => Some(t),
            LogEntry::Bird(_) => None,
        })
    }

    pub fn birds(&self) -> impl Iterator<Item = &TargetRecord> {
        self.log.iter().filter_map(|e| match e {
            LogEntry::Bird(b) => Some(b),
            LogEntry::Trial(_) => None,
        })
    }
}
