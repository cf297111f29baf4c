//! Game state and core simulation types
//!
//! Everything the frame loop mutates is owned by [`GameSession`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::scoring::{Difficulty, Score};
use super::trial::{TargetRecord, TrialRecorder};
use crate::consts::*;
use crate::{Settings, map_range};

/// Horizontal wrap-around launch state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dodge {
    /// X coordinate the fish is travelling toward
    pub target_x: f32,
    /// The fish has swept over `target_x` at some point in flight
    pub crossed: bool,
}

/// The player's fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub origin: Vec2,
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub size: f32,
    pub launched: bool,
    pub dodge: Option<Dodge>,
}

impl Projectile {
    pub fn new(origin: Vec2, size: f32) -> Self {
        Self {
            origin,
            pos: origin,
            vel: Vec2::ZERO,
            size,
            launched: false,
            dodge: None,
        }
    }

    /// Launch along `angle` at `speed`. Returns false (and changes nothing)
    /// if already in flight.
    pub fn launch(&mut self, angle: f32, speed: f32) -> bool {
        if self.launched {
            return false;
        }
        self.vel = Vec2::from_angle(angle) * speed;
        self.launched = true;
        true
    }

    /// Launch horizontally toward `target_x`, wrapping around the screen edges
    pub fn launch_dodge(&mut self, target_x: f32, speed: f32) -> bool {
        if !self.launch(self.dodge_angle(target_x), speed) {
            return false;
        }
        self.dodge = Some(Dodge {
            target_x,
            crossed: false,
        });
        true
    }

    /// Advance one frame
    pub fn update(&mut self, width: f32) {
        let prev_x = self.pos.x;
        self.pos += self.vel;
        if let Some(dodge) = self.dodge.as_mut() {
            dodge.crossed |= swept_over(prev_x, self.pos.x, dodge.target_x, width);
            if width > 0.0 {
                self.pos.x = self.pos.x.rem_euclid(width);
            }
        }
    }

    /// Dodge launch has arrived within a third of the fish size of its target,
    /// or stepped over it in a single frame
    pub fn dodge_resolved(&self) -> bool {
        self.dodge.is_some_and(|d| {
            d.crossed || (self.pos.x - d.target_x).abs() < self.size / 3.0
        })
    }

    /// Dodge launches fly straight left or right, toward `target_x`
    pub fn dodge_angle(&self, target_x: f32) -> f32 {
        if target_x >= self.pos.x {
            0.0
        } else {
            std::f32::consts::PI
        }
    }

    pub fn reset(&mut self) {
        self.pos = self.origin;
        self.vel = Vec2::ZERO;
        self.launched = false;
        self.dodge = None;
    }
}

/// Unwrapped segment `from..=to` covers `target` or one of its copies every
/// `width` pixels
fn swept_over(from: f32, to: f32, target: f32, width: f32) -> bool {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    if width <= 0.0 {
        return (lo..=hi).contains(&target);
    }
    lo + (target - lo).rem_euclid(width) <= hi
}

/// Per-variant vertical motion of a bird
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetBehavior {
    /// Straight horizontal flight
    Glide,
    /// Horizontal flight with a cosine bob
    Bob { amplitude: f32, phase: f32 },
}

impl TargetBehavior {
    /// Vertical displacement added this frame
    pub fn vertical_offset(&self, elapsed_secs: f32) -> f32 {
        match *self {
            TargetBehavior::Glide => 0.0,
            TargetBehavior::Bob { amplitude, phase } => amplitude * (elapsed_secs + phase).cos(),
        }
    }

    pub fn amplitude(&self) -> f32 {
        match *self {
            TargetBehavior::Glide => 0.0,
            TargetBehavior::Bob { amplitude, .. } => amplitude,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetBehavior::Glide => "glide",
            TargetBehavior::Bob { .. } => "bob",
        }
    }
}

/// Two-frame wing flap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlapAnimation {
    /// Sprite frame (0 or 1)
    pub frame: u8,
    pub counter: u32,
    /// Frames per flap
    pub period: u32,
}

impl FlapAnimation {
    pub fn new(period: u32) -> Self {
        Self {
            frame: 0,
            counter: 0,
            period,
        }
    }

    /// Flap period for a bird of `speed`: faster birds flap faster
    pub fn period_for_speed(speed: f32, speed_min: f32, speed_max: f32) -> u32 {
        map_range(speed, speed_min, speed_max, FLAP_FRAMES_SLOW, FLAP_FRAMES_FAST)
            .round()
            .max(1.0) as u32
    }

    pub fn advance(&mut self) {
        self.counter += 1;
        if self.counter > self.period {
            self.counter = 0;
            self.frame ^= 1;
        }
    }
}

/// A bird crossing the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Unique within a session, never reused
    pub index: u32,
    /// Session time at spawn (ms)
    pub spawn_ms: f64,
    pub start_pos: Vec2,
    pub pos: Vec2,
    pub vel: Vec2,
    pub speed: f32,
    pub size: f32,
    pub behavior: TargetBehavior,
    pub flap: FlapAnimation,
}

impl Target {
    /// Build a bird at an edge position; velocity points inward from that edge
    pub fn new(
        index: u32,
        spawn_ms: f64,
        pos: Vec2,
        speed: f32,
        size: f32,
        behavior: TargetBehavior,
        flap_period: u32,
    ) -> Self {
        let vx = if pos.x == 0.0 { speed } else { -speed };
        Self {
            index,
            spawn_ms,
            start_pos: pos,
            pos,
            vel: Vec2::new(vx, 0.0),
            speed,
            size,
            behavior,
            flap: FlapAnimation::new(flap_period),
        }
    }

    /// Roll a new bird at the left or right edge
    pub fn spawn(
        index: u32,
        spawn_ms: f64,
        rng: &mut Pcg32,
        settings: &Settings,
        difficulty: &Difficulty,
        width: f32,
        height: f32,
    ) -> Self {
        let size = difficulty.size;
        let x = if rng.random_bool(0.5) { 0.0 } else { width };
        let y = uniform(rng, size, height / 2.0 - BIRD_SPAWN_MARGIN);
        let speed = uniform(rng, settings.bird_speed_min, difficulty.max_speed);

        let behavior = if rng.random::<f32>() < settings.bob_chance {
            TargetBehavior::Bob {
                amplitude: uniform(rng, settings.bob_amplitude_min, settings.bob_amplitude_max),
                phase: uniform(rng, 0.0, std::f32::consts::TAU),
            }
        } else {
            TargetBehavior::Glide
        };

        let period =
            FlapAnimation::period_for_speed(speed, settings.bird_speed_min, difficulty.max_speed);
        Self::new(index, spawn_ms, Vec2::new(x, y), speed, size, behavior, period)
    }

    /// Advance one frame at session time `now_ms`
    pub fn update(&mut self, now_ms: f64) {
        self.pos += self.vel;
        let alive_secs = ((now_ms - self.spawn_ms) / 1000.0) as f32;
        self.pos.y += self.behavior.vertical_offset(alive_secs);
    }

    pub fn animate(&mut self) {
        self.flap.advance();
    }

    /// Sprite should be mirrored
    pub fn facing_left(&self) -> bool {
        self.vel.x < 0.0
    }
}

/// Uniform sample in `[lo, hi)`, collapsing to `lo` on an empty range
fn uniform(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Floating "+11" / "-5" text after a catch or miss
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitMarker {
    pub pos: Vec2,
    pub created_ms: f64,
    pub duration_ms: f64,
    /// Reward (positive) or penalty (negative)
    pub value: i64,
}

impl HitMarker {
    pub fn new(pos: Vec2, created_ms: f64, duration_ms: f64, value: i64) -> Self {
        Self {
            pos,
            created_ms,
            duration_ms,
            value,
        }
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_ms > self.duration_ms
    }
}

/// Things that happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Launched { trial_index: u32, angle: f32, dodge: bool },
    BirdSpawned { index: u32 },
    BirdCaught { index: u32, reward: i64 },
    BirdEscaped { index: u32 },
    Missed { penalty: i64 },
    DodgeResolved,
    DifficultyChanged { size: f32, max_speed: f32, harder: bool },
}

/// Complete session state, owned by the frame loop
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub settings: Settings,
    pub width: f32,
    pub height: f32,
    /// Simulation tick counter
    pub frame: u64,
    /// Session clock (ms since start)
    pub elapsed_ms: f64,
    pub projectile: Projectile,
    /// Current aim (radians, screen coordinates)
    pub launch_angle: f32,
    /// Last known pointer position
    pub cursor: Vec2,
    /// Active birds in spawn order
    pub targets: Vec<Target>,
    pub markers: Vec<HitMarker>,
    pub score: Score,
    pub difficulty: Difficulty,
    /// Frames until the next spawn roll
    pub spawn_cooldown: u32,
    pub recorder: TrialRecorder,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    last_target_index: u32,
}

impl GameSession {
    /// Create a new session with the given seed and screen size
    pub fn new(seed: u64, settings: Settings, width: f32, height: f32) -> Self {
        let settings = settings.sanitized();
        let origin = Vec2::new(width / 2.0, height - FISH_ORIGIN_OFFSET);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: Score::new(settings.reward_for_catch, settings.penalty_for_miss),
            difficulty: Difficulty::from_settings(&settings),
            projectile: Projectile::new(origin, settings.fish_size),
            settings,
            width,
            height,
            frame: 0,
            elapsed_ms: 0.0,
            launch_angle: 0.0,
            cursor: origin,
            targets: Vec::new(),
            markers: Vec::new(),
            spawn_cooldown: 0,
            recorder: TrialRecorder::new(),
            events: Vec::new(),
            last_target_index: 0,
        }
    }

    /// Default settings on the default screen
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Settings::default(), SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    /// Allocate the next bird index (starts at 1)
    pub fn next_target_index(&mut self) -> u32 {
        self.last_target_index += 1;
        self.last_target_index
    }

    /// Spawn a random bird and return its index
    pub fn spawn_target(&mut self) -> u32 {
        let index = self.next_target_index();
        let target = Target::spawn(
            index,
            self.elapsed_ms,
            &mut self.rng,
            &self.settings,
            &self.difficulty,
            self.width,
            self.height,
        );
        self.targets.push(target);
        self.events.push(GameEvent::BirdSpawned { index });
        index
    }

    /// Remove the bird at `i` and archive its terminal record
    pub fn remove_target(&mut self, i: usize, caught: bool) -> Target {
        let target = self.targets.remove(i);
        self.recorder
            .archive_target(TargetRecord::closing(&target, self.elapsed_ms, caught));
        target
    }

    /// Re-aim at the pointer; ignored while the fish is in flight
    pub fn aim_at(&mut self, cursor: Vec2) {
        self.cursor = cursor;
        if !self.projectile.launched {
            self.launch_angle = crate::aim_angle(cursor, self.projectile.pos);
        }
    }

    /// Cursor is inside the bottom band that triggers a dodge launch
    pub fn in_dodge_zone(&self, cursor: Vec2) -> bool {
        self.settings.dodge_mode
            && cursor.y >= self.height * (1.0 - self.settings.dodge_zone_fraction)
    }
}
