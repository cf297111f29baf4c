//! Score, streaks and the adaptive difficulty controller

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::HIT_HISTORY_LEN;
use crate::{Settings, constrain, map_range};

/// Speed and height of a caught bird
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitOutcome {
    pub speed: f32,
    /// Catch height as a fraction of screen height (0 = top)
    pub height: f32,
}

/// Running score and streak state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub reward_for_catch: i64,
    pub penalty_for_miss: i64,
    pub score: i64,
    /// Positive = consecutive catches, negative = consecutive misses
    pub streak: i32,
    /// Streak-direction accumulator consumed by [`Difficulty::apply_progress`]
    pub progress: i32,
    /// Resolved shots (catches + misses)
    pub shots: u32,
    pub hits: u32,
    /// Most recent catches, oldest first
    pub history: VecDeque<HitOutcome>,
}

impl Score {
    pub fn new(reward_for_catch: i64, penalty_for_miss: i64) -> Self {
        Self {
            reward_for_catch,
            penalty_for_miss,
            score: 0,
            streak: 0,
            progress: 0,
            shots: 0,
            hits: 0,
            history: VecDeque::with_capacity(HIT_HISTORY_LEN),
        }
    }

    /// Faster birds are worth more
    pub fn reward_for(&self, speed: f32, speed_min: f32) -> i64 {
        self.reward_for_catch + (speed - speed_min).floor() as i64
    }

    /// Record a catch and return the reward
    pub fn catch(&mut self, speed: f32, speed_min: f32, height: f32) -> i64 {
        let reward = self.reward_for(speed, speed_min);
        self.score += reward;
        if self.streak >= 0 {
            self.streak += 1;
            self.progress += 1;
        } else {
            self.streak = 1;
            self.progress = 1;
        }
        self.shots += 1;
        self.hits += 1;
        if self.history.len() == HIT_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(HitOutcome { speed, height });
        reward
    }

    /// Record a miss and return the penalty
    pub fn miss(&mut self) -> i64 {
        self.score -= self.penalty_for_miss;
        if self.streak <= 0 {
            self.streak -= 1;
            self.progress -= 1;
        } else {
            self.streak = -1;
            self.progress = -1;
        }
        self.shots += 1;
        self.penalty_for_miss
    }

    /// Streak as shown on the HUD (misses show as zero)
    pub fn streak_display(&self) -> i32 {
        self.streak.max(0)
    }

    pub fn accuracy(&self) -> Option<f32> {
        (self.shots > 0).then(|| self.hits as f32 / self.shots as f32)
    }

    pub fn mean_hit_speed(&self) -> Option<f32> {
        mean(self.history.iter().map(|h| h.speed))
    }

    pub fn mean_hit_height(&self) -> Option<f32> {
        mean(self.history.iter().map(|h| h.height))
    }
}

fn mean(values: impl ExactSizeIterator<Item = f32>) -> Option<f32> {
    let n = values.len();
    (n > 0).then(|| values.sum::<f32>() / n as f32)
}

/// Direction of a difficulty change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyStep {
    Harder,
    Easier,
}

/// Bird size and speed ceiling, nudged by the progress counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub size: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub max_speed: f32,
    pub max_speed_floor: f32,
    pub max_speed_ceiling: f32,
    pub size_step: f32,
    pub speed_step: f32,
    pub progress_step: i32,
}

impl Difficulty {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            size: settings.bird_size,
            size_min: settings.bird_size_min,
            size_max: settings.bird_size_max,
            max_speed: settings.bird_speed_max,
            max_speed_floor: settings.bird_speed_max_floor,
            max_speed_ceiling: settings.bird_speed_max_ceiling,
            size_step: settings.size_step,
            speed_step: settings.speed_step,
            progress_step: settings.progress_step,
        }
    }

    /// Step difficulty once `progress` reaches the threshold, resetting it.
    /// Parameters are clamped back into range either way.
    pub fn apply_progress(&mut self, progress: &mut i32) -> Option<DifficultyStep> {
        let step = if *progress >= self.progress_step {
            self.size -= self.size_step;
            self.max_speed += self.speed_step;
            *progress = 0;
            Some(DifficultyStep::Harder)
        } else if *progress <= -self.progress_step {
            self.size += self.size_step;
            self.max_speed -= self.speed_step;
            *progress = 0;
            Some(DifficultyStep::Easier)
        } else {
            None
        };
        self.size = constrain(self.size, self.size_min, self.size_max);
        self.max_speed = constrain(self.max_speed, self.max_speed_floor, self.max_speed_ceiling);
        step
    }

    /// HUD level: smaller birds map to a higher integer
    pub fn level(&self) -> i32 {
        let top = (self.size_max - self.size_min) / 2.0;
        map_range(-self.size, -self.size_max, -self.size_min, 0.0, top).round() as i32
    }
}
