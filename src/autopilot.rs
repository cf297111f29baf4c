//! Scripted player for headless runs
//!
//! Leads the soonest-reachable bird, adds a little aim noise so misses
//! still happen, and fires after a short reaction delay.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::platform::InputEvent;
use crate::sim::{GameSession, Target};

/// Autopilot tuning
#[derive(Debug, Clone, Copy)]
pub struct AutopilotConfig {
    /// Max aim error either side (radians)
    pub aim_jitter: f32,
    /// Frames to wait after re-arming before firing
    pub reaction_frames: u32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            aim_jitter: 0.06,
            reaction_frames: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Autopilot {
    config: AutopilotConfig,
    rng: Pcg32,
    idle_frames: u32,
}

impl Autopilot {
    pub fn new(seed: u64, config: AutopilotConfig) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            idle_frames: 0,
        }
    }

    /// Input events for the coming tick
    pub fn next_events(&mut self, session: &GameSession) -> Vec<InputEvent> {
        let fish = &session.projectile;
        if fish.launched {
            self.idle_frames = 0;
            return Vec::new();
        }
        self.idle_frames += 1;

        let speed = session.settings.launch_speed;
        let Some(aim) = session
            .targets
            .iter()
            .filter_map(|b| intercept(fish.origin, speed, b).map(|k| (k, b)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(k, b)| b.pos + b.vel * k)
            .filter(|p| p.x > 0.0 && p.x < session.width && p.y > 0.0)
        else {
            return Vec::new();
        };

        let jitter = if self.config.aim_jitter > 0.0 {
            self.rng
                .random_range(-self.config.aim_jitter..self.config.aim_jitter)
        } else {
            0.0
        };
        let offset = aim - fish.origin;
        let angle = crate::aim_angle(aim, fish.origin) + jitter;
        let cursor = fish.origin + Vec2::from_angle(angle) * offset.length();

        if self.idle_frames > self.config.reaction_frames {
            vec![InputEvent::PointerPressed(cursor)]
        } else {
            vec![InputEvent::PointerMoved(cursor)]
        }
    }
}

/// Frames until a fish launched from `origin` at `speed` can meet `bird`
/// (ignoring any bob), if it can at all
pub fn intercept(origin: Vec2, speed: f32, bird: &Target) -> Option<f32> {
    let d = bird.pos - origin;
    let v = bird.vel;
    let a = v.dot(v) - speed * speed;
    let b = 2.0 * d.dot(v);
    let c = d.dot(d);

    if a.abs() < 1e-6 {
        if b.abs() < 1e-6 {
            return None;
        }
        let k = -c / b;
        return (k > 0.0).then_some(k);
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    let (k1, k2) = ((-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a));
    let (lo, hi) = if k1 < k2 { (k1, k2) } else { (k2, k1) };
    if lo > 0.0 {
        Some(lo)
    } else if hi > 0.0 {
        Some(hi)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::consts::SIM_DT;
    use crate::platform::InputState;
    use crate::sim::{TargetBehavior, tick};

    #[test]
    fn test_intercept_stationary_bird() {
        let mut bird = Target::new(
            1,
            0.0,
            Vec2::new(0.0, 0.0),
            0.0,
            80.0,
            TargetBehavior::Glide,
            20,
        );
        bird.vel = Vec2::ZERO;
        let k = intercept(Vec2::new(0.0, 80.0), 8.0, &bird).unwrap();
        assert!((k - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_intercept_meets_moving_bird() {
        let bird = Target::new(
            1,
            0.0,
            Vec2::new(0.0, 100.0),
            4.0,
            80.0,
            TargetBehavior::Glide,
            20,
        );
        let origin = Vec2::new(400.0, 550.0);
        let k = intercept(origin, 8.0, &bird).unwrap();
        let bird_at = bird.pos + bird.vel * k;
        assert!(((bird_at - origin).length() - 8.0 * k).abs() < 0.01);
    }

    #[test]
    fn test_idle_without_birds() {
        let session = GameSession::with_seed(1);
        let mut pilot = Autopilot::new(1, AutopilotConfig::default());
        assert!(pilot.next_events(&session).is_empty());
    }

    #[test]
    fn test_autopilot_plays_a_session() {
        let settings = Settings {
            spawn_probability: 0.2,
            ..Default::default()
        };
        let mut session = GameSession::new(8, settings, 1280.0, 720.0);
        let mut pilot = Autopilot::new(8, AutopilotConfig::default());
        let mut input = InputState::new();
        for _ in 0..(60 * 60) {
            for event in pilot.next_events(&session) {
                input.handle(event);
            }
            tick(&mut session, input.tick_input(), SIM_DT);
            input.clear_one_shots();
        }
        assert!(session.score.shots > 0);
        assert!(session.score.hits > 0);
        assert_eq!(session.recorder.trials().count() as u32, session.score.shots);
    }
}
