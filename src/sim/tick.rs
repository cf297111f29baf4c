//! Fixed timestep simulation tick
//!
//! One call advances every bird, the fish, the markers, the spawner and the
//! difficulty controller by exactly one frame. Nothing yields mid-tick.

use glam::Vec2;
use rand::Rng;

use super::collision::{bird_offscreen, fish_hits_bird, fish_offscreen};
use super::scoring::DifficultyStep;
use super::state::{GameEvent, GameSession, HitMarker};
use super::trial::LaunchContext;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Pointer position, if it moved
    pub cursor: Option<Vec2>,
    /// Keyboard aim nudges (negative = counter-clockwise)
    pub aim_steps: i32,
    /// Launch the fish (click/tap/space)
    pub launch: bool,
    /// Where the pointer was pressed, for pointer launches only
    pub launch_at: Option<Vec2>,
}

impl TickInput {
    /// Pointer press at `pos`: aims there and launches
    pub fn press(pos: Vec2) -> Self {
        Self {
            cursor: Some(pos),
            launch: true,
            launch_at: Some(pos),
            ..Default::default()
        }
    }
}

/// Advance the session by one frame; `dt` only drives the session clock
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) {
    session.events.clear();
    session.frame += 1;
    session.elapsed_ms += f64::from(dt) * 1000.0;

    apply_aim(session, input);
    if input.launch {
        launch(session, input.launch_at);
    }

    update_birds(session);
    update_fish(session);

    let now = session.elapsed_ms;
    session.markers.retain(|m| !m.is_expired(now));

    roll_spawn(session);
    adjust_difficulty(session);
}

fn apply_aim(session: &mut GameSession, input: &TickInput) {
    if let Some(cursor) = input.cursor {
        session.aim_at(cursor);
    }
    if input.aim_steps != 0 && !session.projectile.launched {
        session.launch_angle += input.aim_steps as f32 * session.settings.aim_step;
    }
}

/// Launch from the current aim; no-op while the fish is in flight.
/// Only a pointer press inside the bottom band starts a dodge.
fn launch(session: &mut GameSession, pressed_at: Option<Vec2>) {
    if session.projectile.launched {
        return;
    }
    let speed = session.settings.launch_speed;
    let dodge_x = pressed_at
        .filter(|pos| session.in_dodge_zone(*pos))
        .map(|pos| pos.x);
    let dodge = dodge_x.is_some();

    if let Some(target_x) = dodge_x {
        session.launch_angle = session.projectile.dodge_angle(target_x);
        session.projectile.launch_dodge(target_x, speed);
    } else {
        session.projectile.launch(session.launch_angle, speed);
    }

    let trial_index = session.recorder.start(LaunchContext {
        time_ms: session.elapsed_ms,
        score: session.score.score,
        streak: session.score.streak,
        level: session.difficulty.level(),
        cursor: session.cursor,
        projectile: &session.projectile,
        launch_angle: session.launch_angle,
        launch_speed: speed,
        targets: &session.targets,
    });

    log::debug!(
        "Trial {} launched at {:.3} rad (dodge: {})",
        trial_index,
        session.launch_angle,
        dodge
    );
    session.events.push(GameEvent::Launched {
        trial_index,
        angle: session.launch_angle,
        dodge,
    });
}

/// Move every bird, retire the ones that left, and check for a catch.
/// Reverse order keeps removal by index safe.
fn update_birds(session: &mut GameSession) {
    let now = session.elapsed_ms;
    for i in (0..session.targets.len()).rev() {
        let (index, pos) = {
            let bird = &mut session.targets[i];
            bird.update(now);
            bird.animate();
            (bird.index, bird.pos)
        };

        if bird_offscreen(pos, session.width, session.height) {
            session.remove_target(i, false);
            session.events.push(GameEvent::BirdEscaped { index });
            log::debug!("Bird {} left the screen", index);
            continue;
        }

        if session.projectile.launched
            && fish_hits_bird(session.projectile.pos, pos, session.difficulty.size)
        {
            catch_bird(session, i);
        }
    }
}

fn catch_bird(session: &mut GameSession, i: usize) {
    let (index, pos, speed) = {
        let bird = &session.targets[i];
        (bird.index, bird.pos, bird.speed)
    };
    let now = session.elapsed_ms;

    let reward = session
        .score
        .catch(speed, session.settings.bird_speed_min, pos.y / session.height);
    session.recorder.end(now, true, Some(index));
    session.markers.push(HitMarker::new(
        pos,
        now,
        session.settings.hit_marker_duration_ms,
        reward,
    ));
    session.remove_target(i, true);
    session.projectile.reset();

    log::info!(
        "Caught bird {} (+{}) score={} streak={}",
        index,
        reward,
        session.score.score,
        session.score.streak
    );
    session.events.push(GameEvent::BirdCaught { index, reward });
}

fn update_fish(session: &mut GameSession) {
    if !session.projectile.launched {
        return;
    }
    session.projectile.update(session.width);
    session
        .recorder
        .update(session.projectile.pos, &session.targets);

    if session.projectile.dodge.is_some() {
        // Dodge launches re-arm without resolving the trial
        if session.projectile.dodge_resolved() {
            session.projectile.reset();
            session.events.push(GameEvent::DodgeResolved);
            log::debug!("Dodge reached its target");
        }
        return;
    }

    let pos = session.projectile.pos;
    if fish_offscreen(pos, session.width, session.height) {
        let now = session.elapsed_ms;
        let penalty = session.score.miss();
        let marker_pos = pos.clamp(Vec2::ZERO, Vec2::new(session.width, session.height));
        session.markers.push(HitMarker::new(
            marker_pos,
            now,
            session.settings.hit_marker_duration_ms,
            -penalty,
        ));
        session.projectile.reset();
        session.recorder.end(now, false, None);

        log::info!(
            "Missed (-{}) score={} streak={}",
            penalty,
            session.score.score,
            session.score.streak
        );
        session.events.push(GameEvent::Missed { penalty });
    }
}

/// Cooldown-gated spawn roll, capped by the concurrent bird limit
fn roll_spawn(session: &mut GameSession) {
    if session.spawn_cooldown == 0
        && session.rng.random::<f32>() < session.settings.spawn_probability
    {
        if session.targets.len() < session.settings.max_bird_count {
            let index = session.spawn_target();
            log::debug!("Spawned bird {}", index);
        }
        session.spawn_cooldown = session.settings.spawn_cooldown_frames;
    } else {
        session.spawn_cooldown = session.spawn_cooldown.saturating_sub(1);
    }
}

fn adjust_difficulty(session: &mut GameSession) {
    let Some(step) = session
        .difficulty
        .apply_progress(&mut session.score.progress)
    else {
        return;
    };
    let harder = step == DifficultyStep::Harder;
    log::info!(
        "Difficulty {}: bird size={} max speed={:.1} level={}",
        if harder { "up" } else { "down" },
        session.difficulty.size,
        session.difficulty.max_speed,
        session.difficulty.level()
    );
    session.events.push(GameEvent::DifficultyChanged {
        size: session.difficulty.size,
        max_speed: session.difficulty.max_speed,
        harder,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::consts::SIM_DT;
    use crate::sim::state::{Target, TargetBehavior};
    use crate::sim::trial::LogEntry;

    fn quiet_session() -> GameSession {
        // No random spawns so tests control the bird list
        let settings = Settings {
            spawn_probability: 0.0,
            ..Default::default()
        };
        GameSession::new(12345, settings, 800.0, 600.0)
    }

    fn place_bird(session: &mut GameSession, pos: Vec2, speed: f32) -> u32 {
        let index = session.next_target_index();
        session.targets.push(Target::new(
            index,
            session.elapsed_ms,
            pos,
            speed,
            session.difficulty.size,
            TargetBehavior::Glide,
            20,
        ));
        index
    }

    fn launch_toward(session: &mut GameSession, cursor: Vec2) {
        tick(session, &TickInput::press(cursor), SIM_DT);
    }

    #[test]
    fn test_launch_opens_trial() {
        let mut session = quiet_session();
        launch_toward(&mut session, Vec2::new(400.0, 0.0));
        assert!(session.projectile.launched);
        assert!(session.recorder.is_open());
        assert!(matches!(
            session.events[0],
            GameEvent::Launched { trial_index: 0, dodge: false, .. }
        ));
    }

    #[test]
    fn test_second_launch_is_noop() {
        let mut session = quiet_session();
        launch_toward(&mut session, Vec2::new(400.0, 0.0));
        let vel = session.projectile.vel;
        launch_toward(&mut session, Vec2::new(0.0, 0.0));
        assert_eq!(session.projectile.vel, vel);
        assert!(session.events.is_empty());
    }

    #[test]
    fn test_catch_scores_and_closes_trial() {
        let mut session = quiet_session();
        // Bird parked straight above the fish, moving slowly right
        let index = place_bird(&mut session, Vec2::new(400.0, 450.0), 4.0);
        launch_toward(&mut session, Vec2::new(400.0, 0.0));

        for _ in 0..20 {
            if !session.projectile.launched {
                break;
            }
            tick(&mut session, &TickInput::default(), SIM_DT);
        }

        assert_eq!(session.score.score, 11);
        assert_eq!(session.score.streak, 1);
        assert!(session.targets.is_empty());
        assert!(!session.projectile.launched);
        assert!(!session.recorder.is_open());
        assert_eq!(session.markers.len(), 1);
        assert_eq!(session.markers[0].value, 11);

        let trial = session.recorder.trials().next().unwrap();
        assert!(trial.was_success);
        assert_eq!(trial.bird_index_caught, Some(index));

        let bird = session.recorder.birds().next().unwrap();
        assert!(bird.caught);
        assert_eq!(bird.bird_index, index);
    }

    #[test]
    fn test_miss_penalizes_and_closes_trial() {
        let mut session = quiet_session();
        launch_toward(&mut session, Vec2::new(400.0, 0.0));
        for _ in 0..200 {
            tick(&mut session, &TickInput::default(), SIM_DT);
        }
        assert_eq!(session.score.score, -5);
        assert_eq!(session.score.streak, -1);
        assert!(!session.projectile.launched);

        let trial = session.recorder.trials().next().unwrap();
        assert!(!trial.was_success);
        assert!(trial.bird_index_caught.is_none());
        assert!(trial.time_end.unwrap() >= trial.time_start);
    }

    #[test]
    fn test_miss_marker_is_negative() {
        let mut session = quiet_session();
        launch_toward(&mut session, Vec2::new(400.0, 0.0));
        let mut saw_marker = false;
        for _ in 0..200 {
            tick(&mut session, &TickInput::default(), SIM_DT);
            if session.events.iter().any(|e| matches!(e, GameEvent::Missed { .. })) {
                assert_eq!(session.markers.last().unwrap().value, -5);
                saw_marker = true;
                break;
            }
        }
        assert!(saw_marker);
    }

    #[test]
    fn test_markers_expire_by_clock() {
        let mut session = quiet_session();
        session
            .markers
            .push(HitMarker::new(Vec2::ZERO, 0.0, 250.0, 10));
        // ~233ms in, still visible
        for _ in 0..14 {
            tick(&mut session, &TickInput::default(), SIM_DT);
        }
        assert_eq!(session.markers.len(), 1);
        for _ in 0..2 {
            tick(&mut session, &TickInput::default(), SIM_DT);
        }
        assert!(session.markers.is_empty());
    }

    #[test]
    fn test_bird_leaving_screen_is_archived() {
        let mut session = quiet_session();
        let index = place_bird(&mut session, Vec2::new(800.0, 100.0), 5.0);
        for _ in 0..200 {
            tick(&mut session, &TickInput::default(), SIM_DT);
        }
        assert!(session.targets.is_empty());
        let records: Vec<_> = session.recorder.birds().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bird_index, index);
        assert!(!records[0].caught);
        assert!(records[0].time_end >= records[0].time_start);
        assert!(records[0].end_pos_x < 0.0);
    }

    #[test]
    fn test_two_catches_tighten_difficulty() {
        let mut session = quiet_session();
        for _ in 0..2 {
            place_bird(&mut session, Vec2::new(400.0, 450.0), 3.0);
            launch_toward(&mut session, Vec2::new(400.0, 0.0));
            while session.projectile.launched {
                tick(&mut session, &TickInput::default(), SIM_DT);
            }
        }
        assert_eq!(session.score.streak, 2);
        assert_eq!(session.score.progress, 0);
        assert_eq!(session.difficulty.size, 78.0);
        assert!((session.difficulty.max_speed - 5.2).abs() < 1e-5);
    }

    #[test]
    fn test_keyboard_aim_steps() {
        let mut session = quiet_session();
        let before = session.launch_angle;
        let input = TickInput {
            aim_steps: -2,
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT);
        let expected = before - 2.0 * session.settings.aim_step;
        assert!((session.launch_angle - expected).abs() < 1e-6);
    }

    #[test]
    fn test_keyboard_launch_flies_along_aim() {
        // Pointer never moved, so the cursor still sits on the fish
        let mut session = GameSession::with_seed(5);
        let nudge = TickInput {
            aim_steps: -5,
            ..Default::default()
        };
        tick(&mut session, &nudge, SIM_DT);
        let aimed = session.launch_angle;

        let space = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut session, &space, SIM_DT);
        assert!(matches!(
            session.events[0],
            GameEvent::Launched { dodge: false, .. }
        ));
        assert!(!session.events.contains(&GameEvent::DodgeResolved));
        assert!(session.projectile.launched);
        assert!(session.projectile.dodge.is_none());
        assert_eq!(session.launch_angle, aimed);
        let heading = session.projectile.vel.y.atan2(session.projectile.vel.x);
        assert!((heading - aimed).abs() < 1e-4);
    }

    #[test]
    fn test_space_with_pointer_in_band_does_not_dodge() {
        let mut session = quiet_session();
        let hover = TickInput {
            cursor: Some(Vec2::new(200.0, 590.0)),
            launch: true,
            ..Default::default()
        };
        tick(&mut session, &hover, SIM_DT);
        assert!(session.projectile.launched);
        assert!(session.projectile.dodge.is_none());
    }

    #[test]
    fn test_small_fish_dodge_still_resolves() {
        // Step of 8 px is wider than the 4 px resolution window
        let settings = Settings {
            spawn_probability: 0.0,
            fish_size: 6.0,
            ..Default::default()
        };
        let mut session = GameSession::new(3, settings, 800.0, 600.0);
        launch_toward(&mut session, Vec2::new(203.0, 590.0));
        assert!(session.projectile.dodge.is_some());

        let mut resolved = false;
        for _ in 0..200 {
            tick(&mut session, &TickInput::default(), SIM_DT);
            if session.events.contains(&GameEvent::DodgeResolved) {
                resolved = true;
                break;
            }
        }
        assert!(resolved);
        assert!(!session.projectile.launched);
    }

    #[test]
    fn test_dodge_launch_rearms_without_closing_trial() {
        let mut session = quiet_session();
        // Bottom band, left of the fish
        launch_toward(&mut session, Vec2::new(200.0, 590.0));
        assert!(session.projectile.dodge.is_some());
        assert!(matches!(
            session.events[0],
            GameEvent::Launched { dodge: true, .. }
        ));
        assert!((session.launch_angle - std::f32::consts::PI).abs() < 1e-6);

        let mut resolved = false;
        for _ in 0..100 {
            tick(&mut session, &TickInput::default(), SIM_DT);
            if session.events.contains(&GameEvent::DodgeResolved) {
                resolved = true;
                break;
            }
        }
        assert!(resolved);
        assert!(!session.projectile.launched);
        assert_eq!(session.score.score, 0);
        assert_eq!(session.score.shots, 0);
        // Trial stays open and nothing was logged
        assert!(session.recorder.is_open());
        assert!(session.recorder.log().is_empty());
    }

    #[test]
    fn test_spawn_respects_cap_and_cooldown() {
        let settings = Settings {
            spawn_probability: 1.0,
            ..Default::default()
        };
        let mut session = GameSession::new(1, settings, 800.0, 600.0);
        tick(&mut session, &TickInput::default(), SIM_DT);
        assert_eq!(session.targets.len(), 1);
        assert_eq!(session.spawn_cooldown, 30);

        // Cooldown holds off the next roll
        for _ in 0..30 {
            tick(&mut session, &TickInput::default(), SIM_DT);
        }
        assert_eq!(session.targets.len(), 1);
        tick(&mut session, &TickInput::default(), SIM_DT);
        assert_eq!(session.targets.len(), 2);

        for _ in 0..100 {
            tick(&mut session, &TickInput::default(), SIM_DT);
            assert!(session.targets.len() <= 2);
        }
    }

    #[test]
    fn test_every_removed_bird_logged_once() {
        let settings = Settings {
            spawn_probability: 0.5,
            ..Default::default()
        };
        let mut session = GameSession::new(42, settings, 800.0, 600.0);
        let mut spawned = 0;
        for _ in 0..3000 {
            tick(&mut session, &TickInput::default(), SIM_DT);
            spawned += session
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::BirdSpawned { .. }))
                .count();
        }
        let logged: Vec<u32> = session
            .recorder
            .log()
            .iter()
            .filter_map(|e| match e {
                LogEntry::Bird(b) => Some(b.bird_index),
                LogEntry::Trial(_) => None,
            })
            .collect();
        assert_eq!(logged.len() + session.targets.len(), spawned);
        let mut unique = logged.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), logged.len());
    }

    #[test]
    fn test_determinism() {
        let mut a = GameSession::with_seed(99999);
        let mut b = GameSession::with_seed(99999);
        let inputs = [
            TickInput {
                cursor: Some(Vec2::new(300.0, 100.0)),
                ..Default::default()
            },
            TickInput {
                launch: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..400 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }
        assert_eq!(a.frame, b.frame);
        assert_eq!(a.score.score, b.score.score);
        assert_eq!(a.recorder.log(), b.recorder.log());
    }
}
