//! Read-only view of a session for the renderer and HUD
//!
//! Rendering is a pure consumer: it gets a [`FrameView`] each frame and
//! never touches simulation state.

use glam::Vec2;
use serde::Serialize;

use crate::consts::HIT_MARKER_SIZE;
use crate::sim::GameSession;

/// Birds are drawn larger than their hit radius
const BIRD_DRAW_SCALE: f32 = 1.5;

/// A sprite to draw centered at `pos`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpriteView {
    pub pos: Vec2,
    pub size: f32,
    /// Radians
    pub rotation: f32,
    /// Flip horizontally
    pub mirrored: bool,
    /// Animation frame
    pub frame: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub pos: Vec2,
    pub size: f32,
    pub text: String,
    pub positive: bool,
}

/// Score line at the top of the screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudView {
    pub score: i64,
    pub level: i32,
    pub streak: i32,
}

impl HudView {
    pub fn lines(&self) -> [String; 3] {
        [
            format!("Score: {}", self.score),
            format!("Difficulty: {}", self.level),
            format!("Streak: {}", self.streak),
        ]
    }
}

/// Optional stats overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsView {
    pub shots: u32,
    pub hits: u32,
    pub accuracy: Option<f32>,
    pub mean_hit_speed: Option<f32>,
    pub mean_hit_height: Option<f32>,
    pub bird_size: f32,
    pub bird_max_speed: f32,
    pub progress: i32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub fish: SpriteView,
    pub birds: Vec<SpriteView>,
    pub markers: Vec<MarkerView>,
    pub hud: HudView,
    pub stats: Option<StatsView>,
}

impl FrameView {
    pub fn capture(session: &GameSession, show_stats: bool) -> Self {
        let fish = &session.projectile;
        let score = &session.score;

        let birds = session
            .targets
            .iter()
            .map(|b| SpriteView {
                pos: b.pos,
                size: b.size * BIRD_DRAW_SCALE,
                rotation: 0.0,
                mirrored: b.facing_left(),
                frame: b.flap.frame,
            })
            .collect();

        let markers = session
            .markers
            .iter()
            .map(|m| MarkerView {
                pos: m.pos,
                size: HIT_MARKER_SIZE,
                text: format!("{:+}", m.value),
                positive: m.value >= 0,
            })
            .collect();

        let stats = show_stats.then(|| StatsView {
            shots: score.shots,
            hits: score.hits,
            accuracy: score.accuracy(),
            mean_hit_speed: score.mean_hit_speed(),
            mean_hit_height: score.mean_hit_height(),
            bird_size: session.difficulty.size,
            bird_max_speed: session.difficulty.max_speed,
            progress: score.progress,
        });

        Self {
            fish: SpriteView {
                pos: fish.pos,
                size: fish.size,
                // Sprite art faces left
                rotation: session.launch_angle - std::f32::consts::PI,
                mirrored: false,
                frame: 0,
            },
            birds,
            markers,
            hud: HudView {
                score: score.score,
                level: session.difficulty.level(),
                streak: score.streak_display(),
            },
            stats,
        }
    }
}
