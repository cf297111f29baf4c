//! Hit tests and screen-bounds checks
//!
//! Birds and the fish are treated as points; a catch is a center-to-center
//! distance under the current bird size.

use glam::Vec2;

use super::state::Target;
use crate::consts::BIRD_VERTICAL_SLACK;

/// Fish at `fish_pos` catches a bird at `bird_pos`
#[inline]
pub fn fish_hits_bird(fish_pos: Vec2, bird_pos: Vec2, bird_size: f32) -> bool {
    fish_pos.distance(bird_pos) < bird_size
}

/// Fish has left the screen
#[inline]
pub fn fish_offscreen(pos: Vec2, width: f32, height: f32) -> bool {
    pos.x < 0.0 || pos.x > width || pos.y < 0.0 || pos.y > height
}

/// Bird has left the screen horizontally or drifted well past the top/bottom
#[inline]
pub fn bird_offscreen(pos: Vec2, width: f32, height: f32) -> bool {
    pos.x < 0.0
        || pos.x > width
        || pos.y < -BIRD_VERTICAL_SLACK
        || pos.y > height + BIRD_VERTICAL_SLACK
}

/// Index and distance of the bird closest to `pos`
pub fn nearest_bird(pos: Vec2, birds: &[Target]) -> Option<(usize, f32)> {
    birds
        .iter()
        .enumerate()
        .map(|(i, b)| (i, pos.distance(b.pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::TargetBehavior;

    #[test]
    fn test_hit_strictly_inside_size() {
        let bird = Vec2::new(100.0, 100.0);
        assert!(fish_hits_bird(Vec2::new(150.0, 100.0), bird, 80.0));
        assert!(!fish_hits_bird(Vec2::new(180.0, 100.0), bird, 80.0));
        assert!(!fish_hits_bird(Vec2::new(181.0, 100.0), bird, 80.0));
    }

    #[test]
    fn test_fish_offscreen() {
        assert!(!fish_offscreen(Vec2::new(10.0, 10.0), 800.0, 600.0));
        assert!(fish_offscreen(Vec2::new(10.0, -0.1), 800.0, 600.0));
        assert!(fish_offscreen(Vec2::new(800.1, 10.0), 800.0, 600.0));
    }

    #[test]
    fn test_bird_vertical_slack() {
        assert!(!bird_offscreen(Vec2::new(10.0, -150.0), 800.0, 600.0));
        assert!(bird_offscreen(Vec2::new(10.0, -201.0), 800.0, 600.0));
        assert!(!bird_offscreen(Vec2::new(10.0, 790.0), 800.0, 600.0));
        assert!(bird_offscreen(Vec2::new(-1.0, 100.0), 800.0, 600.0));
        // Spawn edges count as on screen
        assert!(!bird_offscreen(Vec2::new(0.0, 100.0), 800.0, 600.0));
        assert!(!bird_offscreen(Vec2::new(800.0, 100.0), 800.0, 600.0));
    }

    #[test]
    fn test_nearest_bird() {
        let birds = [
            Target::new(1, 0.0, Vec2::new(0.0, 0.0), 3.0, 80.0, TargetBehavior::Glide, 20),
            Target::new(2, 0.0, Vec2::new(800.0, 0.0), 3.0, 80.0, TargetBehavior::Glide, 20),
        ];
        let (i, d) = nearest_bird(Vec2::new(700.0, 0.0), &birds).unwrap();
        assert_eq!(i, 1);
        assert_eq!(d, 100.0);
        assert!(nearest_bird(Vec2::ZERO, &[]).is_none());
    }
}
