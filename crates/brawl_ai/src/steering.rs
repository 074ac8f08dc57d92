//! Steering behaviors
//!
//! All steering happens on the ground plane; the Y component of every
//! output is zero.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Blend weights for pursuit steering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringWeights {
    pub seek: f32,
    pub separation: f32,
    /// Scale of the random wobble
    pub jitter: f32,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self {
            seek: 1.0,
            separation: 1.5,
            jitter: 0.1,
        }
    }
}

/// Output of one steering evaluation, kept in parts so callers can
/// inspect each contribution
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Unit direction toward the goal
    pub seek: Vec3,
    /// Summed repulsion from nearby neighbors
    pub separation: Vec3,
    /// Random wobble
    pub jitter: Vec3,
}

impl SteeringOutput {
    /// Weighted sum of the parts, normalized. Zero if the parts cancel out.
    pub fn direction(&self, weights: &SteeringWeights) -> Vec3 {
        let sum = self.seek * weights.seek
            + self.separation * weights.separation
            + self.jitter * weights.jitter;
        flatten(sum).normalize_or_zero()
    }
}

/// Unit horizontal direction from `position` to `target`
pub fn seek(position: Vec3, target: Vec3) -> Vec3 {
    flatten(target - position).normalize_or_zero()
}

/// Closest spacing separation treats two NPCs as having
const MIN_SPACING: f32 = 0.05;

/// Repulsion away from every neighbor closer than `radius`. Each neighbor
/// contributes a push of magnitude `1 / distance`, so closer neighbors push
/// harder. A neighbor at the exact same spot pushes at full strength along
/// a direction drawn from `rng`.
pub fn separation<R: Rng + ?Sized>(
    position: Vec3,
    neighbors: &[Vec3],
    radius: f32,
    rng: &mut R,
) -> Vec3 {
    let mut force = Vec3::ZERO;
    for &other in neighbors {
        let away = flatten(position - other);
        let distance = away.length();
        if distance >= radius {
            continue;
        }
        if distance > 1.0e-4 {
            force += away / (distance * distance.max(MIN_SPACING));
        } else {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            force += Vec3::new(angle.cos(), 0.0, angle.sin()) / MIN_SPACING;
        }
    }
    force
}

/// Small random horizontal wobble with components in `[-1, 1]`
pub fn jitter<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.random::<f32>() * 2.0 - 1.0,
        0.0,
        rng.random::<f32>() * 2.0 - 1.0,
    )
}

/// Evaluate pursuit steering toward `target`
pub fn pursue<R: Rng + ?Sized>(
    position: Vec3,
    target: Vec3,
    neighbors: &[Vec3],
    avoid_radius: f32,
    rng: &mut R,
) -> SteeringOutput {
    SteeringOutput {
        seek: seek(position, target),
        separation: separation(position, neighbors, avoid_radius, rng),
        jitter: jitter(rng),
    }
}

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_seek_ignores_height() {
        let dir = seek(Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 10.0, 4.0));
        assert_relative_eq!(dir.x, 0.6);
        assert_relative_eq!(dir.y, 0.0);
        assert_relative_eq!(dir.z, 0.8);
        assert_eq!(seek(Vec3::ONE, Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn test_separation_pushes_apart() {
        let a = Vec3::new(0.0, 1.0, 0.0);
        let b = Vec3::new(1.0, 1.0, 0.0);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let push_a = separation(a, &[b], 2.0, &mut rng);
        let push_b = separation(b, &[a], 2.0, &mut rng);
        assert!(push_a.x < 0.0);
        assert!(push_b.x > 0.0);
        assert_relative_eq!(push_a.length(), 1.0);
    }

    #[test]
    fn test_separation_stronger_when_closer() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let near = separation(Vec3::ZERO, &[Vec3::new(0.5, 0.0, 0.0)], 2.0, &mut rng);
        let far = separation(Vec3::ZERO, &[Vec3::new(1.5, 0.0, 0.0)], 2.0, &mut rng);
        assert!(near.length() > far.length());
        let outside = separation(Vec3::ZERO, &[Vec3::new(2.5, 0.0, 0.0)], 2.0, &mut rng);
        assert_eq!(outside, Vec3::ZERO);
    }

    #[test]
    fn test_separation_splits_stacked_neighbors() {
        let spot = Vec3::new(2.0, 1.0, -3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let push = separation(spot, &[spot], 2.0, &mut rng);
        assert_eq!(push.y, 0.0);
        assert_relative_eq!(push.length(), 1.0 / MIN_SPACING, epsilon = 1e-3);
        // Harder than any neighbor that is merely close
        let close = separation(spot, &[spot + Vec3::new(0.1, 0.0, 0.0)], 2.0, &mut rng);
        assert!(push.length() >= close.length());

        // Same seed, same push
        let again = separation(spot, &[spot], 2.0, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(push, again);
    }

    #[test]
    fn test_jitter_bounded_and_flat() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let j = jitter(&mut rng);
            assert_eq!(j.y, 0.0);
            assert!(j.x.abs() <= 1.0 && j.z.abs() <= 1.0);
        }
    }

    #[test]
    fn test_direction_is_unit_or_zero() {
        let weights = SteeringWeights::default();
        let out = SteeringOutput {
            seek: Vec3::X,
            separation: Vec3::new(0.0, 0.0, 2.0),
            jitter: Vec3::ZERO,
        };
        assert_relative_eq!(out.direction(&weights).length(), 1.0);
        assert_eq!(SteeringOutput::default().direction(&weights), Vec3::ZERO);
    }
}
