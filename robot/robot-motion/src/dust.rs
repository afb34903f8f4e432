//! Wheel dust particles.
//!
//! Two emitters sit at the rear wheel contact points. While the robot moves
//! faster than `spawn_speed`, each emitter spawns particles at a rate
//! proportional to speed. Particles rise, fall back under gravity, slow by
//! linear drag, fade and grow until they expire.
//!
//! The population never exceeds [`DustParams::cap`]; spawning simply stops
//! until old particles expire.

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use robot_types::RobotPose;

use crate::params::DustParams;

/// Height above the ground at which particles are born.
const SPAWN_HEIGHT: f64 = 0.03;

/// One dust particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustParticle {
    /// World position.
    pub position: Point3<f64>,
    /// World velocity.
    pub velocity: Vector3<f64>,
    /// Seconds since spawn.
    pub age: f64,
    /// Age at which the particle is removed.
    pub max_age: f64,
    /// Opacity at birth.
    pub base_opacity: f64,
    /// Scale growth per second.
    pub growth: f64,
}

impl DustParticle {
    /// Fraction of life used, in `[0, 1]`.
    #[must_use]
    pub fn life_fraction(&self) -> f64 {
        (self.age / self.max_age).clamp(0.0, 1.0)
    }

    /// Current opacity; falls linearly to zero at `max_age`.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.base_opacity * (1.0 - self.life_fraction())
    }

    /// Current scale relative to birth size.
    #[must_use]
    pub fn scale(&self) -> f64 {
        1.0 + self.growth * self.age
    }

    fn advance(&mut self, dt: f64, gravity: f64, drag: f64) {
        self.age += dt;
        self.velocity.y -= gravity * dt;
        self.velocity *= (1.0 - drag * dt).max(0.0);
        self.position += self.velocity * dt;
        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.velocity.y = 0.0;
        }
    }
}

/// Capped dust particle system.
///
/// # Example
///
/// ```
/// use robot_motion::{DustParams, DustSystem};
/// use robot_types::RobotPose;
///
/// let mut dust = DustSystem::new(DustParams::default().with_cap(16));
/// let pose = RobotPose::default();
/// for _ in 0..600 {
///     dust.update(1.0 / 60.0, &pose, 3.0, 3.0);
/// }
/// assert!(dust.len() <= 16);
/// ```
#[derive(Debug, Clone)]
pub struct DustSystem {
    params: DustParams,
    rng: StdRng,
    particles: Vec<DustParticle>,
}

impl DustSystem {
    /// Create an empty system seeded from `params.seed`.
    #[must_use]
    pub fn new(params: DustParams) -> Self {
        let rng = StdRng::seed_from_u64(params.seed);
        let particles = Vec::with_capacity(params.cap);
        Self {
            params,
            rng,
            particles,
        }
    }

    /// System parameters.
    #[must_use]
    pub fn params(&self) -> &DustParams {
        &self.params
    }

    /// Live particles.
    #[must_use]
    pub fn particles(&self) -> &[DustParticle] {
        &self.particles
    }

    /// Number of live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True if no particles are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Remove every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advance existing particles, then maybe spawn new ones.
    ///
    /// Returns the number of particles spawned this frame.
    pub fn update(&mut self, dt: f64, pose: &RobotPose, velocity: f64, max_speed: f64) -> usize {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let p = &self.params;

        for particle in &mut self.particles {
            particle.advance(dt, p.gravity, p.drag);
        }
        self.particles.retain(|particle| particle.age < particle.max_age);

        let speed = velocity.abs();
        if speed <= p.spawn_speed || max_speed <= 0.0 {
            return 0;
        }
        let chance = (p.spawn_rate * (speed / max_speed) * dt).clamp(0.0, 1.0);

        let mut spawned = 0;
        for side in [-1.0, 1.0] {
            if self.particles.len() >= self.params.cap {
                break;
            }
            if self.rng.r#gen::<f64>() < chance {
                let particle = self.spawn(pose, side, velocity.signum());
                self.particles.push(particle);
                spawned += 1;
            }
        }
        spawned
    }

    fn spawn(&mut self, pose: &RobotPose, side: f64, direction: f64) -> DustParticle {
        let p = &self.params;
        let forward = pose.forward();
        let right = pose.right();

        // Contact points trail the direction of travel
        let contact =
            pose.position - forward * (p.rear_offset * direction) + right * (side * p.half_track);

        let outward = self.rng.gen_range(0.0..=p.outward_speed) * side;
        let upward = self.rng.gen_range(0.0..=p.upward_speed);
        let backward = -self.rng.gen_range(0.0..=p.backward_speed) * direction;
        let planar = right * outward + forward * backward;

        DustParticle {
            position: Point3::new(contact.x, SPAWN_HEIGHT, contact.y),
            velocity: Vector3::new(planar.x, upward, planar.y),
            age: 0.0,
            max_age: p.max_age * self.rng.gen_range(0.6..=1.0),
            base_opacity: p.base_opacity,
            growth: p.growth,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn particle_fades_and_grows() {
        let particle = DustParticle {
            position: Point3::origin(),
            velocity: Vector3::zeros(),
            age: 0.5,
            max_age: 1.0,
            base_opacity: 0.4,
            growth: 2.0,
        };
        assert_relative_eq!(particle.opacity(), 0.2);
        assert_relative_eq!(particle.scale(), 2.0);
    }

    #[test]
    fn no_dust_below_spawn_speed() {
        let mut dust = DustSystem::new(DustParams::default());
        let pose = RobotPose::default();
        for _ in 0..600 {
            assert_eq!(dust.update(DT, &pose, 0.5, 3.0), 0);
        }
        assert!(dust.is_empty());
    }

    #[test]
    fn cap_holds_under_sustained_full_speed() {
        let mut dust = DustSystem::new(DustParams::default().with_cap(20));
        let pose = RobotPose::default();
        let mut peak = 0;
        for _ in 0..1200 {
            dust.update(DT, &pose, 3.0, 3.0);
            assert!(dust.len() <= 20);
            peak = peak.max(dust.len());
        }
        assert_eq!(peak, 20);
    }

    #[test]
    fn particles_stay_above_ground_and_expire() {
        let mut dust = DustSystem::new(DustParams::default());
        let pose = RobotPose::default();
        for _ in 0..120 {
            dust.update(DT, &pose, 3.0, 3.0);
        }
        assert!(!dust.is_empty());

        // Stop and let everything age out
        for _ in 0..120 {
            dust.update(DT, &pose, 0.0, 3.0);
            for particle in dust.particles() {
                assert!(particle.position.y >= 0.0);
                assert!(particle.age < particle.max_age);
            }
        }
        assert!(dust.is_empty());
    }

    #[test]
    fn dust_trails_behind_forward_motion() {
        let mut dust = DustSystem::new(DustParams::default().with_seed(3));
        let pose = RobotPose::default();
        for _ in 0..30 {
            dust.update(DT, &pose, 3.0, 3.0);
        }
        assert!(!dust.is_empty());
        // Robot faces +Z: emitters sit behind it
        let count = u32::try_from(dust.particles().len()).unwrap();
        let mean_z: f64 =
            dust.particles().iter().map(|p| p.position.z).sum::<f64>() / f64::from(count);
        assert!(mean_z < 0.0);
    }

    #[test]
    fn same_seed_same_particles() {
        let pose = RobotPose::default();
        let mut a = DustSystem::new(DustParams::default().with_seed(11));
        let mut b = DustSystem::new(DustParams::default().with_seed(11));
        for _ in 0..90 {
            a.update(DT, &pose, 2.5, 3.0);
            b.update(DT, &pose, 2.5, 3.0);
        }
        assert_eq!(a.particles(), b.particles());
    }
}
