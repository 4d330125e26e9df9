//! Hit sparks, screen shake and knockout flash
//!
//! Purely cosmetic. The emitter consumes [`Impact`]s and nothing in the
//! simulation ever reads its output back.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat::Impact;
use crate::consts::SPARK_COLOR;
use crate::tuning::Tuning;

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32, // RGB
    pub life: f32,  // 1 -> 0
    pub size: f32,
}

/// Particle pool plus camera feedback values
#[derive(Debug, Clone)]
pub struct EffectsEmitter {
    particles: Vec<Particle>,
    rng: Pcg32,
    screen_shake: f32,
    flash_ticks: u32,
}

impl EffectsEmitter {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            screen_shake: 0.0,
            flash_ticks: 0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Camera shake magnitude in pixels
    pub fn screen_shake(&self) -> f32 {
        self.screen_shake
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_ticks > 0
    }

    /// Spawn sparks and an accent-colored burst at the impact point
    pub fn on_impact(&mut self, impact: &Impact, tuning: &Tuning) {
        // White sparks fly out radially
        for _ in 0..tuning.spark_count {
            let angle: f32 = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed: f32 = self.rng.random_range(10.0..25.0);
            self.particles.push(Particle {
                pos: impact.point,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color: SPARK_COLOR,
                life: 1.0,
                size: 3.0,
            });
        }

        for _ in 0..tuning.burst_count {
            let vel = Vec2::new(
                self.rng.random_range(-7.5..7.5),
                self.rng.random_range(-7.5..7.5),
            );
            self.particles.push(Particle {
                pos: impact.point,
                vel,
                color: impact.accent,
                life: 1.0,
                size: 4.0,
            });
        }

        // Drop the oldest to stay under the cap
        if self.particles.len() > tuning.max_particles {
            let excess = self.particles.len() - tuning.max_particles;
            self.particles.drain(..excess);
        }

        let shake = if impact.knockout {
            self.flash_ticks = tuning.knockout_flash_ticks;
            tuning.knockout_shake
        } else {
            tuning.hit_shake
        };
        self.screen_shake = self.screen_shake.max(shake);
    }

    /// Integrate and age every particle by one tick
    pub fn advance(&mut self, tuning: &Tuning) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel;
            particle.vel.y -= tuning.particle_gravity;
            particle.life -= tuning.particle_decay;
        }
        self.particles.retain(|p| p.life > 0.0);

        self.screen_shake = (self.screen_shake - 1.0).max(0.0);
        self.flash_ticks = self.flash_ticks.saturating_sub(1);
    }
}
