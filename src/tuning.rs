//! Data-driven combat balance
//!
//! Every number the simulation reads lives here so a match can be rebalanced
//! from a JSON file without recompiling. Missing fields fall back to the
//! defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Balance table for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub bound_min: f32,
    pub bound_max: f32,
    pub ground_y: f32,

    // === Movement (units per tick) ===
    pub gravity: f32,
    pub jump_force: f32,
    pub movement_speed: f32,
    pub friction: f32,

    // === Combat ===
    pub max_health: u32,
    pub damage: u32,
    pub attack_range: f32,
    pub vertical_tolerance: f32,
    pub torso_height: f32,
    pub attack_cooldown_ticks: u64,
    pub action_state_ticks: u32,
    pub hit_stop_frames: u32,
    pub knockback_x: f32,
    pub knockback_y: f32,

    // === CPU opponent ===
    /// Distance short of `attack_range` at which the CPU stops closing in
    pub ai_approach_margin: f32,
    pub ai_speed_jitter_min: f32,
    pub ai_speed_jitter_max: f32,
    /// Ticks between re-rolls of the approach speed factor
    pub ai_jitter_reroll_ticks: u32,
    /// Upper bound of the random extra delay added to the CPU's cooldown
    pub ai_attack_jitter_ticks: u64,

    // === Match flow ===
    pub intro_ticks: u32,
    pub resolution_delay_ticks: u32,
    pub human_spawn_x: f32,
    pub cpu_spawn_x: f32,

    // === Effects (cosmetic only) ===
    pub spark_count: usize,
    pub burst_count: usize,
    pub particle_gravity: f32,
    pub particle_decay: f32,
    pub max_particles: usize,
    pub hit_shake: f32,
    pub knockout_shake: f32,
    pub knockout_flash_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            bound_min: ARENA_BOUND_MIN,
            bound_max: ARENA_BOUND_MAX,
            ground_y: GROUND_Y,

            gravity: GRAVITY,
            jump_force: JUMP_FORCE,
            movement_speed: MOVEMENT_SPEED,
            friction: FRICTION,

            max_health: MAX_HEALTH,
            damage: FIXED_DAMAGE,
            attack_range: ATTACK_RANGE,
            vertical_tolerance: VERTICAL_TOLERANCE,
            torso_height: TORSO_HEIGHT,
            attack_cooldown_ticks: ATTACK_COOLDOWN_TICKS,
            action_state_ticks: ACTION_STATE_TICKS,
            hit_stop_frames: HIT_STOP_FRAMES,
            knockback_x: KNOCKBACK_X,
            knockback_y: KNOCKBACK_Y,

            ai_approach_margin: 10.0,
            ai_speed_jitter_min: 0.8,
            ai_speed_jitter_max: 1.0,
            ai_jitter_reroll_ticks: 12,
            ai_attack_jitter_ticks: 18, // up to ~300 ms

            intro_ticks: INTRO_TICKS,
            resolution_delay_ticks: RESOLUTION_DELAY_TICKS,
            human_spawn_x: HUMAN_SPAWN_X,
            cpu_spawn_x: CPU_SPAWN_X,

            spark_count: 10,
            burst_count: 15,
            particle_gravity: 0.2,
            particle_decay: 0.02,
            max_particles: 256,
            hit_shake: 8.0,
            knockout_shake: 25.0,
            knockout_flash_ticks: 9, // ~150 ms
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning table from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.normalized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Repair values that would break simulation invariants
    pub fn normalized(mut self) -> Self {
        if self.bound_min > self.bound_max {
            log::warn!(
                "Arena bounds inverted ({} > {}), swapping",
                self.bound_min,
                self.bound_max
            );
            std::mem::swap(&mut self.bound_min, &mut self.bound_max);
        }
        if self.ai_speed_jitter_min > self.ai_speed_jitter_max {
            log::warn!("CPU speed jitter range inverted, swapping");
            std::mem::swap(&mut self.ai_speed_jitter_min, &mut self.ai_speed_jitter_max);
        }
        if self.max_health == 0 {
            log::warn!("max_health of 0 would start the match knocked out, using default");
            self.max_health = MAX_HEALTH;
        }
        self.ai_jitter_reroll_ticks = self.ai_jitter_reroll_ticks.max(1);
        self.human_spawn_x = self.human_spawn_x.clamp(self.bound_min, self.bound_max);
        self.cpu_spawn_x = self.cpu_spawn_x.clamp(self.bound_min, self.bound_max);
        self
    }

    /// Load a tuning file, falling back to defaults (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    return tuning;
                }
                Err(e) => log::warn!("Invalid tuning file {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read tuning file {}: {}", path.display(), e),
        }

        log::info!("Using default tuning");
        Self::default()
    }
}
