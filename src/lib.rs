//! Cyber Strike - a two-fighter arena brawler
//!
//! Core modules:
//! - `sim`: Fixed-tick match simulation (physics, combat, CPU opponent, effects)
//! - `tuning`: Data-driven combat balance
//! - `outcome`: Final match result handed to the profile/leaderboard layer

pub mod outcome;
pub mod sim;
pub mod tuning;

pub use outcome::{MatchOutcome, OutcomeKind};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Ticks per simulated second
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame delta accepted by the scheduler (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena dimensions (x grows right, y is height above the floor)
    pub const ARENA_BOUND_MIN: f32 = 40.0;
    pub const ARENA_BOUND_MAX: f32 = 760.0;
    pub const GROUND_Y: f32 = 0.0;

    /// Movement, in units per tick
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_FORCE: f32 = 15.0;
    pub const MOVEMENT_SPEED: f32 = 7.0;
    /// Horizontal velocity multiplier per tick when not running or jumping
    pub const FRICTION: f32 = 0.8;

    /// Combat
    pub const MAX_HEALTH: u32 = 100;
    pub const FIXED_DAMAGE: u32 = 10;
    pub const ATTACK_RANGE: f32 = 100.0;
    pub const VERTICAL_TOLERANCE: f32 = 60.0;
    /// Torso anchor height above the fighter's feet
    pub const TORSO_HEIGHT: f32 = 40.0;
    pub const ATTACK_COOLDOWN_TICKS: u64 = 21; // ~350 ms
    /// How long Attack and Hit states last before reverting to Idle
    pub const ACTION_STATE_TICKS: u32 = 18; // ~300 ms
    pub const HIT_STOP_FRAMES: u32 = 8;
    pub const KNOCKBACK_X: f32 = 18.0;
    pub const KNOCKBACK_Y: f32 = 6.0;

    /// Match flow
    pub const INTRO_TICKS: u32 = 90; // 1.5 s "READY?"
    pub const RESOLUTION_DELAY_TICKS: u32 = 48; // ~800 ms knockout presentation
    pub const HUMAN_SPAWN_X: f32 = 100.0;
    pub const CPU_SPAWN_X: f32 = 700.0;

    /// Fighter accents (RGB)
    pub const HUMAN_ACCENT: u32 = 0x00ccff;
    pub const CPU_ACCENT: u32 = 0xff3300;
    pub const SPARK_COLOR: u32 = 0xffffff;
}
