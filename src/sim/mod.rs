//! Deterministic match simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per 60 Hz frame)
//! - Seeded RNG only
//! - Stable update order (human before CPU)
//! - No rendering or platform dependencies

pub mod ai;
pub mod combat;
pub mod effects;
pub mod fighter;
pub mod physics;
pub mod scheduler;
pub mod session;

pub use ai::{CpuBrain, JitterSource, SeededJitter};
pub use combat::Impact;
pub use effects::{EffectsEmitter, Particle};
pub use fighter::{ActorId, ActorIntent, BehaviorState, Facing, Fighter, Horizontal};
pub use scheduler::{FrameControl, FrameScheduler, Subscription};
pub use session::{
    FighterView, Match, MatchEvent, MatchPhase, MatchSession, PendingResolution, Snapshot,
    TickInput,
};
