//! CPU opponent
//!
//! A reactive, memoryless policy: each eligible tick it looks only at its own
//! cooldown timestamp and the opponent's position, closes the distance, and
//! swings once in range. Randomness comes from a [`JitterSource`] so a seeded
//! match plays out identically every time.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::fighter::{ActorIntent, BehaviorState, Facing, Fighter, Horizontal};
use crate::tuning::Tuning;

/// Bounded randomness used to make the CPU look less mechanical
pub trait JitterSource {
    /// Approach speed multiplier in `[min, max]`
    fn speed_factor(&mut self, min: f32, max: f32) -> f32;
    /// Extra cooldown ticks in `[0, window]`
    fn attack_delay(&mut self, window: u64) -> u64;
}

/// PCG-backed jitter
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: Pcg32,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl JitterSource for SeededJitter {
    fn speed_factor(&mut self, min: f32, max: f32) -> f32 {
        self.rng.random_range(min..=max)
    }

    fn attack_delay(&mut self, window: u64) -> u64 {
        self.rng.random_range(0..=window)
    }
}

/// Decision-maker for the CPU fighter
#[derive(Debug, Clone)]
pub struct CpuBrain<J: JitterSource = SeededJitter> {
    jitter: J,
    speed_factor: f32,
    /// Eligible ticks until the speed factor is re-rolled
    reroll_in: u32,
}

impl CpuBrain<SeededJitter> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_jitter(SeededJitter::new(seed))
    }
}

impl<J: JitterSource> CpuBrain<J> {
    pub fn with_jitter(jitter: J) -> Self {
        Self {
            jitter,
            speed_factor: 1.0,
            reroll_in: 0,
        }
    }

    /// Current approach speed multiplier
    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Pick the CPU's intent for the next tick.
    ///
    /// Only `me` is mutated (facing, Run state, and a horizontal halt once in
    /// reach); the opponent is read-only.
    /// The returned intent's `attack` flag is resolved by combat next tick.
    pub fn decide(
        &mut self,
        me: &mut Fighter,
        opponent: &Fighter,
        now: u64,
        tuning: &Tuning,
    ) -> ActorIntent {
        let eligible = match me.state {
            BehaviorState::Idle | BehaviorState::Run | BehaviorState::Jump => {
                !me.is_hit_stopped()
            }
            BehaviorState::Attack | BehaviorState::Hit | BehaviorState::Dead => false,
        };
        if !eligible || opponent.is_dead() {
            return ActorIntent::default();
        }

        let facing = Facing::toward(me.pos.x, opponent.pos.x);
        me.facing = facing;

        let distance = (opponent.pos.x - me.pos.x).abs();
        if distance > tuning.attack_range - tuning.ai_approach_margin {
            self.roll_speed(tuning);
            if me.state != BehaviorState::Jump {
                me.state = BehaviorState::Run;
            }
            return ActorIntent {
                horizontal: Horizontal::toward(facing),
                speed_factor: self.speed_factor,
                ..Default::default()
            };
        }

        // In reach: plant the feet instead of sliding past the target
        me.vel.x = 0.0;

        let cooldown =
            tuning.attack_cooldown_ticks + self.jitter.attack_delay(tuning.ai_attack_jitter_ticks);
        ActorIntent {
            attack: me.cooldown_elapsed(now, cooldown),
            ..Default::default()
        }
    }

    fn roll_speed(&mut self, tuning: &Tuning) {
        if self.reroll_in == 0 {
            self.speed_factor = self
                .jitter
                .speed_factor(tuning.ai_speed_jitter_min, tuning.ai_speed_jitter_max);
            self.reroll_in = tuning.ai_jitter_reroll_ticks;
        }
        self.reroll_in = self.reroll_in.saturating_sub(1);
    }
}
