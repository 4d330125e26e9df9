//! Per-fighter kinematics
//!
//! One call to [`step`] advances a single fighter by one tick: voluntary
//! movement, friction, gravity, arena clamping, landing, and expiry of the
//! timed Attack/Hit states. Hit-stop freezes all of it.

use super::fighter::{ActorIntent, BehaviorState, Fighter};
use crate::tuning::Tuning;

/// Horizontal speeds below this snap to zero
const VELOCITY_EPSILON: f32 = 0.01;

/// Advance one fighter by one tick
pub fn step(fighter: &mut Fighter, intent: &ActorIntent, tuning: &Tuning) {
    if fighter.is_dead() {
        return;
    }

    // Impact freeze: nothing moves and no timer runs
    if fighter.hit_stop_frames > 0 {
        fighter.hit_stop_frames -= 1;
        return;
    }

    if !fighter.state.is_locked() {
        drive(fighter, intent, tuning);
    }

    if !fighter.state.is_propelled() {
        fighter.vel.x *= tuning.friction;
        if fighter.vel.x.abs() < VELOCITY_EPSILON {
            fighter.vel.x = 0.0;
        }
    }

    fighter.vel.y -= tuning.gravity;
    fighter.pos += fighter.vel;
    fighter.pos.x = fighter.pos.x.clamp(tuning.bound_min, tuning.bound_max);

    if fighter.pos.y <= tuning.ground_y {
        fighter.pos.y = tuning.ground_y;
        fighter.vel.y = 0.0;
        if fighter.state == BehaviorState::Jump {
            fighter.state = BehaviorState::Idle;
        }
    }

    if fighter.state.is_timed() {
        fighter.state_ticks = fighter.state_ticks.saturating_sub(1);
        if fighter.state_ticks == 0 {
            fighter.state = BehaviorState::Idle;
        }
    }
}

/// Apply voluntary movement and jumping
fn drive(fighter: &mut Fighter, intent: &ActorIntent, tuning: &Tuning) {
    let grounded = fighter.is_grounded(tuning);

    match intent.horizontal.facing() {
        Some(facing) => {
            fighter.vel.x = facing.sign() * tuning.movement_speed * intent.speed_factor;
            fighter.facing = facing;
            if grounded && fighter.state != BehaviorState::Jump {
                fighter.state = BehaviorState::Run;
            }
        }
        None => {
            if grounded && fighter.state == BehaviorState::Run {
                fighter.state = BehaviorState::Idle;
            }
        }
    }

    if intent.jump && grounded {
        fighter.vel.y = tuning.jump_force;
        fighter.state = BehaviorState::Jump;
    }
}
