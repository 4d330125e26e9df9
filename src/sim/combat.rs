//! Melee hit resolution
//!
//! The attacker always commits to the swing once the preconditions hold; the
//! hit test only decides whether the defender takes damage, knockback and
//! hit-stop. Failed preconditions are silent no-ops.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fighter::{ActorId, BehaviorState, Facing, Fighter};
use crate::tuning::Tuning;

/// A landed hit, dispatched to effects and the event queue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub attacker: ActorId,
    pub defender: ActorId,
    pub damage: u32,
    /// Defender health after the hit
    pub health_left: u32,
    /// Defender torso at the moment of the hit
    pub point: Vec2,
    /// Attacker accent color for the particle burst
    pub accent: u32,
    pub knockout: bool,
}

/// Swing at `defender`; returns the impact if the swing connects
pub fn attack(
    attacker: &mut Fighter,
    defender: &mut Fighter,
    now: u64,
    tuning: &Tuning,
) -> Option<Impact> {
    if attacker.state.is_locked()
        || attacker.is_hit_stopped()
        || !attacker.cooldown_elapsed(now, tuning.attack_cooldown_ticks)
    {
        return None;
    }

    attacker.enter_timed(BehaviorState::Attack, tuning);
    attacker.last_action_tick = Some(now);

    if !connects(attacker, defender, tuning) {
        return None;
    }

    apply_damage(defender, attacker, tuning)
}

/// Hit test between attacker reach and defender body
pub fn connects(attacker: &Fighter, defender: &Fighter, tuning: &Tuning) -> bool {
    if defender.is_dead() {
        return false;
    }

    let dx = (attacker.pos.x - defender.pos.x).abs();
    let dy = (attacker.torso(tuning).y - defender.torso(tuning).y).abs();
    let facing_target = match attacker.facing {
        Facing::Right => defender.pos.x > attacker.pos.x,
        Facing::Left => defender.pos.x < attacker.pos.x,
    };

    dx < tuning.attack_range && dy < tuning.vertical_tolerance && facing_target
}

/// Damage, knock back and freeze the defender; freeze the attacker too.
///
/// A dead defender is left untouched and yields no impact.
pub fn apply_damage(
    defender: &mut Fighter,
    attacker: &mut Fighter,
    tuning: &Tuning,
) -> Option<Impact> {
    if defender.is_dead() {
        return None;
    }

    defender.health = defender.health.saturating_sub(tuning.damage);
    defender.enter_timed(BehaviorState::Hit, tuning);

    // Away from the attacker; fall back to the swing direction when stacked
    let away = if defender.pos.x == attacker.pos.x {
        attacker.facing
    } else {
        Facing::toward(attacker.pos.x, defender.pos.x)
    };
    defender.vel = Vec2::new(away.sign() * tuning.knockback_x, tuning.knockback_y);

    defender.hit_stop_frames = tuning.hit_stop_frames;
    attacker.hit_stop_frames = tuning.hit_stop_frames;

    let knockout = defender.health == 0;
    if knockout {
        defender.state = BehaviorState::Dead;
        defender.state_ticks = 0;
    }

    Some(Impact {
        attacker: attacker.id,
        defender: defender.id,
        damage: tuning.damage,
        health_left: defender.health,
        point: defender.torso(tuning),
        accent: attacker.accent,
        knockout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Human at x=300 facing right, CPU 80 units to its right facing left
    fn face_off(tuning: &Tuning) -> (Fighter, Fighter) {
        let mut human = Fighter::spawn(ActorId::Human, tuning);
        let mut cpu = Fighter::spawn(ActorId::Cpu, tuning);
        human.pos.x = 300.0;
        cpu.pos.x = 380.0;
        (human, cpu)
    }

    #[test]
    fn test_landed_hit() {
        let tuning = Tuning::default();
        let (mut human, mut cpu) = face_off(&tuning);

        let impact = attack(&mut human, &mut cpu, 100, &tuning).expect("should connect");

        assert_eq!(human.state, BehaviorState::Attack);
        assert_eq!(human.last_action_tick, Some(100));
        assert_eq!(cpu.state, BehaviorState::Hit);
        assert_eq!(cpu.health, tuning.max_health - tuning.damage);
        assert!(cpu.vel.x > 0.0, "knocked away from the attacker");
        assert!(cpu.vel.y > 0.0);
        assert_eq!(cpu.hit_stop_frames, 8);
        assert_eq!(human.hit_stop_frames, 8);

        assert_eq!(impact.attacker, ActorId::Human);
        assert_eq!(impact.defender, ActorId::Cpu);
        assert_eq!(impact.accent, human.accent);
        assert_eq!(impact.point, Vec2::new(380.0, tuning.torso_height));
        assert!(!impact.knockout);
    }

    #[test]
    fn test_knockout_is_terminal() {
        let tuning = Tuning::default();
        let (mut human, mut cpu) = face_off(&tuning);
        cpu.health = 10;

        let impact = apply_damage(&mut cpu, &mut human, &tuning).expect("cpu was alive");
        assert!(impact.knockout);
        assert_eq!(cpu.health, 0);
        assert_eq!(cpu.state, BehaviorState::Dead);

        // A later swing at the corpse does nothing to it
        human.state = BehaviorState::Idle;
        human.hit_stop_frames = 0;
        let vel_before = cpu.vel;
        assert!(attack(&mut human, &mut cpu, 1_000, &tuning).is_none());
        assert_eq!(cpu.health, 0);
        assert_eq!(cpu.vel, vel_before);
        assert_eq!(cpu.state, BehaviorState::Dead);
    }

    #[test]
    fn test_damage_on_corpse_is_ignored() {
        let tuning = Tuning::default();
        let (mut human, mut cpu) = face_off(&tuning);
        cpu.health = 0;
        cpu.state = BehaviorState::Dead;
        let corpse = cpu.clone();
        let attacker = human.clone();

        assert!(apply_damage(&mut cpu, &mut human, &tuning).is_none());
        assert_eq!(cpu, corpse);
        assert_eq!(human, attacker);
    }

    #[test]
    fn test_facing_mismatch_whiffs() {
        let tuning = Tuning::default();
        let (mut human, mut cpu) = face_off(&tuning);
        cpu.pos.x = 240.0; // behind the human, still in range

        assert!(attack(&mut human, &mut cpu, 100, &tuning).is_none());
        assert_eq!(cpu.health, tuning.max_health);
        assert_eq!(cpu.state, BehaviorState::Idle);
        assert_eq!(cpu.hit_stop_frames, 0);
        // The swing still happens
        assert_eq!(human.state, BehaviorState::Attack);
    }

    #[test]
    fn test_out_of_reach_whiffs() {
        let tuning = Tuning::default();
        let (mut human, mut cpu) = face_off(&tuning);

        cpu.pos.x = 300.0 + tuning.attack_range;
        assert!(attack(&mut human, &mut cpu, 100, &tuning).is_none());

        let (mut human, mut cpu) = face_off(&tuning);
        cpu.pos.y = tuning.vertical_tolerance + 1.0;
        assert!(attack(&mut human, &mut cpu, 100, &tuning).is_none());
        assert_eq!(cpu.health, tuning.max_health);
    }

    #[test]
    fn test_repeat_attack_during_cooldown_is_ignored() {
        let tuning = Tuning::default();
        let (mut human, mut cpu) = face_off(&tuning);

        assert!(attack(&mut human, &mut cpu, 100, &tuning).is_some());
        let health_after_first = cpu.health;

        // Still attacking, still frozen
        assert!(attack(&mut human, &mut cpu, 101, &tuning).is_none());

        // Back to idle but inside the cooldown window
        human.state = BehaviorState::Idle;
        human.hit_stop_frames = 0;
        cpu.state = BehaviorState::Idle;
        assert!(attack(&mut human, &mut cpu, 100 + tuning.attack_cooldown_ticks, &tuning).is_none());

        assert_eq!(human.last_action_tick, Some(100));
        assert_eq!(cpu.health, health_after_first);
    }

    #[test]
    fn test_locked_attacker_cannot_swing() {
        let tuning = Tuning::default();
        for state in [BehaviorState::Attack, BehaviorState::Hit, BehaviorState::Dead] {
            let (mut human, mut cpu) = face_off(&tuning);
            human.state = state;
            assert!(attack(&mut human, &mut cpu, 100, &tuning).is_none());
            assert_eq!(human.state, state);
            assert_eq!(human.last_action_tick, None);
        }
    }

    #[test]
    fn test_knockback_direction_follows_positions() {
        let tuning = Tuning::default();
        let (mut human, mut cpu) = face_off(&tuning);
        cpu.facing = Facing::Left;

        attack(&mut cpu, &mut human, 50, &tuning).expect("cpu should connect");
        assert!(human.vel.x < 0.0);
    }
}
