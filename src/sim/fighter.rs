//! Fighter records and the intents that drive them

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CPU_ACCENT, HUMAN_ACCENT};
use crate::tuning::Tuning;

/// Which side of the match a fighter is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorId {
    Human,
    Cpu,
}

impl ActorId {
    /// Slot in `Match::fighters`
    pub fn index(self) -> usize {
        match self {
            ActorId::Human => 0,
            ActorId::Cpu => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            ActorId::Human => ActorId::Cpu,
            ActorId::Cpu => ActorId::Human,
        }
    }

    /// Name shown on the result screen
    pub fn callsign(self) -> &'static str {
        match self {
            ActorId::Human => "CYBER_UNIT",
            ActorId::Cpu => "CPU_OVERLORD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Direction from `from_x` toward `to_x` (Right when they coincide)
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x < from_x {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

/// Discrete behavior mode; gates which systems may act on a fighter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorState {
    Idle,
    Run,
    Jump,
    Attack,
    Hit,
    Dead,
}

impl BehaviorState {
    /// Voluntary movement and attacks are ignored in these states
    pub fn is_locked(self) -> bool {
        match self {
            BehaviorState::Attack | BehaviorState::Hit | BehaviorState::Dead => true,
            BehaviorState::Idle | BehaviorState::Run | BehaviorState::Jump => false,
        }
    }

    /// States that expire back to Idle on their own
    pub fn is_timed(self) -> bool {
        match self {
            BehaviorState::Attack | BehaviorState::Hit => true,
            BehaviorState::Idle
            | BehaviorState::Run
            | BehaviorState::Jump
            | BehaviorState::Dead => false,
        }
    }

    /// Self-propelled states keep their horizontal speed (no friction)
    pub fn is_propelled(self) -> bool {
        match self {
            BehaviorState::Run | BehaviorState::Jump => true,
            BehaviorState::Idle
            | BehaviorState::Attack
            | BehaviorState::Hit
            | BehaviorState::Dead => false,
        }
    }
}

/// Discrete horizontal input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Horizontal {
    Left,
    #[default]
    Neutral,
    Right,
}

impl Horizontal {
    /// Both directions held cancel out
    pub fn from_keys(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => Horizontal::Left,
            (false, true) => Horizontal::Right,
            _ => Horizontal::Neutral,
        }
    }

    pub fn toward(facing: Facing) -> Self {
        match facing {
            Facing::Left => Horizontal::Left,
            Facing::Right => Horizontal::Right,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Horizontal::Left => -1.0,
            Horizontal::Neutral => 0.0,
            Horizontal::Right => 1.0,
        }
    }

    pub fn facing(self) -> Option<Facing> {
        match self {
            Horizontal::Left => Some(Facing::Left),
            Horizontal::Neutral => None,
            Horizontal::Right => Some(Facing::Right),
        }
    }
}

/// What a fighter wants to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorIntent {
    pub horizontal: Horizontal,
    /// Multiplier on movement speed (1.0 for the human, jittered for the CPU)
    pub speed_factor: f32,
    pub jump: bool,
    pub attack: bool,
}

impl Default for ActorIntent {
    fn default() -> Self {
        Self {
            horizontal: Horizontal::Neutral,
            speed_factor: 1.0,
            jump: false,
            attack: false,
        }
    }
}

/// One fighter's mutable record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: ActorId,
    /// Feet position; y is height above the floor
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub facing: Facing,
    pub state: BehaviorState,
    /// Match tick of the last attack (None = has not attacked yet)
    pub last_action_tick: Option<u64>,
    /// Remaining impact-freeze ticks
    pub hit_stop_frames: u32,
    /// Remaining ticks of a timed Attack/Hit state
    pub state_ticks: u32,
    /// RGB accent used for this fighter's hit particles
    pub accent: u32,
    pub is_player_controlled: bool,
}

impl Fighter {
    /// Fresh fighter at its spawn point, facing the arena center
    pub fn spawn(id: ActorId, tuning: &Tuning) -> Self {
        let (x, facing, accent) = match id {
            ActorId::Human => (tuning.human_spawn_x, Facing::Right, HUMAN_ACCENT),
            ActorId::Cpu => (tuning.cpu_spawn_x, Facing::Left, CPU_ACCENT),
        };
        Self {
            id,
            pos: Vec2::new(x, tuning.ground_y),
            vel: Vec2::ZERO,
            health: tuning.max_health,
            max_health: tuning.max_health,
            facing,
            state: BehaviorState::Idle,
            last_action_tick: None,
            hit_stop_frames: 0,
            state_ticks: 0,
            accent,
            is_player_controlled: id == ActorId::Human,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.state == BehaviorState::Dead
    }

    pub fn is_grounded(&self, tuning: &Tuning) -> bool {
        self.pos.y <= tuning.ground_y
    }

    pub fn is_hit_stopped(&self) -> bool {
        self.hit_stop_frames > 0
    }

    /// Anchor used for vertical hit tests and impact effects
    pub fn torso(&self, tuning: &Tuning) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y + tuning.torso_height)
    }

    /// True once more than `cooldown` ticks have passed since the last attack
    pub fn cooldown_elapsed(&self, now: u64, cooldown: u64) -> bool {
        self.last_action_tick
            .is_none_or(|last| now.saturating_sub(last) > cooldown)
    }

    /// Enter a timed state (Attack or Hit)
    pub(crate) fn enter_timed(&mut self, state: BehaviorState, tuning: &Tuning) {
        debug_assert!(state.is_timed());
        self.state = state;
        self.state_ticks = tuning.action_state_ticks;
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }
}
