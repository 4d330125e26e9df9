//! Match lifecycle and the per-tick pipeline
//!
//! A [`MatchSession`] owns exactly one [`Match`] at a time. Every tick runs the
//! same fixed order: physics (human, CPU) -> combat (human, CPU) -> CPU brain
//! -> effects -> knockout countdown. Resetting replaces the whole `Match`, so
//! no fighter, timer or particle survives into the next round.

use serde::{Deserialize, Serialize};

use super::ai::CpuBrain;
use super::combat::{self, Impact};
use super::effects::{EffectsEmitter, Particle};
use super::fighter::{ActorId, ActorIntent, BehaviorState, Facing, Fighter, Horizontal};
use super::physics;
use crate::outcome::MatchOutcome;
use crate::tuning::Tuning;

/// Keeps the cosmetic RNG stream apart from the CPU jitter stream
const EFFECTS_SEED_SALT: u64 = 0x5EED_F00D_CAFE_BEEF;
/// Per-reset seed increment (golden ratio, spreads consecutive rounds)
const ROUND_SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// Lifecycle of one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// "READY?" countdown, nothing simulates
    Intro { ticks_left: u32 },
    /// Full tick pipeline runs
    Active,
    /// Everything frozen exactly as it was
    Paused,
    /// A fighter was knocked out and the presentation delay has elapsed
    Resolved { winner: ActorId },
}

/// Notifications for the outer shell, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Intro finished, fight!
    Ready,
    PauseChanged { paused: bool },
    Hit(Impact),
    /// Health reached zero; `Resolved` follows after the presentation delay
    Knockout { winner: ActorId, loser: ActorId },
    Resolved(MatchOutcome),
    Reset,
}

/// Human input for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub attack: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

impl TickInput {
    pub fn intent(&self) -> ActorIntent {
        ActorIntent {
            horizontal: Horizontal::from_keys(self.move_left, self.move_right),
            speed_factor: 1.0,
            jump: self.jump,
            attack: self.attack,
        }
    }
}

/// Knockout waiting out its presentation delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingResolution {
    pub winner: ActorId,
    pub ticks_left: u32,
}

/// Everything belonging to one round
#[derive(Debug, Clone)]
pub struct Match {
    pub phase: MatchPhase,
    /// Active ticks elapsed; the time base for every cooldown
    pub clock: u64,
    /// Indexed by [`ActorId::index`]
    pub fighters: [Fighter; 2],
    /// Intent the CPU brain queued for the next tick
    pub cpu_intent: ActorIntent,
    pub brain: CpuBrain,
    pub effects: EffectsEmitter,
    pub pending: Option<PendingResolution>,
    pub outcome: Option<MatchOutcome>,
}

impl Match {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            phase: MatchPhase::Intro {
                ticks_left: tuning.intro_ticks,
            },
            clock: 0,
            fighters: [
                Fighter::spawn(ActorId::Human, tuning),
                Fighter::spawn(ActorId::Cpu, tuning),
            ],
            cpu_intent: ActorIntent::default(),
            brain: CpuBrain::seeded(seed),
            effects: EffectsEmitter::new(seed ^ EFFECTS_SEED_SALT),
            pending: None,
            outcome: None,
        }
    }

    pub fn fighter(&self, id: ActorId) -> &Fighter {
        &self.fighters[id.index()]
    }

    pub fn fighter_mut(&mut self, id: ActorId) -> &mut Fighter {
        &mut self.fighters[id.index()]
    }

    /// (attacker, defender) borrowed together
    pub fn pair_mut(&mut self, attacker: ActorId) -> (&mut Fighter, &mut Fighter) {
        let [human, cpu] = &mut self.fighters;
        match attacker {
            ActorId::Human => (human, cpu),
            ActorId::Cpu => (cpu, human),
        }
    }
}

/// Per-fighter data handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FighterView {
    pub id: ActorId,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub state: BehaviorState,
    pub health: u32,
    pub max_health: u32,
    /// Health bar fill, 0.0 to 1.0
    pub health_fraction: f32,
}

impl From<&Fighter> for FighterView {
    fn from(f: &Fighter) -> Self {
        Self {
            id: f.id,
            x: f.pos.x,
            y: f.pos.y,
            facing: f.facing,
            state: f.state,
            health: f.health,
            max_health: f.max_health,
            health_fraction: f.health_fraction(),
        }
    }
}

/// Read-only view of the committed state after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: MatchPhase,
    pub clock: u64,
    pub fighters: [FighterView; 2],
    pub particles: Vec<Particle>,
    pub screen_shake: f32,
    pub flash: bool,
}

/// Owns the current match and drives it one tick at a time
#[derive(Debug, Clone)]
pub struct MatchSession {
    seed: u64,
    tuning: Tuning,
    rounds_started: u64,
    current: Match,
    events: Vec<MatchEvent>,
}

impl MatchSession {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.normalized();
        let current = Match::new(seed, &tuning);
        log::info!("Match created with seed {}", seed);
        Self {
            seed,
            tuning,
            rounds_started: 0,
            current,
            events: Vec::new(),
        }
    }

    pub fn current(&self) -> &Match {
        &self.current
    }

    /// Direct access for scripted test setups
    #[cfg(test)]
    pub(crate) fn current_mut(&mut self) -> &mut Match {
        &mut self.current
    }

    pub fn phase(&self) -> MatchPhase {
        self.current.phase
    }

    pub fn fighter(&self, id: ActorId) -> &Fighter {
        self.current.fighter(id)
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.current.outcome
    }

    pub fn is_paused(&self) -> bool {
        self.current.phase == MatchPhase::Paused
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    /// Toggle Active <-> Paused. Returns false in any other phase.
    pub fn toggle_pause(&mut self) -> bool {
        let paused = match self.current.phase {
            MatchPhase::Active => true,
            MatchPhase::Paused => false,
            MatchPhase::Intro { .. } | MatchPhase::Resolved { .. } => return false,
        };
        self.current.phase = if paused {
            MatchPhase::Paused
        } else {
            MatchPhase::Active
        };
        log::info!("{}", if paused { "Paused" } else { "Resumed" });
        self.events.push(MatchEvent::PauseChanged { paused });
        true
    }

    pub fn set_paused(&mut self, paused: bool) -> bool {
        if self.is_paused() == paused {
            return false;
        }
        self.toggle_pause()
    }

    /// Throw the current match away and start a fresh intro
    pub fn reset(&mut self) {
        self.rounds_started += 1;
        let seed = self
            .seed
            .wrapping_add(self.rounds_started.wrapping_mul(ROUND_SEED_STEP));
        self.current = Match::new(seed, &self.tuning);
        self.events.clear();
        self.events.push(MatchEvent::Reset);
        log::info!("Match reset (round {})", self.rounds_started + 1);
    }

    /// Advance the match by one fixed tick
    pub fn tick(&mut self, input: &TickInput) {
        if input.pause {
            self.toggle_pause();
        }

        match self.current.phase {
            MatchPhase::Intro { ticks_left } => {
                if ticks_left <= 1 {
                    self.current.phase = MatchPhase::Active;
                    self.events.push(MatchEvent::Ready);
                    log::info!("Fight!");
                } else {
                    self.current.phase = MatchPhase::Intro {
                        ticks_left: ticks_left - 1,
                    };
                }
                return;
            }
            MatchPhase::Paused | MatchPhase::Resolved { .. } => return,
            MatchPhase::Active => {}
        }

        let tuning = &self.tuning;
        let m = &mut self.current;
        m.clock += 1;
        let now = m.clock;

        let human_intent = input.intent();
        let cpu_intent = std::mem::take(&mut m.cpu_intent);

        {
            let [human, cpu] = &mut m.fighters;
            physics::step(human, &human_intent, tuning);
            physics::step(cpu, &cpu_intent, tuning);
        }

        // Human swings first: a knockout here turns the CPU's swing into a no-op
        for (id, intent) in [(ActorId::Human, human_intent), (ActorId::Cpu, cpu_intent)] {
            if !intent.attack {
                continue;
            }
            let impact = {
                let (attacker, defender) = m.pair_mut(id);
                combat::attack(attacker, defender, now, tuning)
            };
            if let Some(impact) = impact {
                dispatch_impact(m, &mut self.events, &impact, tuning);
            }
        }

        {
            let Match {
                fighters,
                brain,
                cpu_intent,
                ..
            } = &mut *m;
            let [human, cpu] = fighters;
            *cpu_intent = brain.decide(cpu, human, now, tuning);
        }

        m.effects.advance(tuning);

        let resolved = match m.pending.as_mut() {
            Some(pending) => {
                pending.ticks_left = pending.ticks_left.saturating_sub(1);
                (pending.ticks_left == 0).then_some(pending.winner)
            }
            None => None,
        };
        if let Some(winner) = resolved {
            self.resolve(winner);
        }
    }

    fn resolve(&mut self, winner: ActorId) {
        let m = &mut self.current;
        let outcome = MatchOutcome::score(
            winner,
            m.fighter(ActorId::Human),
            m.fighter(ActorId::Cpu),
            m.clock,
        );
        m.pending = None;
        m.phase = MatchPhase::Resolved { winner };
        m.outcome = Some(outcome);

        log::info!(
            "{} wins: {} (score {}, {} ticks)",
            winner.callsign(),
            outcome.headline(),
            outcome.score,
            outcome.ticks
        );
        self.events.push(MatchEvent::Resolved(outcome));
    }

    /// Capture what the renderer needs for this frame
    pub fn snapshot(&self) -> Snapshot {
        let m = &self.current;
        Snapshot {
            phase: m.phase,
            clock: m.clock,
            fighters: [
                FighterView::from(m.fighter(ActorId::Human)),
                FighterView::from(m.fighter(ActorId::Cpu)),
            ],
            particles: m.effects.particles().to_vec(),
            screen_shake: m.effects.screen_shake(),
            flash: m.effects.is_flashing(),
        }
    }
}

fn dispatch_impact(m: &mut Match, events: &mut Vec<MatchEvent>, impact: &Impact, tuning: &Tuning) {
    log::debug!(
        "{} hit {} for {} ({} left)",
        impact.attacker.callsign(),
        impact.defender.callsign(),
        impact.damage,
        impact.health_left
    );
    m.effects.on_impact(impact, tuning);
    events.push(MatchEvent::Hit(*impact));

    if impact.knockout {
        log::info!("{} knocked out", impact.defender.callsign());
        events.push(MatchEvent::Knockout {
            winner: impact.attacker,
            loser: impact.defender,
        });
        m.pending.get_or_insert(PendingResolution {
            winner: impact.attacker,
            ticks_left: tuning.resolution_delay_ticks,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeKind;

    fn active_session(tuning: Tuning) -> MatchSession {
        let mut session = MatchSession::new(1234, tuning);
        while matches!(session.phase(), MatchPhase::Intro { .. }) {
            session.tick(&TickInput::default());
        }
        session.drain_events();
        session
    }

    /// Human at 300 facing right, CPU at 380 facing left
    fn close_quarters(session: &mut MatchSession) {
        let m = session.current_mut();
        m.fighter_mut(ActorId::Human).pos.x = 300.0;
        m.fighter_mut(ActorId::Cpu).pos.x = 380.0;
    }

    fn swing() -> TickInput {
        TickInput {
            attack: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_intro_counts_down_without_simulating() {
        let tuning = Tuning::default();
        let mut session = MatchSession::new(1, tuning.clone());
        let fighters = session.current().fighters.clone();

        let walk = TickInput {
            move_right: true,
            attack: true,
            ..Default::default()
        };
        for _ in 0..tuning.intro_ticks - 1 {
            session.tick(&walk);
            assert!(matches!(session.phase(), MatchPhase::Intro { .. }));
        }
        assert_eq!(session.current().fighters, fighters);
        assert_eq!(session.current().clock, 0);
        // Pause is not available during the intro
        assert!(!session.toggle_pause());

        session.tick(&walk);
        assert_eq!(session.phase(), MatchPhase::Active);
        assert_eq!(session.drain_events(), vec![MatchEvent::Ready]);
    }

    #[test]
    fn test_cpu_closes_in_and_attacks() {
        let tuning = Tuning {
            human_spawn_x: 100.0,
            cpu_spawn_x: 650.0,
            ..Default::default()
        };
        let mut session = active_session(tuning);
        assert_eq!(session.fighter(ActorId::Cpu).state, BehaviorState::Idle);

        let mut ran = false;
        let mut attacked = false;
        for _ in 0..2 * crate::consts::TICKS_PER_SECOND {
            session.tick(&TickInput::default());
            match session.fighter(ActorId::Cpu).state {
                BehaviorState::Run => ran = true,
                BehaviorState::Attack => attacked = true,
                _ => {}
            }
        }
        assert!(ran, "CPU never started running");
        assert!(attacked, "CPU never attacked within two seconds");
    }

    #[test]
    fn test_hit_stop_freezes_both_fighters() {
        let mut session = active_session(Tuning::default());
        close_quarters(&mut session);

        session.tick(&swing());
        let human = session.fighter(ActorId::Human).clone();
        let cpu = session.fighter(ActorId::Cpu).clone();
        assert_eq!(human.hit_stop_frames, 8);
        assert_eq!(cpu.hit_stop_frames, 8);
        assert_eq!(cpu.state, BehaviorState::Hit);

        let mash = TickInput {
            move_left: true,
            jump: true,
            attack: true,
            ..Default::default()
        };
        for _ in 0..8 {
            session.tick(&mash);
            assert_eq!(session.fighter(ActorId::Human).pos, human.pos);
            assert_eq!(session.fighter(ActorId::Cpu).pos, cpu.pos);
        }

        session.tick(&mash);
        assert_ne!(session.fighter(ActorId::Cpu).pos, cpu.pos);
        assert!(session.fighter(ActorId::Cpu).pos.x > cpu.pos.x);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut session = active_session(Tuning::default());
        close_quarters(&mut session);
        session.tick(&swing());
        assert!(session.set_paused(true));
        let frozen = session.snapshot();
        let fighters = session.current().fighters.clone();

        let mash = TickInput {
            move_right: true,
            jump: true,
            attack: true,
            ..Default::default()
        };
        for _ in 0..100 {
            session.tick(&mash);
        }
        assert_eq!(session.snapshot(), frozen);
        assert_eq!(session.current().fighters, fighters);
        // In-flight hit-stop survives the pause
        assert_eq!(session.fighter(ActorId::Cpu).hit_stop_frames, 8);
    }

    #[test]
    fn test_pause_resume_roundtrip() {
        let mut session = active_session(Tuning::default());
        for _ in 0..30 {
            session.tick(&TickInput::default());
        }
        session.drain_events();
        let before = session.current().fighters.clone();
        let clock = session.current().clock;

        assert!(session.set_paused(true));
        assert!(!session.set_paused(true));
        assert!(session.set_paused(false));

        assert_eq!(session.current().fighters, before);
        assert_eq!(session.current().clock, clock);
        assert_eq!(
            session.drain_events(),
            vec![
                MatchEvent::PauseChanged { paused: true },
                MatchEvent::PauseChanged { paused: false },
            ]
        );
    }

    #[test]
    fn test_pause_input_toggles() {
        let mut session = active_session(Tuning::default());
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        session.tick(&pause);
        assert!(session.is_paused());
        session.tick(&pause);
        assert_eq!(session.phase(), MatchPhase::Active);
    }

    #[test]
    fn test_knockout_resolves_after_delay() {
        let tuning = Tuning::default();
        let mut session = active_session(tuning.clone());
        close_quarters(&mut session);
        session.current_mut().fighter_mut(ActorId::Cpu).health = tuning.damage;

        session.tick(&swing());
        assert_eq!(session.fighter(ActorId::Cpu).state, BehaviorState::Dead);
        assert_eq!(session.fighter(ActorId::Cpu).health, 0);
        let events = session.drain_events();
        assert!(events.contains(&MatchEvent::Knockout {
            winner: ActorId::Human,
            loser: ActorId::Cpu,
        }));
        assert_eq!(session.phase(), MatchPhase::Active);

        for _ in 0..tuning.resolution_delay_ticks - 2 {
            session.tick(&swing());
            assert_eq!(session.phase(), MatchPhase::Active);
            assert_eq!(session.fighter(ActorId::Cpu).health, 0);
        }
        session.tick(&TickInput::default());
        assert_eq!(
            session.phase(),
            MatchPhase::Resolved {
                winner: ActorId::Human
            }
        );

        let outcome = session.outcome().expect("resolved match has an outcome");
        assert_eq!(outcome.kind, OutcomeKind::Victory);
        assert_eq!(outcome.score, 100 + tuning.max_health as u64);
        assert_eq!(session.drain_events(), vec![MatchEvent::Resolved(outcome)]);

        // Resolved is final until reset
        let frozen = session.snapshot();
        assert!(!session.toggle_pause());
        session.tick(&swing());
        assert_eq!(session.snapshot(), frozen);
    }

    #[test]
    fn test_simultaneous_swings_resolve_human_first() {
        let tuning = Tuning::default();
        let mut session = active_session(tuning.clone());
        close_quarters(&mut session);
        {
            let m = session.current_mut();
            m.fighter_mut(ActorId::Human).health = tuning.damage;
            m.fighter_mut(ActorId::Cpu).health = tuning.damage;
            m.cpu_intent = ActorIntent {
                attack: true,
                ..Default::default()
            };
        }

        session.tick(&swing());
        assert_eq!(session.fighter(ActorId::Cpu).state, BehaviorState::Dead);
        assert_eq!(session.fighter(ActorId::Human).health, tuning.damage);
        assert_ne!(session.fighter(ActorId::Human).state, BehaviorState::Dead);

        for _ in 0..tuning.resolution_delay_ticks {
            session.tick(&TickInput::default());
        }
        assert_eq!(
            session.phase(),
            MatchPhase::Resolved {
                winner: ActorId::Human
            }
        );
    }

    #[test]
    fn test_reset_reallocates_everything() {
        let tuning = Tuning::default();
        let mut session = active_session(tuning.clone());
        close_quarters(&mut session);
        session.current_mut().fighter_mut(ActorId::Cpu).health = tuning.damage;
        session.tick(&swing());
        for _ in 0..tuning.resolution_delay_ticks {
            session.tick(&TickInput::default());
        }
        assert!(session.outcome().is_some());

        session.reset();
        let m = session.current();
        assert_eq!(
            m.phase,
            MatchPhase::Intro {
                ticks_left: tuning.intro_ticks
            }
        );
        assert_eq!(m.clock, 0);
        assert!(m.pending.is_none());
        assert!(m.outcome.is_none());
        assert!(m.effects.particles().is_empty());
        assert_eq!(m.fighters[0], Fighter::spawn(ActorId::Human, &tuning));
        assert_eq!(m.fighters[1], Fighter::spawn(ActorId::Cpu, &tuning));
        assert_eq!(session.drain_events(), vec![MatchEvent::Reset]);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let script = |t: u64| TickInput {
            move_right: t % 40 < 25,
            move_left: t % 40 >= 35,
            jump: t % 97 == 0,
            attack: t % 7 == 0,
            pause: false,
        };

        let run = || {
            let mut session = MatchSession::new(777, Tuning::default());
            for t in 0..6_000 {
                session.tick(&script(t));
                if session.outcome().is_some() {
                    break;
                }
            }
            session
        };

        let a = run();
        let b = run();
        assert_eq!(a.current().fighters, b.current().fighters);
        assert_eq!(a.outcome(), b.outcome());
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_snapshot_reflects_fighters() {
        let mut session = active_session(Tuning::default());
        close_quarters(&mut session);
        session.tick(&swing());

        let snap = session.snapshot();
        assert_eq!(snap.fighters[0].id, ActorId::Human);
        assert_eq!(snap.fighters[1].state, BehaviorState::Hit);
        assert_eq!(snap.fighters[1].health, 90);
        assert_eq!(snap.fighters[1].health_fraction, 0.9);
        assert_eq!(snap.fighters[0].health_fraction, 1.0);
        assert!(!snap.particles.is_empty());
        assert!(snap.screen_shake > 0.0);

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"Active\""));
        assert!(json.contains("\"Hit\""));
    }
}
