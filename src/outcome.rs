//! Final match result
//!
//! The simulation never persists anything; once a match resolves it produces a
//! single [`MatchOutcome`] that the caller hands to the profile/leaderboard
//! service.

use serde::{Deserialize, Serialize};

use crate::sim::fighter::{ActorId, Fighter};

/// Bonus awarded for winning, on top of remaining health
pub const VICTORY_BONUS: u64 = 100;

/// Result from the human player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Victory,
    Defeat,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Victory => "victory",
            OutcomeKind::Defeat => "defeat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: ActorId,
    pub kind: OutcomeKind,
    /// Scalar submitted to the leaderboard
    pub score: u64,
    /// Active simulation ticks the match lasted
    pub ticks: u64,
}

impl MatchOutcome {
    /// Score a finished match.
    ///
    /// A win is worth [`VICTORY_BONUS`] plus the human's remaining health; a
    /// loss is worth the damage the human dealt.
    pub fn score(winner: ActorId, human: &Fighter, cpu: &Fighter, ticks: u64) -> Self {
        let (kind, score) = match winner {
            ActorId::Human => (OutcomeKind::Victory, VICTORY_BONUS + human.health as u64),
            ActorId::Cpu => (
                OutcomeKind::Defeat,
                cpu.max_health.saturating_sub(cpu.health) as u64,
            ),
        };
        Self {
            winner,
            kind,
            score,
            ticks,
        }
    }

    /// Headline for the result screen
    pub fn headline(&self) -> &'static str {
        match self.kind {
            OutcomeKind::Victory => "VICTORY",
            OutcomeKind::Defeat => "DEFEATED",
        }
    }
}
