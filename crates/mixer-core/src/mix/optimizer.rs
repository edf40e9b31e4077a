use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

use super::scoring::ScoredMatchup;
use super::solver::{ExhaustiveSolver, MatchupSolver};
use crate::model::ledger::{LedgerError, PairingLedger};
use crate::model::participant::ParticipantId;
use crate::model::team::Matchup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundShape {
    pub matchups_per_round: usize,
    pub players_per_matchup: usize,
    pub players_per_team: usize,
}

impl RoundShape {
    pub const fn new(
        matchups_per_round: usize,
        players_per_matchup: usize,
        players_per_team: usize,
    ) -> Self {
        Self {
            matchups_per_round,
            players_per_matchup,
            players_per_team,
        }
    }

    pub const fn players_per_round(&self) -> usize {
        self.matchups_per_round * self.players_per_matchup
    }

    pub fn validate(&self) -> Result<(), RoundError> {
        if self.matchups_per_round == 0 || self.players_per_team == 0 {
            return Err(RoundError::EmptyShape);
        }
        if self.players_per_matchup != 2 * self.players_per_team {
            return Err(RoundError::TeamSizeMismatch {
                per_matchup: self.players_per_matchup,
                per_team: self.players_per_team,
            });
        }
        Ok(())
    }

    pub fn validate_for(&self, available: usize) -> Result<(), RoundError> {
        self.validate()?;
        let required = self.players_per_round();
        if available < required {
            return Err(RoundError::InsufficientParticipants {
                required,
                available,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("a round needs at least one matchup and at least one player per team")]
    EmptyShape,
    #[error(
        "players per matchup ({per_matchup}) must be exactly twice the players per team ({per_team})"
    )]
    TeamSizeMismatch { per_matchup: usize, per_team: usize },
    #[error("a round needs {required} participants but only {available} are available")]
    InsufficientParticipants { required: usize, available: usize },
    #[error("no candidate partitions for a slice of {slice_len} with team size {team_size}")]
    EmptyCandidates { slice_len: usize, team_size: usize },
    #[error(
        "team size {team_size} gives {candidates} candidate splits per matchup, above the exhaustive limit of {limit}"
    )]
    SearchTooLarge {
        team_size: usize,
        candidates: usize,
        limit: usize,
    },
    #[error("participant {0} appears more than once in the round")]
    DuplicateParticipant(ParticipantId),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Lowest-familiarity matchups for the front of `pool`, one per slice.
pub fn optimize_round(
    ledger: &PairingLedger,
    pool: &[ParticipantId],
    shape: &RoundShape,
) -> Result<Vec<Matchup>, RoundError> {
    optimize_round_with(&ExhaustiveSolver, ledger, pool, shape)
        .map(|scored| scored.into_iter().map(|entry| entry.matchup).collect())
}

/// Cuts the first `matchups_per_round * players_per_matchup` ids of `pool` into
/// contiguous slices and lets `solver` pick a matchup for each one.
///
/// Slices are solved independently; nothing is rebalanced across them.
pub fn optimize_round_with<S>(
    solver: &S,
    ledger: &PairingLedger,
    pool: &[ParticipantId],
    shape: &RoundShape,
) -> Result<Vec<ScoredMatchup>, RoundError>
where
    S: MatchupSolver + ?Sized,
{
    shape.validate_for(pool.len())?;

    pool.chunks_exact(shape.players_per_matchup)
        .take(shape.matchups_per_round)
        .enumerate()
        .map(|(slice_index, slice)| -> Result<ScoredMatchup, RoundError> {
            let chosen = solver.solve(ledger, slice, shape.players_per_team)?;
            event!(
                target: "mixer_core::round",
                Level::DEBUG,
                solver = solver.name(),
                slice_index,
                score = chosen.score.total(),
            );
            Ok(chosen)
        })
        .collect()
}
