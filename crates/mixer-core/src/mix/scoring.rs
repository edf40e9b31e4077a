use crate::model::ledger::{LedgerError, PairingLedger};
use crate::model::team::{Matchup, Team};
use serde::Serialize;

/// Familiarity of each side of a matchup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchupScore {
    pub first: u32,
    pub second: u32,
}

impl MatchupScore {
    pub fn total(&self) -> u32 {
        self.first + self.second
    }
}

/// A matchup together with the score it was selected with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMatchup {
    pub matchup: Matchup,
    pub score: MatchupScore,
}

/// Sum of ledger counts over every intra-team pair.
pub fn score_team(ledger: &PairingLedger, team: &Team) -> Result<u32, LedgerError> {
    team.pairs()
        .try_fold(0u32, |acc, (a, b)| ledger.get(a, b).map(|count| acc + count))
}

pub fn score_matchup_breakdown(
    ledger: &PairingLedger,
    matchup: &Matchup,
) -> Result<MatchupScore, LedgerError> {
    Ok(MatchupScore {
        first: score_team(ledger, matchup.first())?,
        second: score_team(ledger, matchup.second())?,
    })
}

pub fn score_matchup(ledger: &PairingLedger, matchup: &Matchup) -> Result<u32, LedgerError> {
    score_matchup_breakdown(ledger, matchup).map(|score| score.total())
}
