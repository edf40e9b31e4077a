use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{Level, event};

use super::optimizer::RoundError;
use super::optimizer::RoundShape;
use super::partition::{MAX_CANDIDATES_PER_SLICE, TeamPartitions, binomial, distinct_matchups};
use super::scoring::{ScoredMatchup, score_matchup_breakdown};
use crate::model::ledger::PairingLedger;
use crate::model::participant::ParticipantId;
use crate::model::team::{Matchup, Team};

/// Picks one matchup for a slice of `2 * team_size` participants.
///
/// Solvers only read the ledger; committing the result is the caller's job.
pub trait MatchupSolver {
    fn name(&self) -> &'static str;

    fn solve(
        &self,
        ledger: &PairingLedger,
        slice: &[ParticipantId],
        team_size: usize,
    ) -> Result<ScoredMatchup, RoundError>;
}

/// Scores every split of the slice and keeps the first one with the lowest
/// familiarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSolver;

impl MatchupSolver for ExhaustiveSolver {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve(
        &self,
        ledger: &PairingLedger,
        slice: &[ParticipantId],
        team_size: usize,
    ) -> Result<ScoredMatchup, RoundError> {
        check_search_size(slice.len(), team_size)?;
        let partitions = TeamPartitions::new(slice, team_size);

        if tracing::enabled!(target: "mixer_core::round", Level::DEBUG) {
            let candidates: Vec<Matchup> = partitions.matchups().collect();
            event!(
                target: "mixer_core::round",
                Level::DEBUG,
                candidates = candidates.len(),
                distinct = distinct_matchups(&candidates),
                team_size,
            );
        }

        let mut best: Option<ScoredMatchup> = None;
        for matchup in partitions.matchups() {
            let score = score_matchup_breakdown(ledger, &matchup)?;
            // Strict comparison: on ties the earliest candidate stays.
            if best
                .as_ref()
                .is_none_or(|current| score.total() < current.score.total())
            {
                event!(
                    target: "mixer_core::round",
                    Level::TRACE,
                    score = score.total(),
                    "new lowest score"
                );
                best = Some(ScoredMatchup { matchup, score });
            }
        }

        best.ok_or(RoundError::EmptyCandidates {
            slice_len: slice.len(),
            team_size,
        })
    }
}

fn check_search_size(slice_len: usize, team_size: usize) -> Result<(), RoundError> {
    let candidates = binomial(slice_len, team_size);
    if candidates > MAX_CANDIDATES_PER_SLICE {
        return Err(RoundError::SearchTooLarge {
            team_size,
            candidates,
            limit: MAX_CANDIDATES_PER_SLICE,
        });
    }
    Ok(())
}

/// Builds the second team pair by pair from the least repeated pairings left in
/// the slice; whoever remains forms the first team.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver;

impl MatchupSolver for GreedySolver {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(
        &self,
        ledger: &PairingLedger,
        slice: &[ParticipantId],
        team_size: usize,
    ) -> Result<ScoredMatchup, RoundError> {
        let empty = || RoundError::EmptyCandidates {
            slice_len: slice.len(),
            team_size,
        };

        let mut remaining = slice.to_vec();
        let mut second = Vec::with_capacity(team_size);

        while second.len() < team_size {
            let open = team_size - second.len();
            if open >= 2 && remaining.len() >= 2 {
                let (i, j) = least_repeated_pair(ledger, &remaining)?;
                // j > i, so removing j first keeps i valid.
                let b = remaining.remove(j);
                let a = remaining.remove(i);
                second.push(a);
                second.push(b);
            } else {
                let idx = least_familiar(ledger, &remaining, &second)?.ok_or_else(empty)?;
                second.push(remaining.remove(idx));
            }
        }

        if remaining.is_empty() {
            return Err(empty());
        }

        let matchup = Matchup::new(Team::new(remaining), Team::new(second));
        let score = score_matchup_breakdown(ledger, &matchup)?;
        Ok(ScoredMatchup { matchup, score })
    }
}

fn least_repeated_pair(
    ledger: &PairingLedger,
    pool: &[ParticipantId],
) -> Result<(usize, usize), RoundError> {
    let mut best = (0, 1);
    let mut best_count = u32::MAX;
    for i in 0..pool.len() {
        for j in (i + 1)..pool.len() {
            let count = ledger.get(pool[i], pool[j])?;
            if count < best_count {
                best = (i, j);
                best_count = count;
            }
        }
    }
    Ok(best)
}

fn least_familiar(
    ledger: &PairingLedger,
    pool: &[ParticipantId],
    team: &[ParticipantId],
) -> Result<Option<usize>, RoundError> {
    let mut best: Option<(usize, u32)> = None;
    for (idx, candidate) in pool.iter().enumerate() {
        let mut familiarity = 0;
        for member in team {
            familiarity += ledger.get(*candidate, *member)?;
        }
        if best.is_none_or(|(_, lowest)| familiarity < lowest) {
            best = Some((idx, familiarity));
        }
    }
    Ok(best.map(|(idx, _)| idx))
}

/// Solver selection as it appears in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchupStrategy {
    #[default]
    Exhaustive,
    Greedy,
}

impl MatchupStrategy {
    pub const ALL: [MatchupStrategy; 2] = [MatchupStrategy::Exhaustive, MatchupStrategy::Greedy];

    pub const fn as_str(self) -> &'static str {
        match self {
            MatchupStrategy::Exhaustive => "exhaustive",
            MatchupStrategy::Greedy => "greedy",
        }
    }

    /// Rejects shapes this strategy cannot search, before any round is played.
    pub fn check_shape(self, shape: &RoundShape) -> Result<(), RoundError> {
        match self {
            MatchupStrategy::Exhaustive => {
                check_search_size(shape.players_per_matchup, shape.players_per_team)
            }
            MatchupStrategy::Greedy => Ok(()),
        }
    }

    pub fn solver(self) -> Box<dyn MatchupSolver> {
        match self {
            MatchupStrategy::Exhaustive => Box::new(ExhaustiveSolver),
            MatchupStrategy::Greedy => Box::new(GreedySolver),
        }
    }
}

impl fmt::Display for MatchupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchupStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exhaustive" | "exact" => Ok(MatchupStrategy::Exhaustive),
            "greedy" | "simple" => Ok(MatchupStrategy::Greedy),
            other => Err(format!("unknown matchup strategy '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn ids(count: usize) -> Vec<ParticipantId> {
        (0..count).map(ParticipantId::from_index).collect()
    }

    fn ledger(count: usize) -> PairingLedger {
        PairingLedger::initialize((0..count).map(|i| format!("P{}", i + 1))).unwrap()
    }

    #[test]
    fn exhaustive_prefers_first_candidate_on_ties() {
        let ledger = ledger(4);
        let pool = ids(4);
        let chosen = ExhaustiveSolver.solve(&ledger, &pool, 2).unwrap();
        assert_eq!(chosen.score.total(), 0);
        assert_eq!(chosen.matchup.first().members(), &pool[..2]);
        assert_eq!(chosen.matchup.second().members(), &pool[2..]);
    }

    #[test]
    fn exhaustive_avoids_repeated_teammates() {
        let mut ledger = ledger(4);
        let pool = ids(4);
        ledger.increment(pool[0], pool[1]).unwrap();
        ledger.increment(pool[2], pool[3]).unwrap();
        let chosen = ExhaustiveSolver.solve(&ledger, &pool, 2).unwrap();
        assert_eq!(chosen.score.total(), 0);
        assert_eq!(chosen.matchup.first().members(), &[pool[0], pool[2]]);
    }

    #[test]
    fn exhaustive_reports_empty_candidates() {
        let ledger = ledger(4);
        let err = ExhaustiveSolver.solve(&ledger, &ids(3), 4).unwrap_err();
        assert!(matches!(
            err,
            RoundError::EmptyCandidates {
                slice_len: 3,
                team_size: 4
            }
        ));
    }

    #[test]
    fn exhaustive_refuses_oversized_search() {
        let ledger = ledger(80);
        let err = ExhaustiveSolver.solve(&ledger, &ids(80), 40).unwrap_err();
        assert!(matches!(
            err,
            RoundError::SearchTooLarge {
                team_size: 40,
                limit: MAX_CANDIDATES_PER_SLICE,
                ..
            }
        ));
    }

    #[test]
    fn strategy_checks_shape_before_search() {
        let huge = RoundShape::new(1, 80, 40);
        assert!(matches!(
            MatchupStrategy::Exhaustive.check_shape(&huge),
            Err(RoundError::SearchTooLarge { .. })
        ));
        assert_eq!(MatchupStrategy::Greedy.check_shape(&huge), Ok(()));
        assert_eq!(
            MatchupStrategy::Exhaustive.check_shape(&RoundShape::new(2, 8, 4)),
            Ok(())
        );
    }

    #[test]
    fn candidate_counts_follow_round_target() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("mixer_core::round=debug"))
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();

        let ledger = ledger(8);
        tracing::subscriber::with_default(subscriber, || {
            ExhaustiveSolver.solve(&ledger, &ids(8), 4).unwrap();
        });

        let output = capture.contents();
        assert!(output.contains("mixer_core::round"), "{output}");
        assert!(output.contains("candidates=70"), "{output}");
        assert!(output.contains("distinct=35"), "{output}");
    }

    #[test]
    fn greedy_builds_balanced_teams() {
        let mut ledger = ledger(8);
        let pool = ids(8);
        ledger.increment(pool[0], pool[1]).unwrap();
        let chosen = GreedySolver.solve(&ledger, &pool, 4).unwrap();
        assert_eq!(chosen.matchup.first().len(), 4);
        assert_eq!(chosen.matchup.second().len(), 4);
        let mut covered: Vec<_> = chosen.matchup.participants().collect();
        covered.sort();
        assert_eq!(covered, pool);
    }

    #[test]
    fn greedy_fills_odd_team_sizes() {
        let ledger = ledger(6);
        let chosen = GreedySolver.solve(&ledger, &ids(6), 3).unwrap();
        assert_eq!(chosen.matchup.first().len(), 3);
        assert_eq!(chosen.matchup.second().len(), 3);
    }

    #[test]
    fn greedy_skips_known_pairs_when_possible() {
        let mut ledger = ledger(4);
        let pool = ids(4);
        ledger.increment(pool[0], pool[1]).unwrap();
        let chosen = GreedySolver.solve(&ledger, &pool, 2).unwrap();
        assert_eq!(chosen.matchup.second().members(), &[pool[0], pool[2]]);
        assert_eq!(chosen.score.total(), 0);
    }

    #[test]
    fn strategy_parses_and_spawns_solver() {
        assert_eq!(
            "Greedy".parse::<MatchupStrategy>(),
            Ok(MatchupStrategy::Greedy)
        );
        assert!("random".parse::<MatchupStrategy>().is_err());
        for strategy in MatchupStrategy::ALL {
            assert_eq!(strategy.solver().name(), strategy.as_str());
        }
    }
}
