use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

use crate::mix::commit::commit_round;
use crate::mix::optimizer::{RoundError, RoundShape, optimize_round_with};
use crate::mix::ordering::order_pool;
use crate::mix::scoring::ScoredMatchup;
use crate::mix::solver::MatchupStrategy;
use crate::model::ledger::PairingLedger;

/// Matchups chosen for one round, in slice order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    pub number: u32,
    pub matchups: Vec<ScoredMatchup>,
}

impl RoundRecord {
    pub fn total_score(&self) -> u32 {
        self.matchups.iter().map(|entry| entry.score.total()).sum()
    }
}

/// Owns the ledger for a whole run and plays rounds against it.
#[derive(Debug, Clone)]
pub struct MixerState {
    ledger: PairingLedger,
    shape: RoundShape,
    strategy: MatchupStrategy,
    rng: StdRng,
    seed: u64,
    rounds_played: u32,
}

impl MixerState {
    pub fn with_seed(
        ledger: PairingLedger,
        shape: RoundShape,
        strategy: MatchupStrategy,
        seed: u64,
    ) -> Result<Self, RoundError> {
        shape.validate_for(ledger.len())?;
        strategy.check_shape(&shape)?;
        Ok(Self {
            ledger,
            shape,
            strategy,
            rng: StdRng::seed_from_u64(seed),
            seed,
            rounds_played: 0,
        })
    }

    pub fn ledger(&self) -> &PairingLedger {
        &self.ledger
    }

    pub fn shape(&self) -> &RoundShape {
        &self.shape
    }

    pub fn strategy(&self) -> MatchupStrategy {
        self.strategy
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn into_ledger(self) -> PairingLedger {
        self.ledger
    }

    /// Orders the roster, optimizes the front of it and commits the result.
    pub fn play_round(&mut self) -> Result<RoundRecord, RoundError> {
        let pool = order_pool(&self.ledger, &mut self.rng);
        let round_pool = &pool[..self.shape.players_per_round().min(pool.len())];

        let solver = self.strategy.solver();
        let matchups = optimize_round_with(solver.as_ref(), &self.ledger, round_pool, &self.shape)?;
        commit_round(&mut self.ledger, matchups.iter().map(|entry| &entry.matchup))?;

        self.rounds_played += 1;
        let record = RoundRecord {
            number: self.rounds_played,
            matchups,
        };

        event!(
            target: "mixer_core::round",
            Level::INFO,
            round = record.number,
            strategy = self.strategy.as_str(),
            matchups = record.matchups.len(),
            total_score = record.total_score(),
            max_pair_count = self.ledger.max_pair_count(),
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(count: usize) -> PairingLedger {
        PairingLedger::initialize((0..count).map(|i| format!("P{}", i + 1))).unwrap()
    }

    #[test]
    fn rejects_roster_smaller_than_round() {
        let err = MixerState::with_seed(
            ledger(7),
            RoundShape::new(1, 8, 4),
            MatchupStrategy::Exhaustive,
            1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RoundError::InsufficientParticipants {
                required: 8,
                available: 7
            }
        );
    }

    #[test]
    fn oversized_exhaustive_search_is_rejected_up_front() {
        let err = MixerState::with_seed(
            ledger(80),
            RoundShape::new(1, 80, 40),
            MatchupStrategy::Exhaustive,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, RoundError::SearchTooLarge { team_size: 40, .. }));

        let mut greedy = MixerState::with_seed(
            ledger(80),
            RoundShape::new(1, 80, 40),
            MatchupStrategy::Greedy,
            1,
        )
        .unwrap();
        let record = greedy.play_round().unwrap();
        assert_eq!(record.matchups[0].matchup.len(), 80);
    }

    #[test]
    fn same_seed_replays_same_schedule() {
        let play = |seed| {
            let mut state = MixerState::with_seed(
                ledger(12),
                RoundShape::new(1, 8, 4),
                MatchupStrategy::Exhaustive,
                seed,
            )
            .unwrap();
            (0..4)
                .map(|_| state.play_round().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(play(11), play(11));
    }

    #[test]
    fn rounds_balance_games_played() {
        let mut state = MixerState::with_seed(
            ledger(12),
            RoundShape::new(1, 8, 4),
            MatchupStrategy::Exhaustive,
            5,
        )
        .unwrap();
        for expected in 1..=3 {
            let record = state.play_round().unwrap();
            assert_eq!(record.number, expected);
        }
        // 3 rounds x 8 seats over 12 players: everyone plays exactly twice.
        assert!(
            state
                .ledger()
                .participants()
                .iter()
                .all(|p| p.games_played() == 2)
        );
        assert_eq!(state.rounds_played(), 3);
    }

    #[test]
    fn greedy_strategy_runs_full_rounds() {
        let mut state = MixerState::with_seed(
            ledger(16),
            RoundShape::new(2, 8, 4),
            MatchupStrategy::Greedy,
            3,
        )
        .unwrap();
        let record = state.play_round().unwrap();
        assert_eq!(record.matchups.len(), 2);
        let total_games: u32 = state
            .ledger()
            .participants()
            .iter()
            .map(|p| p.games_played())
            .sum();
        assert_eq!(total_games, 16);
    }
}
