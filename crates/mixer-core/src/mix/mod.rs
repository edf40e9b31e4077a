pub mod commit;
pub mod optimizer;
pub mod ordering;
pub mod partition;
pub mod scoring;
pub mod solver;

pub use commit::commit_round;
pub use optimizer::{RoundError, RoundShape, optimize_round, optimize_round_with};
pub use ordering::order_pool;
pub use partition::{MAX_CANDIDATES_PER_SLICE, TeamPartitions, binomial, combinations, distinct_matchups, generate_teams};
pub use scoring::{MatchupScore, ScoredMatchup, score_matchup, score_matchup_breakdown, score_team};
pub use solver::{ExhaustiveSolver, GreedySolver, MatchupSolver, MatchupStrategy};
