use crate::model::participant::ParticipantId;
use crate::model::team::{Matchup, Team};

/// Largest candidate list the exhaustive search will build for one slice.
pub const MAX_CANDIDATES_PER_SLICE: usize = 1_000_000;

/// Every `size`-element subset of `pool`, preserving pool order inside each
/// subset. Subsets come out in lexicographic order of pool positions.
///
/// A pool smaller than `size` has no subsets.
pub fn combinations<T: Clone>(pool: &[T], size: usize) -> Vec<Vec<T>> {
    let mut output =
        Vec::with_capacity(binomial(pool.len(), size).min(MAX_CANDIDATES_PER_SLICE));
    let mut partial = Vec::with_capacity(size);
    generate(pool, 0, size, &mut partial, &mut output);
    output
}

fn generate<T: Clone>(
    pool: &[T],
    start: usize,
    size: usize,
    partial: &mut Vec<T>,
    output: &mut Vec<Vec<T>>,
) {
    if partial.len() == size {
        output.push(partial.clone());
        return;
    }

    // Stop once fewer candidates remain than open seats.
    let needed = size - partial.len();
    let Some(last_start) = pool.len().checked_sub(needed) else {
        return;
    };

    for idx in start..=last_start {
        partial.push(pool[idx].clone());
        generate(pool, idx + 1, size, partial, output);
        partial.pop();
    }
}

/// n choose k, saturating on overflow.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: usize = 1;
    for i in 0..k {
        result = match result.checked_mul(n - i) {
            Some(value) => value / (i + 1),
            None => return usize::MAX,
        };
    }
    result
}

/// One side of every possible split of `pool` into teams of `team_size`.
pub fn generate_teams(pool: &[ParticipantId], team_size: usize) -> Vec<Team> {
    combinations(pool, team_size)
        .into_iter()
        .map(Team::new)
        .collect()
}

/// Candidate splits for a single matchup slice.
///
/// Only one side of each split is stored; the opposing team is derived from
/// the pool on demand. Side-swapped duplicates are kept, so a pool of `2k`
/// yields C(2k, k) candidates.
#[derive(Debug, Clone)]
pub struct TeamPartitions {
    pool: Vec<ParticipantId>,
    sides: Vec<Team>,
}

impl TeamPartitions {
    pub fn new(pool: &[ParticipantId], team_size: usize) -> Self {
        Self {
            pool: pool.to_vec(),
            sides: generate_teams(pool, team_size),
        }
    }

    pub fn pool(&self) -> &[ParticipantId] {
        &self.pool
    }

    pub fn sides(&self) -> &[Team] {
        &self.sides
    }

    pub fn len(&self) -> usize {
        self.sides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    pub fn matchups(&self) -> impl Iterator<Item = Matchup> + '_ {
        self.sides
            .iter()
            .map(|side| Matchup::from_side(&self.pool, side.clone()))
    }
}

/// Number of candidates that remain once side-swapped duplicates are folded.
pub fn distinct_matchups(candidates: &[Matchup]) -> usize {
    candidates
        .iter()
        .enumerate()
        .filter(|(idx, candidate)| {
            !candidates[..*idx]
                .iter()
                .any(|earlier| earlier.is_equivalent(candidate))
        })
        .count()
}
