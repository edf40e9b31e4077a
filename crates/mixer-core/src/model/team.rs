use crate::model::participant::ParticipantId;
use std::vec::Vec;

/// One side of a matchup. Member order is the order the generator chose them in
/// and carries no meaning for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Team {
    members: Vec<ParticipantId>,
}

impl Team {
    pub fn new(members: Vec<ParticipantId>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.contains(&id)
    }

    /// Every unordered pair of distinct members, each yielded once.
    pub fn pairs(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.members
            .iter()
            .enumerate()
            .flat_map(move |(i, &a)| self.members[i + 1..].iter().map(move |&b| (a, b)))
    }

    /// The members of `pool` that are not on this team, in pool order.
    pub fn complement_in(&self, pool: &[ParticipantId]) -> Team {
        Team::new(
            pool.iter()
                .copied()
                .filter(|id| !self.contains(*id))
                .collect(),
        )
    }

    /// Order-insensitive membership comparison.
    pub fn same_members(&self, other: &Team) -> bool {
        self.len() == other.len() && self.members.iter().all(|id| other.contains(*id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    first: Team,
    second: Team,
}

impl Matchup {
    pub fn new(first: Team, second: Team) -> Self {
        Self { first, second }
    }

    /// Builds a matchup from one generated side; the other side is whatever
    /// `pool` has left.
    pub fn from_side(pool: &[ParticipantId], side: Team) -> Self {
        let second = side.complement_in(pool);
        Self::new(side, second)
    }

    pub fn first(&self) -> &Team {
        &self.first
    }

    pub fn second(&self) -> &Team {
        &self.second
    }

    pub fn teams(&self) -> [&Team; 2] {
        [&self.first, &self.second]
    }

    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.first
            .members()
            .iter()
            .chain(self.second.members())
            .copied()
    }

    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    /// Two matchups are equivalent when they split players the same way,
    /// regardless of which side is listed first.
    pub fn is_equivalent(&self, other: &Matchup) -> bool {
        (self.first.same_members(&other.first) && self.second.same_members(&other.second))
            || (self.first.same_members(&other.second) && self.second.same_members(&other.first))
    }
}

#[cfg(test)]
mod tests {
    use super::{Matchup, Team};
    use crate::model::participant::ParticipantId;

    fn ids(raw: &[usize]) -> Vec<ParticipantId> {
        raw.iter().copied().map(ParticipantId::from_index).collect()
    }

    #[test]
    fn pairs_cover_each_unordered_pair_once() {
        let team = Team::new(ids(&[0, 1, 2, 3]));
        let pairs: Vec<_> = team.pairs().map(|(a, b)| (a.index(), b.index())).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn single_member_team_has_no_pairs() {
        let team = Team::new(ids(&[4]));
        assert_eq!(team.pairs().count(), 0);
    }

    #[test]
    fn complement_preserves_pool_order() {
        let pool = ids(&[5, 3, 8, 1]);
        let team = Team::new(ids(&[3, 1]));
        assert_eq!(team.complement_in(&pool).members(), ids(&[5, 8]).as_slice());
    }

    #[test]
    fn swapped_matchups_are_equivalent() {
        let pool = ids(&[0, 1, 2, 3]);
        let a = Matchup::from_side(&pool, Team::new(ids(&[0, 1])));
        let b = Matchup::from_side(&pool, Team::new(ids(&[3, 2])));
        let c = Matchup::from_side(&pool, Team::new(ids(&[0, 2])));
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&c));
    }

    #[test]
    fn participants_lists_both_sides() {
        let matchup = Matchup::new(Team::new(ids(&[0, 1])), Team::new(ids(&[2, 3])));
        let all: Vec<_> = matchup.participants().map(|id| id.index()).collect();
        assert_eq!(all, vec![0, 1, 2, 3]);
        assert_eq!(matchup.len(), 4);
    }
}
