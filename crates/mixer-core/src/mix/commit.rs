use std::collections::HashSet;

use super::optimizer::RoundError;
use crate::model::ledger::PairingLedger;
use crate::model::team::Matchup;

/// Folds a finalized round into the ledger.
///
/// Every intra-team pair is incremented once and every participant gets one
/// game. The round is checked in full before anything is written, so on error
/// the ledger is left as it was.
pub fn commit_round<'a, I>(ledger: &mut PairingLedger, matchups: I) -> Result<(), RoundError>
where
    I: IntoIterator<Item = &'a Matchup>,
{
    let matchups: Vec<&Matchup> = matchups.into_iter().collect();

    let mut seen = HashSet::new();
    for matchup in &matchups {
        for id in matchup.participants() {
            ledger.participant(id)?;
            if !seen.insert(id) {
                return Err(RoundError::DuplicateParticipant(id));
            }
        }
        for team in matchup.teams() {
            for (a, b) in team.pairs() {
                ledger.get(a, b)?;
            }
        }
    }

    for matchup in &matchups {
        for team in matchup.teams() {
            for (a, b) in team.pairs() {
                ledger.increment(a, b)?;
            }
        }
        for id in matchup.participants() {
            ledger.record_game(id)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mix::scoring::score_matchup;
    use crate::model::participant::ParticipantId;
    use crate::model::team::Team;

    fn id(index: usize) -> ParticipantId {
        ParticipantId::from_index(index)
    }

    fn team(raw: &[usize]) -> Team {
        Team::new(raw.iter().copied().map(id).collect())
    }

    fn ledger(count: usize) -> PairingLedger {
        PairingLedger::initialize((0..count).map(|i| format!("P{}", i + 1))).unwrap()
    }

    #[test]
    fn commit_counts_intra_team_pairs_only() {
        let mut ledger = ledger(4);
        let matchup = Matchup::new(team(&[0, 1]), team(&[2, 3]));
        commit_round(&mut ledger, [&matchup]).unwrap();

        assert_eq!(ledger.get(id(0), id(1)).unwrap(), 1);
        assert_eq!(ledger.get(id(3), id(2)).unwrap(), 1);
        assert_eq!(ledger.get(id(0), id(2)).unwrap(), 0);
        assert_eq!(ledger.get(id(1), id(3)).unwrap(), 0);
    }

    #[test]
    fn repeated_commits_raise_the_score() {
        let mut ledger = ledger(6);
        let matchup = Matchup::new(team(&[0, 1, 2]), team(&[3, 4, 5]));
        let mut previous = score_matchup(&ledger, &matchup).unwrap();
        for _ in 0..3 {
            commit_round(&mut ledger, [&matchup]).unwrap();
            let next = score_matchup(&ledger, &matchup).unwrap();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn games_played_only_changes_for_round_participants() {
        let mut ledger = ledger(12);
        let matchup = Matchup::new(team(&[3, 4, 5, 6]), team(&[7, 8, 9, 10]));
        commit_round(&mut ledger, [&matchup]).unwrap();

        let played: Vec<u32> = ledger
            .participants()
            .iter()
            .map(|p| p.games_played())
            .collect();
        assert_eq!(played, vec![0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn duplicate_participant_leaves_ledger_untouched() {
        let mut ledger = ledger(6);
        let a = Matchup::new(team(&[0, 1]), team(&[2, 3]));
        let b = Matchup::new(team(&[3, 4]), team(&[5, 0]));
        let err = commit_round(&mut ledger, [&a, &b]).unwrap_err();
        assert_eq!(err, RoundError::DuplicateParticipant(id(3)));
        assert_eq!(ledger.max_pair_count(), 0);
        assert!(ledger.participants().iter().all(|p| p.games_played() == 0));
    }

    #[test]
    fn unknown_participant_is_rejected_before_mutation() {
        let mut ledger = ledger(3);
        let matchup = Matchup::new(team(&[0, 1]), team(&[2, 7]));
        assert!(commit_round(&mut ledger, [&matchup]).is_err());
        assert_eq!(ledger.get(id(0), id(1)).unwrap(), 0);
    }
}
