use crate::model::participant::{Participant, ParticipantId};
use crate::model::team::Team;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Normalized key for an unordered pair: the lower id always comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: ParticipantId,
    high: ParticipantId,
}

impl PairKey {
    /// Returns `None` for a participant paired with itself.
    pub fn new(a: ParticipantId, b: ParticipantId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> ParticipantId {
        self.low
    }

    pub fn high(&self) -> ParticipantId {
        self.high
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("pairing ledger is inconsistent: no entry for {a} and {b}")]
    MissingPair { a: ParticipantId, b: ParticipantId },
    #[error("participant {0} is not registered in the ledger")]
    UnknownParticipant(ParticipantId),
    #[error("participant '{0}' is registered more than once")]
    DuplicateName(String),
    #[error("participant names must not be empty")]
    EmptyName,
}

/// Teammate history for a fixed roster.
///
/// Every pair of distinct participants gets an explicit entry at
/// initialization and nothing can be registered afterwards, so a failed
/// lookup always means the ledger was handed an id it never issued.
#[derive(Debug, Clone, Default)]
pub struct PairingLedger {
    participants: Vec<Participant>,
    by_name: HashMap<String, ParticipantId>,
    pairs: BTreeMap<PairKey, u32>,
}

impl PairingLedger {
    pub fn initialize<I, S>(names: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut participants = Vec::new();
        let mut by_name = HashMap::new();

        for name in names {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(LedgerError::EmptyName);
            }
            let id = ParticipantId::from_index(participants.len());
            if by_name.insert(name.clone(), id).is_some() {
                return Err(LedgerError::DuplicateName(name));
            }
            participants.push(Participant::new(id, name));
        }

        let mut pairs = BTreeMap::new();
        for i in 0..participants.len() {
            for j in (i + 1)..participants.len() {
                if let Some(key) = PairKey::new(participants[i].id(), participants[j].id()) {
                    pairs.insert(key, 0);
                }
            }
        }

        Ok(Self {
            participants,
            by_name,
            pairs,
        })
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().map(Participant::id)
    }

    pub fn participant(&self, id: ParticipantId) -> Result<&Participant, LedgerError> {
        self.participants
            .get(id.index())
            .ok_or(LedgerError::UnknownParticipant(id))
    }

    pub fn id_of(&self, name: &str) -> Option<ParticipantId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ParticipantId) -> Result<&str, LedgerError> {
        self.participant(id).map(Participant::name)
    }

    pub fn team_names(&self, team: &Team) -> Result<Vec<&str>, LedgerError> {
        team.members().iter().map(|id| self.name(*id)).collect()
    }

    pub fn get(&self, a: ParticipantId, b: ParticipantId) -> Result<u32, LedgerError> {
        PairKey::new(a, b)
            .and_then(|key| self.pairs.get(&key).copied())
            .ok_or(LedgerError::MissingPair { a, b })
    }

    pub fn increment(&mut self, a: ParticipantId, b: ParticipantId) -> Result<(), LedgerError> {
        let count = PairKey::new(a, b)
            .and_then(|key| self.pairs.get_mut(&key))
            .ok_or(LedgerError::MissingPair { a, b })?;
        *count += 1;
        Ok(())
    }

    pub fn games_played(&self, id: ParticipantId) -> Result<u32, LedgerError> {
        self.participant(id).map(Participant::games_played)
    }

    pub fn record_game(&mut self, id: ParticipantId) -> Result<(), LedgerError> {
        self.participants
            .get_mut(id.index())
            .ok_or(LedgerError::UnknownParticipant(id))?
            .record_game();
        Ok(())
    }

    pub fn pairs(&self) -> impl Iterator<Item = (PairKey, u32)> + '_ {
        self.pairs.iter().map(|(key, count)| (*key, *count))
    }

    pub fn max_pair_count(&self) -> u32 {
        self.pairs.values().copied().max().unwrap_or(0)
    }

    /// Everyone `id` has shared a team with at least once, with the count.
    pub fn teammates_of(&self, id: ParticipantId) -> Result<Vec<(ParticipantId, u32)>, LedgerError> {
        self.participant(id)?;
        let mut teammates = Vec::new();
        for other in self.ids().filter(|other| *other != id) {
            let count = self.get(id, other)?;
            if count > 0 {
                teammates.push((other, count));
            }
        }
        Ok(teammates)
    }
}

#[cfg(test)]
mod tests {
    use super::{LedgerError, PairKey, PairingLedger};
    use crate::model::participant::ParticipantId;

    fn id(index: usize) -> ParticipantId {
        ParticipantId::from_index(index)
    }

    #[test]
    fn initialize_creates_zeroed_entry_for_every_pair() {
        let ledger = PairingLedger::initialize(["a", "b", "c", "d"]).unwrap();
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.pairs().count(), 6);
        assert!(ledger.pairs().all(|(_, count)| count == 0));
    }

    #[test]
    fn pair_key_normalizes_order() {
        let forward = PairKey::new(id(1), id(3)).unwrap();
        let backward = PairKey::new(id(3), id(1)).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.low(), id(1));
        assert!(PairKey::new(id(2), id(2)).is_none());
    }

    #[test]
    fn increment_is_symmetric() {
        let mut ledger = PairingLedger::initialize(["a", "b", "c"]).unwrap();
        ledger.increment(id(2), id(0)).unwrap();
        ledger.increment(id(0), id(2)).unwrap();
        assert_eq!(ledger.get(id(0), id(2)).unwrap(), 2);
        assert_eq!(ledger.get(id(2), id(0)).unwrap(), 2);
        assert_eq!(ledger.get(id(0), id(1)).unwrap(), 0);
        assert_eq!(ledger.max_pair_count(), 2);
    }

    #[test]
    fn missing_pair_is_an_error_not_zero() {
        let ledger = PairingLedger::initialize(["a", "b"]).unwrap();
        assert_eq!(
            ledger.get(id(0), id(5)),
            Err(LedgerError::MissingPair { a: id(0), b: id(5) })
        );
        assert_eq!(
            ledger.get(id(1), id(1)),
            Err(LedgerError::MissingPair { a: id(1), b: id(1) })
        );
    }

    #[test]
    fn rejects_duplicate_and_empty_names() {
        assert_eq!(
            PairingLedger::initialize(["a", "b", "a"]).unwrap_err(),
            LedgerError::DuplicateName("a".to_string())
        );
        assert_eq!(
            PairingLedger::initialize(["a", "  "]).unwrap_err(),
            LedgerError::EmptyName
        );
    }

    #[test]
    fn games_played_counts_per_participant() {
        let mut ledger = PairingLedger::initialize(["a", "b"]).unwrap();
        ledger.record_game(id(1)).unwrap();
        assert_eq!(ledger.games_played(id(0)).unwrap(), 0);
        assert_eq!(ledger.games_played(id(1)).unwrap(), 1);
        assert_eq!(
            ledger.record_game(id(9)),
            Err(LedgerError::UnknownParticipant(id(9)))
        );
    }

    #[test]
    fn lookups_by_name_and_teammates() {
        let mut ledger = PairingLedger::initialize(["ada", "bob", "cy"]).unwrap();
        let bob = ledger.id_of("bob").unwrap();
        assert_eq!(ledger.name(bob).unwrap(), "bob");
        assert!(ledger.id_of("dee").is_none());

        ledger.increment(bob, id(2)).unwrap();
        assert_eq!(ledger.teammates_of(bob).unwrap(), vec![(id(2), 1)]);
    }
}
