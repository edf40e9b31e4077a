use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::ledger::PairingLedger;
use crate::model::participant::{Participant, ParticipantId};

/// Roster order for the next round: shuffled, then stably sorted so the
/// participants with the fewest games come first. The shuffle only breaks ties.
pub fn order_pool<R: Rng + ?Sized>(ledger: &PairingLedger, rng: &mut R) -> Vec<ParticipantId> {
    let mut pool: Vec<&Participant> = ledger.participants().iter().collect();
    pool.shuffle(rng);
    pool.sort_by_key(|participant| participant.games_played());
    pool.into_iter().map(Participant::id).collect()
}
