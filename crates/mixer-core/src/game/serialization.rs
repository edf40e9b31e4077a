use crate::model::ledger::{LedgerError, PairingLedger};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantSnapshot {
    pub name: String,
    pub games_played: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PairSnapshot {
    pub a: String,
    pub b: String,
    pub count: u32,
}

/// Name-keyed dump of a ledger, written as a report artefact at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub rounds_played: u32,
    pub participants: Vec<ParticipantSnapshot>,
    pub pairs: Vec<PairSnapshot>,
}

impl LedgerSnapshot {
    pub fn capture(ledger: &PairingLedger, rounds_played: u32) -> Result<Self, LedgerError> {
        let participants = ledger
            .participants()
            .iter()
            .map(|p| ParticipantSnapshot {
                name: p.name().to_string(),
                games_played: p.games_played(),
            })
            .collect();

        let mut pairs = Vec::new();
        for (key, count) in ledger.pairs() {
            pairs.push(PairSnapshot {
                a: ledger.name(key.low())?.to_string(),
                b: ledger.name(key.high())?.to_string(),
                count,
            });
        }

        Ok(Self {
            rounds_played,
            participants,
            pairs,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
