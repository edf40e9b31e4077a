//! Human-readable and machine-readable renderings of a finished schedule.

use std::fmt::Write as _;

use mixer_core::AppInfo;
use mixer_core::game::mixer_state::RoundRecord;
use mixer_core::model::ledger::{LedgerError, PairingLedger};
use mixer_core::model::team::Team;
use serde::Serialize;

/// One JSONL row per chosen matchup.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchupRow {
    pub run_id: String,
    pub matchup_id: String,
    pub round: u32,
    pub matchup_index: usize,
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
    pub score_a: u32,
    pub score_b: u32,
    pub score: u32,
}

pub fn matchup_rows(
    run_id: &str,
    ledger: &PairingLedger,
    record: &RoundRecord,
) -> Result<Vec<MatchupRow>, LedgerError> {
    record
        .matchups
        .iter()
        .enumerate()
        .map(|(matchup_index, entry)| -> Result<MatchupRow, LedgerError> {
            Ok(MatchupRow {
                run_id: run_id.to_string(),
                matchup_id: format!("R{:03}_M{:02}", record.number, matchup_index),
                round: record.number,
                matchup_index,
                team_a: owned_names(ledger, entry.matchup.first())?,
                team_b: owned_names(ledger, entry.matchup.second())?,
                score_a: entry.score.first,
                score_b: entry.score.second,
                score: entry.score.total(),
            })
        })
        .collect()
}

fn owned_names(
    ledger: &PairingLedger,
    team: &Team,
) -> Result<Vec<String>, LedgerError> {
    Ok(ledger
        .team_names(team)?
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Plain-text schedule: one block per round, team numbers running across the
/// round so every side has its own label.
pub fn render_schedule(
    ledger: &PairingLedger,
    records: &[RoundRecord],
) -> Result<String, LedgerError> {
    let mut out = String::new();
    let _ = writeln!(out, "\n====== {} Schedule ======", AppInfo::title());
    for record in records {
        let _ = writeln!(out, "\n--- Round {} ---", record.number);
        for (idx, entry) in record.matchups.iter().enumerate() {
            let first = ledger.team_names(entry.matchup.first())?.join(", ");
            let second = ledger.team_names(entry.matchup.second())?.join(", ");
            let _ = writeln!(
                out,
                "({}) [{}] vs ({}) [{}]",
                idx * 2 + 1,
                first,
                idx * 2 + 2,
                second
            );
        }
    }
    Ok(out)
}

/// Per-participant history table for the end of a run.
pub fn render_summary_markdown(
    run_id: &str,
    ledger: &PairingLedger,
    records: &[RoundRecord],
) -> Result<String, LedgerError> {
    let mut out = String::new();
    let total_score: u32 = records.iter().map(RoundRecord::total_score).sum();
    let repeated_pairs = ledger.pairs().filter(|(_, count)| *count > 1).count();

    let _ = writeln!(out, "# {} summary: {}\n", AppInfo::title(), run_id);
    let _ = writeln!(out, "- Rounds played: {}", records.len());
    let _ = writeln!(out, "- Participants: {}", ledger.len());
    let _ = writeln!(out, "- Accumulated familiarity: {}", total_score);
    let _ = writeln!(out, "- Most repeated pairing: {}", ledger.max_pair_count());
    let _ = writeln!(out, "- Pairs teamed more than once: {}\n", repeated_pairs);

    let _ = writeln!(
        out,
        "| Participant | Games | Distinct teammates | Most repeated partner |"
    );
    let _ = writeln!(out, "|---|---:|---:|---|");

    let mut participants: Vec<_> = ledger.participants().iter().collect();
    participants.sort_by(|a, b| a.name().cmp(b.name()));
    for participant in participants {
        let teammates = ledger.teammates_of(participant.id())?;
        let partner = match teammates.iter().max_by_key(|(_, count)| *count) {
            Some((id, count)) => format!("{} ({})", ledger.name(*id)?, count),
            None => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            participant.name(),
            participant.games_played(),
            teammates.len(),
            partner
        );
    }

    Ok(out)
}
