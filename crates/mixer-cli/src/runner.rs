use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use mixer_core::game::mixer_state::{MixerState, RoundRecord};
use mixer_core::game::serialization::LedgerSnapshot;
use mixer_core::mix::RoundError;
use mixer_core::model::ledger::{LedgerError, PairingLedger};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{MixerConfig, ResolvedOutputs};
use crate::logging::telemetry_dir;
use crate::report::{matchup_rows, render_schedule, render_summary_markdown};
use crate::roster::{RosterError, load_roster};

/// Primary entry point for producing a schedule.
pub struct MixerRunner {
    config: MixerConfig,
    outputs: ResolvedOutputs,
    state: MixerState,
    logging_enabled: bool,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub rounds_played: u32,
    pub matchups_written: usize,
    pub participants: usize,
    pub max_pair_repeat: u32,
    pub teams_path: PathBuf,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub ledger_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
}

impl MixerRunner {
    /// Read the roster and build the ledger for a validated configuration.
    pub fn new(config: MixerConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let names = load_roster(&config.roster.path)?;
        let ledger = PairingLedger::initialize(names)?;
        Self::with_ledger(config, outputs, ledger)
    }

    pub fn with_ledger(
        config: MixerConfig,
        outputs: ResolvedOutputs,
        ledger: PairingLedger,
    ) -> Result<Self, RunnerError> {
        let shape = config.schedule.shape();
        let seed = config.schedule.seed.unwrap_or(0);
        let state = MixerState::with_seed(ledger, shape, config.schedule.strategy, seed)?;

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            state,
        })
    }

    pub fn state(&self) -> &MixerState {
        &self.state
    }

    /// Play every configured round, streaming JSONL rows to disk.
    ///
    /// Rows go to `<jsonl>.partial` first and are renamed into place only once
    /// every other artefact is written. A failed run leaves no `rounds.jsonl`.
    pub fn run(mut self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.teams_txt.parent())?;
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let partial_path = partial_path(&self.outputs.jsonl);
        let result = self.write_artifacts(&partial_path);
        match result {
            Ok(summary) => {
                fs::rename(&partial_path, &self.outputs.jsonl)?;
                Ok(summary)
            }
            Err(err) => {
                let _ = fs::remove_file(&partial_path);
                Err(err)
            }
        }
    }

    fn write_artifacts(&mut self, jsonl_path: &Path) -> Result<RunSummary, RunnerError> {
        let mut writer = BufWriter::new(File::create(jsonl_path)?);
        let mut records = Vec::with_capacity(self.config.schedule.rounds);
        let mut matchups_written = 0usize;

        for _ in 0..self.config.schedule.rounds {
            let record = self.state.play_round()?;
            let ledger = self.state.ledger();

            for row in matchup_rows(&self.config.run_id, ledger, &record)? {
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
                matchups_written += 1;
            }

            if self.logging_enabled && tracing::enabled!(target: "team_mixer::matchup", Level::INFO)
            {
                log_round(&self.config.run_id, ledger, &record)?;
            }

            records.push(record);
        }

        writer.flush()?;
        drop(writer);

        let ledger = self.state.ledger();
        fs::write(&self.outputs.teams_txt, render_schedule(ledger, &records)?)?;
        fs::write(
            &self.outputs.summary_md,
            render_summary_markdown(&self.config.run_id, ledger, &records)?,
        )?;

        let ledger_path = match self.outputs.ledger_json.as_ref() {
            Some(path) => {
                ensure_parent(path.parent())?;
                let snapshot = LedgerSnapshot::capture(ledger, self.state.rounds_played())?;
                fs::write(path, snapshot.to_json()?)?;
                Some(path.clone())
            }
            None => None,
        };

        let telemetry_path = if self.logging_enabled {
            Some(telemetry_dir(&self.outputs).join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            rounds_played: self.state.rounds_played(),
            matchups_written,
            participants: ledger.len(),
            max_pair_repeat: ledger.max_pair_count(),
            teams_path: self.outputs.teams_txt.clone(),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            ledger_path,
            telemetry_path,
        })
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn log_round(run_id: &str, ledger: &PairingLedger, record: &RoundRecord) -> Result<(), LedgerError> {
    for (matchup_index, entry) in record.matchups.iter().enumerate() {
        let team_a = ledger.team_names(entry.matchup.first())?.join(",");
        let team_b = ledger.team_names(entry.matchup.second())?.join(",");
        event!(
            target: "team_mixer::matchup",
            Level::INFO,
            run_id = %run_id,
            round = record.number,
            matchup_index = matchup_index as u32,
            team_a = %team_a,
            team_b = %team_b,
            score = entry.score.total()
        );
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Roster(#[from] RosterError),
    #[error("pairing ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("round failed: {0}")]
    Round(#[from] RoundError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize output: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
