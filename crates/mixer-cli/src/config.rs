use mixer_core::mix::{MatchupStrategy, RoundShape};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root mixer configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MixerConfig {
    pub run_id: String,
    pub roster: RosterConfig,
    pub schedule: ScheduleConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MixerConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: MixerConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.roster.validate()?;
        self.schedule.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            teams_txt: resolve_template(&self.run_id, &self.outputs.teams_txt),
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            ledger_json: self
                .outputs
                .ledger_json
                .as_deref()
                .map(|template| resolve_template(&self.run_id, template)),
        }
    }
}

/// Participant list source.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RosterConfig {
    pub path: PathBuf,
}

impl RosterConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "roster.path".to_string(),
                message: "roster path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Round layout and search settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    pub rounds: usize,
    pub matchups_per_round: usize,
    pub players_per_matchup: usize,
    pub players_per_team: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub strategy: MatchupStrategy,
}

impl ScheduleConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (label, value) in [
            ("schedule.rounds", self.rounds),
            ("schedule.matchups_per_round", self.matchups_per_round),
            ("schedule.players_per_team", self.players_per_team),
        ] {
            if value == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "value must be greater than zero".to_string(),
                });
            }
        }

        if self.players_per_matchup != 2 * self.players_per_team {
            return Err(ValidationError::InvalidField {
                field: "schedule.players_per_matchup".to_string(),
                message: format!(
                    "players per matchup ({}) must be exactly twice players per team ({})",
                    self.players_per_matchup, self.players_per_team
                ),
            });
        }

        self.strategy
            .check_shape(&self.shape())
            .map_err(|err| ValidationError::InvalidField {
                field: "schedule.players_per_team".to_string(),
                message: err.to_string(),
            })?;

        Ok(())
    }

    pub fn shape(&self) -> RoundShape {
        RoundShape::new(
            self.matchups_per_round,
            self.players_per_matchup,
            self.players_per_team,
        )
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub teams_txt: String,
    pub jsonl: String,
    pub summary_md: String,
    #[serde(default)]
    pub ledger_json: Option<String>,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        let mut entries = vec![
            ("outputs.teams_txt", &self.teams_txt),
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ];
        if let Some(ledger_json) = self.ledger_json.as_ref() {
            entries.push(("outputs.ledger_json", ledger_json));
        }

        for (label, value) in entries {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub teams_txt: PathBuf,
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub ledger_json: Option<PathBuf>,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
