use std::path::PathBuf;

use clap::Parser;

use mixer_cli::config::{MixerConfig, ResolvedOutputs};
use mixer_cli::logging::init_logging;
use mixer_cli::runner::MixerRunner;
use mixer_core::mix::MatchupStrategy;

/// Schedules tournament rounds so teammates repeat as little as possible.
#[derive(Debug, Parser)]
#[command(
    name = "team-mixer",
    author,
    version,
    about = "Familiarity-minimizing team scheduler"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config/mixer.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of rounds to schedule.
    #[arg(long, value_name = "ROUNDS")]
    rounds: Option<usize>,

    /// Override the RNG seed used to order the pool each round.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the roster file.
    #[arg(long, value_name = "FILE")]
    roster: Option<PathBuf>,

    /// Override the matchup search (exhaustive or greedy).
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<MatchupStrategy>,

    /// Exit after validating the configuration and roster (no rounds are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = MixerConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(rounds) = cli.rounds {
        config.schedule.rounds = rounds;
    }

    if let Some(seed) = cli.seed {
        config.schedule.seed = Some(seed);
    }

    if let Some(roster) = cli.roster {
        config.roster.path = roster;
    }

    if let Some(strategy) = cli.strategy {
        config.schedule.strategy = strategy;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let rounds = config.schedule.rounds;
    let matchups = config.schedule.matchups_per_round;
    let strategy = config.schedule.strategy;

    println!(
        "Loaded configuration '{run_id}': {rounds} round{} of {matchups} matchup{} ({strategy} search)",
        if rounds == 1 { "" } else { "s" },
        if matchups == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = MixerRunner::new(config, outputs)?;
    println!(
        "Roster: {} participants, seed {}",
        runner.state().ledger().len(),
        runner.state().seed()
    );

    if cli.validate_only {
        println!("Validation-only mode: schedule generation skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Schedule complete for '{run_id}': {} rounds, {} matchups, most repeated pairing {}",
        summary.rounds_played, summary.matchups_written, summary.max_pair_repeat
    );
    println!("Teams: {}", summary.teams_path.display());
    println!("Rounds (JSONL): {}", summary.jsonl_path.display());
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(ledger_path) = summary.ledger_path.as_ref() {
        println!("Ledger dump: {}", ledger_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
