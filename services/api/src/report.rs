use crate::infra::{build_engine, parse_timeframe};
use chrono::Local;
use clap::Args;
use kpi_scorecard::config::AppConfig;
use kpi_scorecard::error::AppError;
use kpi_scorecard::scorecard::{
    write_score_matrix, FileSnapshotStore, RuleBook, ScoreView, ScorecardServiceError,
    ScoringEngine, SnapshotStore, StoredSnapshot, Timeframe, YearSnapshot,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Snapshot file written by the dashboard or `init`
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Rollup window: ytd, month:<0-11> or quarter:<0-3>
    #[arg(long, value_parser = parse_timeframe, default_value = "ytd")]
    pub(crate) timeframe: Timeframe,
    /// Also export the manager x objective score matrix as CSV
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct InitArgs {
    /// Where to write the default snapshot
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Replace an existing snapshot file
    #[arg(long)]
    pub(crate) force: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        timeframe,
        csv,
    } = args;

    let config = AppConfig::load()?;
    let engine = build_engine(&config.scoring)?;
    let raw = std::fs::read_to_string(&snapshot)?;
    let year = engine.hydrate(&raw);
    let view = engine.view(&year);

    render_report(&view, timeframe);

    if let Some(path) = csv {
        let writer = BufWriter::new(File::create(&path)?);
        write_score_matrix(&view, timeframe, writer)?;
        println!("\nScore matrix written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_init(args: InitArgs) -> Result<(), AppError> {
    let InitArgs { output, force } = args;
    if output.exists() && !force {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists; pass --force to replace it", output.display()),
        )));
    }

    let engine = ScoringEngine::standard();
    let payload = default_payload(&engine)?;
    FileSnapshotStore::new(output.clone()).save(StoredSnapshot::new(payload))?;
    println!("Default snapshot written to {}", output.display());
    Ok(())
}

fn default_payload(engine: &ScoringEngine) -> Result<String, AppError> {
    let snapshot: YearSnapshot = engine.initialize();
    let payload = snapshot.to_json().map_err(ScorecardServiceError::from)?;
    Ok(payload)
}

/// Prints the ranking and per-objective team averages.
///
/// Scores follow the engine's zero policy: with the standard catalog a closed
/// month with nothing entered already rates Performance at 25.
pub(crate) fn render_report<R: RuleBook>(view: &ScoreView<'_, R>, timeframe: Timeframe) {
    println!(
        "KPI ranking | {} | generated {}",
        timeframe.label(),
        Local::now().format("%Y-%m-%d %H:%M")
    );

    for entry in view.rank(timeframe) {
        let closed = view.closed_months(&entry.manager_id, timeframe).len();
        println!(
            "{:>2}. {:<20} {:>3}%  {:<12} ({} closed month{})",
            entry.rank,
            entry.manager_name,
            entry.score,
            entry.heat_band.label(),
            closed,
            if closed == 1 { "" } else { "s" }
        );
    }

    println!("\nObjective averages");
    for axis in view.radar(timeframe) {
        let total: u32 = axis.scores.iter().map(|score| u32::from(score.score)).sum();
        let count = axis.scores.len().max(1) as u32;
        let best = axis.scores.iter().max_by_key(|score| score.score);
        match best {
            Some(best) if best.score > 0 => println!(
                "- {}: {}% team average | best {} at {}%",
                axis.objective_name,
                (total + count / 2) / count,
                best.manager_id,
                best.score
            ),
            _ => println!("- {}: no closed months yet", axis.objective_name),
        }
    }
}
