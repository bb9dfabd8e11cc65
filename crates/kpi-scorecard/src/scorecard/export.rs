use std::io::Write;

use super::catalog::RuleBook;
use super::domain::Timeframe;
use super::engine::ScoreView;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write score matrix: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush score matrix: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes one row per manager: every objective rollup for `timeframe` plus the global score.
pub fn write_score_matrix<R, W>(
    view: &ScoreView<'_, R>,
    timeframe: Timeframe,
    writer: W,
) -> Result<(), ExportError>
where
    R: RuleBook,
    W: Write,
{
    let engine = view.engine();
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["manager_id".to_string(), "manager_name".to_string()];
    header.extend(engine.objectives().iter().map(|objective| objective.id.clone()));
    header.push("global".to_string());
    csv.write_record(&header)?;

    for manager in engine.roster().iter() {
        let mut row = vec![manager.id.clone(), manager.name.clone()];
        row.extend(
            engine
                .objectives()
                .iter()
                .map(|objective| view.aggregate(&manager.id, &objective.id, timeframe).to_string()),
        );
        row.push(view.global_score(&manager.id, timeframe).to_string());
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}
