use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use boxscore_prep::PipelineConfig;
use boxscore_prep::aggregate::load_all;
use boxscore_prep::eligibility::filter_established;
use boxscore_prep::features::{ImputationAudit, synthesize};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cfg = PipelineConfig::default();
    cfg.validate().context("invalid pipeline config")?;
    let records = load_all(&cfg.input_paths).context("load box-score batches")?;
    let (eligible, summary) = filter_established(records, &cfg);
    let features = synthesize(eligible, &cfg);
    let audit = ImputationAudit::from_records(&features);

    println!("Feature imputation audit");
    println!(
        "Players: {} retained / {} total, rows: {}",
        summary.players_retained, summary.players_total, audit.rows
    );
    println!();
    if audit.defaults.is_empty() {
        println!("No default-filled values.");
        return Ok(());
    }
    for (column, count) in &audit.defaults {
        let share = if audit.rows == 0 {
            0.0
        } else {
            *count as f64 / audit.rows as f64 * 100.0
        };
        println!("{column:<32} {count:>9} ({share:.2}%)");
    }
    Ok(())
}
