use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use boxscore_prep::PipelineConfig;
use boxscore_prep::pipeline;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = PipelineConfig::default();
    let summary = pipeline::run(&cfg).context("box-score preparation failed")?;

    println!("Rows loaded: {}", summary.rows_loaded);
    println!(
        "Players retained: {} of {} ({} established)",
        summary.eligibility.players_retained,
        summary.eligibility.players_total,
        summary.eligibility.players_established
    );
    for p in &summary.partitions {
        let range = match (p.first_date, p.last_date) {
            (Some(first), Some(last)) => format!("{first} -> {last}"),
            _ => "empty".to_string(),
        };
        println!(
            "{:<5} rows={:<8} range={range} file={}",
            p.partition.label(),
            p.full.rows,
            p.full.path.display()
        );
    }
    println!("manifest written: {}", summary.manifest_path.display());
    Ok(())
}
