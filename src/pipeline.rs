use std::path::PathBuf;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::aggregate::load_all;
use crate::box_score::GameRecord;
use crate::config::PipelineConfig;
use crate::eligibility::{EligibilitySummary, filter_established};
use crate::error::Result;
use crate::features::{ImputationAudit, synthesize};
use crate::leakage::{strip_leakage, strip_split_key};
use crate::materialize::{self, PartitionManifest};
use crate::split::{DatasetSplit, Partition, split_by_date};
use crate::table::FeatureTable;

/// In-memory result of every stage up to, but not including, writing.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub eligibility: EligibilitySummary,
    pub imputation: ImputationAudit,
    /// Split partitions, still carrying the `game_date` key.
    pub split: DatasetSplit,
}

impl Prepared {
    pub fn date_bounds(&self) -> Vec<(Partition, Option<(NaiveDate, NaiveDate)>)> {
        Partition::ALL
            .iter()
            .map(|p| (*p, self.split.date_bounds(*p)))
            .collect()
    }

    /// Final model-ready partitions with the split key removed.
    pub fn into_model_split(self) -> DatasetSplit {
        let mut split = self.split;
        for p in Partition::ALL {
            strip_split_key(split.get_mut(p));
        }
        split
    }
}

pub fn prepare(records: Vec<GameRecord>, cfg: &PipelineConfig) -> Result<Prepared> {
    cfg.validate()?;
    let (eligible, eligibility) = filter_established(records, cfg);
    let features = synthesize(eligible, cfg);
    let imputation = ImputationAudit::from_records(&features);

    let mut table = FeatureTable::from_features(&features, &cfg.rolling_windows);
    strip_leakage(&mut table);
    let split = split_by_date(&table, cfg.validation_start, cfg.test_start)?;
    Ok(Prepared {
        eligibility,
        imputation,
        split,
    })
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub eligibility: EligibilitySummary,
    pub partitions: Vec<PartitionManifest>,
    pub manifest_path: PathBuf,
}

pub fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    cfg.validate()?;
    let records = load_all(&cfg.input_paths)?;
    let rows_loaded = records.len();
    info!(rows = rows_loaded, "total rows before cleaning");

    let prepared = prepare(records, cfg)?;
    info!(rows = prepared.split.total_rows(), "total rows after cleaning");

    let bounds = prepared.date_bounds();
    let eligibility = prepared.eligibility.clone();
    let imputation = prepared.imputation.clone();
    let split = prepared.into_model_split();

    let mut rng = match cfg.sample_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let partitions = materialize::materialize(&split, &bounds, cfg, &mut rng)?;

    let manifest = materialize::new_manifest(
        cfg,
        split.train.columns().to_vec(),
        partitions.clone(),
        imputation,
    );
    let manifest_path = materialize::write_manifest(&manifest, &cfg.output_dir)?;
    info!(path = %manifest_path.display(), "wrote run manifest");

    Ok(RunSummary {
        rows_loaded,
        eligibility,
        partitions,
        manifest_path,
    })
}
