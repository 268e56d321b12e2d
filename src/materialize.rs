use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{PrepError, Result};
use crate::features::ImputationAudit;
use crate::split::{DatasetSplit, Partition};
use crate::table::FeatureTable;

pub const MANIFEST_FILE: &str = "manifest.json";
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartitionManifest {
    pub partition: Partition,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub full: WrittenFile,
    pub sample: WrittenFile,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub version: u32,
    pub generated_at: String,
    pub config: PipelineConfig,
    pub columns: Vec<String>,
    pub partitions: Vec<PartitionManifest>,
    pub imputation: ImputationAudit,
}

pub fn full_file_name(partition: Partition) -> String {
    format!("{}_data.csv", partition.label())
}

pub fn sample_file_name(partition: Partition) -> String {
    format!("sample_{}_data.csv", partition.label())
}

pub fn sample_size(cfg: &PipelineConfig, partition: Partition) -> usize {
    match partition {
        Partition::Train => cfg.sample_sizes.train,
        Partition::Validation => cfg.sample_sizes.validation,
        Partition::Test => cfg.sample_sizes.test,
    }
}

pub fn encode_csv(table: &FeatureTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let to_io = |err: csv::Error| PrepError::Io {
        path: PathBuf::from("<csv buffer>"),
        source: io::Error::from(err),
    };
    writer.write_record(table.columns()).map_err(to_io)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|c| c.to_string()))
            .map_err(to_io)?;
    }
    writer.into_inner().map_err(|err| PrepError::Io {
        path: PathBuf::from("<csv buffer>"),
        source: err.into_error(),
    })
}

pub fn write_table(table: &FeatureTable, path: &Path) -> Result<WrittenFile> {
    let bytes = encode_csv(table)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| PrepError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let tmp = path.with_extension("csv.tmp");
    fs::write(&tmp, &bytes)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|source| PrepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), rows = table.len(), "wrote partition file");
    Ok(WrittenFile {
        path: path.to_path_buf(),
        rows: table.len(),
        sha256: format!("{:x}", Sha256::digest(&bytes)),
    })
}

/// Uniform sample without replacement. Sampled rows keep their relative
/// order from `table`.
pub fn sample_rows<R: Rng + ?Sized>(
    table: &FeatureTable,
    n: usize,
    rng: &mut R,
) -> Result<FeatureTable> {
    if n > table.len() {
        return Err(PrepError::Config(format!(
            "sample of {n} rows requested from a partition of {}",
            table.len()
        )));
    }
    let mut indices = rand::seq::index::sample(rng, table.len(), n).into_vec();
    indices.sort_unstable();
    Ok(table.select_rows(&indices))
}

/// Writes each partition and its sample, returning one manifest entry per
/// partition. Date bounds must be captured by the caller before the split
/// key is stripped.
pub fn materialize<R: Rng + ?Sized>(
    split: &DatasetSplit,
    bounds: &[(Partition, Option<(NaiveDate, NaiveDate)>)],
    cfg: &PipelineConfig,
    rng: &mut R,
) -> Result<Vec<PartitionManifest>> {
    // Check every sample size before touching the filesystem.
    for partition in Partition::ALL {
        let wanted = sample_size(cfg, partition);
        let available = split.get(partition).len();
        if wanted > available {
            return Err(PrepError::Config(format!(
                "{} sample of {wanted} rows exceeds partition size {available}",
                partition.label()
            )));
        }
    }

    let mut out = Vec::with_capacity(Partition::ALL.len());
    for partition in Partition::ALL {
        let table = split.get(partition);
        let full = write_table(table, &cfg.output_path(&full_file_name(partition)))?;
        let sampled = sample_rows(table, sample_size(cfg, partition), rng)?;
        let sample = write_table(&sampled, &cfg.sample_path(&sample_file_name(partition)))?;
        let range = bounds
            .iter()
            .find(|(p, _)| *p == partition)
            .and_then(|(_, r)| *r);
        out.push(PartitionManifest {
            partition,
            first_date: range.map(|(first, _)| first),
            last_date: range.map(|(_, last)| last),
            full,
            sample,
        });
    }
    Ok(out)
}

pub fn write_manifest(manifest: &RunManifest, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest).map_err(|err| PrepError::Io {
        path: path.clone(),
        source: io::Error::other(err),
    })?;
    fs::write(&path, json).map_err(|source| PrepError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

pub fn new_manifest(
    cfg: &PipelineConfig,
    columns: Vec<String>,
    partitions: Vec<PartitionManifest>,
    imputation: ImputationAudit,
) -> RunManifest {
    RunManifest {
        version: MANIFEST_VERSION,
        generated_at: chrono::Utc::now().to_rfc3339(),
        config: cfg.clone(),
        columns,
        partitions,
        imputation,
    }
}
