use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::box_score::{GameRecord, RawBoxScore};
use crate::error::{PrepError, Result};

/// Parses one CSV batch. Unknown columns are ignored; a row that does not fit
/// the box-score shape fails the whole batch.
pub fn read_batch<R: Read>(reader: R, source_name: &str) -> Result<Vec<GameRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for row in csv_reader.deserialize::<RawBoxScore>() {
        let raw = row.map_err(|err| PrepError::format(source_name, err.to_string()))?;
        out.push(GameRecord::from_raw(raw, source_name)?);
    }
    debug!(source = source_name, rows = out.len(), "parsed batch");
    Ok(out)
}

pub fn load_batch(path: &Path) -> Result<Vec<GameRecord>> {
    let file = File::open(path).map_err(|source| PrepError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_batch(file, &path.display().to_string())
}

/// Concatenates batches into one collection. Batch order is irrelevant to
/// later stages, which re-sort by (player, date).
pub fn aggregate<I>(batches: I) -> Result<Vec<GameRecord>>
where
    I: IntoIterator<Item = Vec<GameRecord>>,
{
    let mut seen = HashSet::new();
    let mut combined = Vec::new();
    for batch in batches {
        for record in batch {
            if !seen.insert((record.player_id, record.game_id)) {
                return Err(PrepError::format(
                    "aggregated batches",
                    format!(
                        "duplicate record for player {} in game {}",
                        record.player_id, record.game_id
                    ),
                ));
            }
            combined.push(record);
        }
    }
    Ok(combined)
}

pub fn load_all(paths: &[impl AsRef<Path>]) -> Result<Vec<GameRecord>> {
    let mut batches = Vec::with_capacity(paths.len());
    for path in paths {
        let batch = load_batch(path.as_ref())?;
        info!(path = %path.as_ref().display(), rows = batch.len(), "loaded box-score batch");
        batches.push(batch);
    }
    aggregate(batches)
}
