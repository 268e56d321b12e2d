use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::{PrepError, Result};
use crate::table::{DATE_COLUMN, FeatureTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Train,
    Validation,
    Test,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Train, Partition::Validation, Partition::Test];

    /// Half-open ranges: train `[.., t1)`, validation `[t1, t2)`, test `[t2, ..)`.
    pub fn for_date(date: NaiveDate, validation_start: NaiveDate, test_start: NaiveDate) -> Self {
        if date < validation_start {
            Partition::Train
        } else if date < test_start {
            Partition::Validation
        } else {
            Partition::Test
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Validation => "val",
            Partition::Test => "test",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit {
    pub train: FeatureTable,
    pub validation: FeatureTable,
    pub test: FeatureTable,
}

impl DatasetSplit {
    pub fn get(&self, partition: Partition) -> &FeatureTable {
        match partition {
            Partition::Train => &self.train,
            Partition::Validation => &self.validation,
            Partition::Test => &self.test,
        }
    }

    pub fn get_mut(&mut self, partition: Partition) -> &mut FeatureTable {
        match partition {
            Partition::Train => &mut self.train,
            Partition::Validation => &mut self.validation,
            Partition::Test => &mut self.test,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// First and last `game_date` of a partition, while the key is present.
    pub fn date_bounds(&self, partition: Partition) -> Option<(NaiveDate, NaiveDate)> {
        let table = self.get(partition);
        let idx = table.column_index(DATE_COLUMN)?;
        let first = table.rows().first()?.get(idx)?.as_date()?;
        let last = table.rows().last()?.get(idx)?.as_date()?;
        Some((first, last))
    }
}

/// Assigns every row to exactly one partition by its `game_date` cell. Each
/// partition is ordered by date; rows sharing a date keep their input order.
pub fn split_by_date(
    table: &FeatureTable,
    validation_start: NaiveDate,
    test_start: NaiveDate,
) -> Result<DatasetSplit> {
    if validation_start >= test_start {
        return Err(PrepError::Config(format!(
            "validation start {validation_start} must precede test start {test_start}"
        )));
    }
    let date_idx = table.column_index(DATE_COLUMN).ok_or_else(|| {
        PrepError::format("feature table", format!("missing split key column {DATE_COLUMN}"))
    })?;

    let mut buckets: [Vec<(NaiveDate, usize)>; 3] = Default::default();
    for (i, row) in table.rows().iter().enumerate() {
        let date = row.get(date_idx).and_then(|c| c.as_date()).ok_or_else(|| {
            PrepError::format("feature table", format!("row {i} has no {DATE_COLUMN} value"))
        })?;
        let slot = match Partition::for_date(date, validation_start, test_start) {
            Partition::Train => 0,
            Partition::Validation => 1,
            Partition::Test => 2,
        };
        buckets[slot].push((date, i));
    }

    let [train, validation, test] = buckets.map(|mut bucket| {
        bucket.sort_by_key(|(date, _)| *date);
        let indices: Vec<usize> = bucket.into_iter().map(|(_, i)| i).collect();
        table.select_rows(&indices)
    });
    info!(
        train = train.len(),
        validation = validation.len(),
        test = test.len(),
        "temporal split"
    );
    Ok(DatasetSplit {
        train,
        validation,
        test,
    })
}
