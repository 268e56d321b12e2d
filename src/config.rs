use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Closed calendar interval; both endpoints are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSizes {
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub sample_dir: PathBuf,
    /// Players whose first game is on or after this date count as rookies.
    pub rookie_cutoff: NaiveDate,
    // Not tied to rookie_cutoff; moving one season forward means moving both.
    pub recent_window: DateRange,
    pub validation_start: NaiveDate,
    pub test_start: NaiveDate,
    pub rolling_windows: Vec<usize>,
    pub first_game_rest_days: i64,
    pub season_start_month: u32,
    pub season_span_months: u32,
    pub sample_sizes: SampleSizes,
    pub sample_seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("NBA-Data-2010-2024-main");
        Self {
            input_paths: (1..=3)
                .map(|part| {
                    data_dir.join(format!("regular_season_box_scores_2010_2024_part_{part}.csv"))
                })
                .collect(),
            output_dir: PathBuf::from("cleaned_data"),
            sample_dir: PathBuf::from("cleaned_data").join("samples"),
            rookie_cutoff: ymd(2022, 10, 1),
            recent_window: DateRange::new(ymd(2022, 1, 1), ymd(2024, 6, 30)),
            validation_start: ymd(2022, 10, 18),
            test_start: ymd(2023, 10, 24),
            rolling_windows: vec![5, 10],
            first_game_rest_days: 3,
            season_start_month: 10,
            season_span_months: 11,
            sample_sizes: SampleSizes {
                train: 50,
                validation: 25,
                test: 25,
            },
            sample_seed: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.validation_start >= self.test_start {
            return Err(PrepError::Config(format!(
                "validation start {} must precede test start {}",
                self.validation_start, self.test_start
            )));
        }
        if self.recent_window.start > self.recent_window.end {
            return Err(PrepError::Config(format!(
                "recent window {}..={} is inverted",
                self.recent_window.start, self.recent_window.end
            )));
        }
        if self.rolling_windows.is_empty() || self.rolling_windows.contains(&0) {
            return Err(PrepError::Config(
                "rolling windows must be non-empty and positive".to_string(),
            ));
        }
        if !(1..=12).contains(&self.season_start_month) || self.season_span_months == 0 {
            return Err(PrepError::Config(format!(
                "season anchor month {} / span {} out of range",
                self.season_start_month, self.season_span_months
            )));
        }
        Ok(())
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn sample_path(&self, file_name: &str) -> PathBuf {
        self.sample_dir.join(file_name)
    }
}

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_cutoffs_are_rejected() {
        let cfg = PipelineConfig {
            validation_start: ymd(2024, 1, 1),
            test_start: ymd(2023, 1, 1),
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().expect_err("must fail").is_config());
    }

    #[test]
    fn zero_window_is_rejected() {
        let cfg = PipelineConfig {
            rolling_windows: vec![5, 0],
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn date_range_is_closed() {
        let range = DateRange::new(ymd(2022, 1, 1), ymd(2022, 1, 31));
        assert!(range.contains(ymd(2022, 1, 1)));
        assert!(range.contains(ymd(2022, 1, 31)));
        assert!(!range.contains(ymd(2022, 2, 1)));
    }
}
