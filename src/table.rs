use std::fmt;

use chrono::NaiveDate;

use crate::box_score::Stat;
use crate::features::{Composite, FeatureRecord, ROLLING_BASES, rolling_column};

pub const DATE_COLUMN: &str = "game_date";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn text(value: &Option<String>) -> Self {
        value.clone().map(Cell::Text).unwrap_or(Cell::Empty)
    }

    fn flag(value: bool) -> Self {
        Cell::Int(i64::from(value))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Empty => Ok(()),
        }
    }
}

/// Row-major table addressed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Removes every listed column that exists; absent names are skipped.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.iter().any(|n| n.as_ref() == c))
            .collect();
        if keep.iter().all(|k| *k) {
            return;
        }
        self.columns = retain_mask(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            *row = retain_mask(std::mem::take(row), &keep);
        }
    }

    /// New table with the same schema holding the selected rows, in the
    /// order given.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|i| self.rows.get(*i).cloned())
                .collect(),
        }
    }

    pub fn from_features(records: &[FeatureRecord], windows: &[usize]) -> Self {
        let mut table = Self::new(feature_columns(windows));
        for r in records {
            table.push_row(feature_row(r));
        }
        table
    }
}

fn retain_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, k)| k.then_some(item))
        .collect()
}

pub fn feature_columns(windows: &[usize]) -> Vec<String> {
    let mut cols: Vec<String> = [
        "personId",
        "personName",
        "teamId",
        "teamName",
        "teamTricode",
        "gameId",
        DATE_COLUMN,
        "matchup",
        "position",
        "minutes",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    cols.extend(Stat::ALL.iter().map(|s| s.column().to_string()));
    cols.extend(
        [
            "minutes_played",
            "is_home",
            "opponent",
            "days_rest",
            "is_back_to_back",
            "season_year",
            "season_month",
            "season_progress",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    for base in ROLLING_BASES {
        for w in windows {
            cols.push(rolling_column(base, *w));
        }
    }
    cols.extend(Composite::ALL.iter().map(|c| c.column().to_string()));
    cols
}

// Column order must match `feature_columns`. Undefined numerics become 0.
fn feature_row(r: &FeatureRecord) -> Vec<Cell> {
    let g = &r.game;
    let mut row = vec![
        Cell::Int(g.player_id as i64),
        Cell::text(&g.player_name),
        Cell::Int(g.team_id as i64),
        Cell::text(&g.team_name),
        Cell::text(&g.team_tricode),
        Cell::Int(g.game_id as i64),
        Cell::Date(g.game_date),
        Cell::text(&g.matchup),
        Cell::text(&g.position),
        Cell::text(&g.minutes),
    ];
    row.extend(
        Stat::ALL
            .iter()
            .map(|s| Cell::Float(g.stats.get(*s).unwrap_or(0.0))),
    );
    row.extend([
        Cell::Float(r.minutes_played.value()),
        Cell::flag(r.is_home),
        Cell::text(&r.opponent),
        Cell::Int(r.rest_days.value()),
        Cell::flag(r.is_back_to_back),
        Cell::Int(i64::from(r.season_year)),
        Cell::Int(i64::from(r.season_month)),
        Cell::Float(r.season_progress),
    ]);
    row.extend(r.rolling.iter().map(|f| Cell::Float(f.value.value())));
    row.extend(
        Composite::ALL
            .iter()
            .map(|c| Cell::Float(r.composite_value(*c))),
    );
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> FeatureTable {
        let mut t = FeatureTable::new(vec!["a".into(), "b".into(), "c".into()]);
        t.push_row(vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]);
        t.push_row(vec![Cell::Int(4), Cell::Int(5), Cell::Int(6)]);
        t
    }

    #[test]
    fn drop_columns_skips_missing_names() {
        let mut t = tiny();
        t.drop_columns(&["b", "zzz"]);
        assert_eq!(t.columns(), ["a".to_string(), "c".to_string()]);
        assert_eq!(t.rows()[1], vec![Cell::Int(4), Cell::Int(6)]);
    }

    #[test]
    fn select_rows_keeps_schema() {
        let t = tiny().select_rows(&[1]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.cell(0, "c"), Some(&Cell::Int(6)));
    }
}
