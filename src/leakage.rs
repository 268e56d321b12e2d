use once_cell::sync::Lazy;
use tracing::debug;

use crate::table::{DATE_COLUMN, FeatureTable};

/// Per-game values the downstream model predicts.
pub const TARGET_COLUMNS: &[&str] = &[
    "points",
    "reboundsTotal",
    "assists",
    "threePointersMade",
    "turnovers",
    "blocks",
    "steals",
    "rebounds_plus_assists",
    "points_rebounds_assists",
    "points_assists",
    "points_rebounds",
    "blocks_steals",
];

const IDENTIFIER_COLUMNS: &[&str] = &[
    "personId",
    "personName",
    "teamId",
    "teamName",
    "teamTricode",
    "gameId",
    "opposing_teamId",
    "matchup",
    "opponent",
    "position",
    "minutes",
];

/// Realized only once the game is played.
const CURRENT_GAME_COLUMNS: &[&str] = &[
    "fieldGoalsMade",
    "fieldGoalsAttempted",
    "fieldGoalsPercentage",
    "threePointersAttempted",
    "threePointersPercentage",
    "freeThrowsMade",
    "freeThrowsAttempted",
    "freeThrowsPercentage",
    "reboundsOffensive",
    "reboundsDefensive",
    "foulsPersonal",
    "plusMinusPoints",
    "minutes_played",
];

static LEAKAGE_COLUMNS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut cols: Vec<String> = IDENTIFIER_COLUMNS.iter().map(|c| c.to_string()).collect();
    for target in TARGET_COLUMNS {
        cols.push(target.to_string());
        cols.push(format!("{target}_pred"));
    }
    cols.extend(CURRENT_GAME_COLUMNS.iter().map(|c| c.to_string()));
    cols
});

pub fn leakage_columns() -> &'static [String] {
    &LEAKAGE_COLUMNS
}

/// Strips identifiers, targets and current-game outcomes. The date key is
/// left in place for the splitter.
pub fn strip_leakage(table: &mut FeatureTable) {
    let before = table.columns().len();
    table.drop_columns(leakage_columns());
    debug!(
        dropped = before - table.columns().len(),
        retained = table.columns().len(),
        "leakage columns removed"
    );
}

/// Drops the split key once partitions have been assigned.
pub fn strip_split_key(table: &mut FeatureTable) {
    table.drop_columns(&[DATE_COLUMN]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_predictions_are_listed() {
        let cols = leakage_columns();
        assert!(cols.iter().any(|c| c == "points_pred"));
        assert!(cols.iter().any(|c| c == "blocks_steals_pred"));
        assert!(!cols.iter().any(|c| c == DATE_COLUMN));
    }
}
