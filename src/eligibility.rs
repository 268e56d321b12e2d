use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::info;

use crate::box_score::GameRecord;
use crate::config::{DateRange, PipelineConfig};

#[derive(Debug, Clone, Default)]
pub struct EligibilitySummary {
    pub players_total: usize,
    pub players_established: usize,
    pub players_retained: usize,
    pub rows_before: usize,
    pub rows_after: usize,
}

pub fn first_game_dates(records: &[GameRecord]) -> HashMap<u64, NaiveDate> {
    let mut first: HashMap<u64, NaiveDate> = HashMap::new();
    for r in records {
        first
            .entry(r.player_id)
            .and_modify(|d| *d = (*d).min(r.game_date))
            .or_insert(r.game_date);
    }
    first
}

/// Players whose first recorded game is strictly before `rookie_cutoff`.
pub fn established_players(
    first_games: &HashMap<u64, NaiveDate>,
    rookie_cutoff: NaiveDate,
) -> HashSet<u64> {
    first_games
        .iter()
        .filter(|(_, first)| **first < rookie_cutoff)
        .map(|(id, _)| *id)
        .collect()
}

pub fn recently_active(
    records: &[GameRecord],
    established: &HashSet<u64>,
    window: DateRange,
) -> HashSet<u64> {
    records
        .iter()
        .filter(|r| window.contains(r.game_date) && established.contains(&r.player_id))
        .map(|r| r.player_id)
        .collect()
}

/// Keeps the full history of every established, recently active player,
/// sorted by (player, date).
pub fn filter_established(
    records: Vec<GameRecord>,
    cfg: &PipelineConfig,
) -> (Vec<GameRecord>, EligibilitySummary) {
    let first_games = first_game_dates(&records);
    let established = established_players(&first_games, cfg.rookie_cutoff);
    let retained_ids = recently_active(&records, &established, cfg.recent_window);

    let rows_before = records.len();
    let mut kept: Vec<GameRecord> = records
        .into_iter()
        .filter(|r| retained_ids.contains(&r.player_id))
        .collect();
    kept.sort_by(|a, b| {
        a.player_id
            .cmp(&b.player_id)
            .then(a.game_date.cmp(&b.game_date))
            .then(a.game_id.cmp(&b.game_id))
    });

    let summary = EligibilitySummary {
        players_total: first_games.len(),
        players_established: established.len(),
        players_retained: retained_ids.len(),
        rows_before,
        rows_after: kept.len(),
    };
    info!(
        players_total = summary.players_total,
        established = summary.players_established,
        retained = summary.players_retained,
        rows_before = summary.rows_before,
        rows_after = summary.rows_after,
        "eligibility filter applied"
    );
    (kept, summary)
}
