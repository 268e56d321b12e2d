use std::collections::BTreeMap;

use chrono::Datelike;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::box_score::{GameRecord, Stat};
use crate::config::PipelineConfig;

const HOME_SEPARATOR: &str = " vs. ";
const AWAY_SEPARATOR: &str = " @ ";

/// A derived value tagged with whether it was measured or filled by policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Imputed<T> {
    Present(T),
    Default(T),
}

impl<T: Copy> Imputed<T> {
    pub fn value(&self) -> T {
        match self {
            Imputed::Present(v) | Imputed::Default(v) => *v,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Imputed::Default(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingBase {
    Stat(Stat),
    MinutesPlayed,
}

impl RollingBase {
    pub fn column(self) -> &'static str {
        match self {
            RollingBase::Stat(stat) => stat.column(),
            RollingBase::MinutesPlayed => "minutes_played",
        }
    }
}

pub const ROLLING_BASES: [RollingBase; 9] = [
    RollingBase::Stat(Stat::Points),
    RollingBase::Stat(Stat::Assists),
    RollingBase::Stat(Stat::ReboundsTotal),
    RollingBase::Stat(Stat::FieldGoalsAttempted),
    RollingBase::Stat(Stat::FieldGoalsMade),
    RollingBase::Stat(Stat::ThreePointersMade),
    RollingBase::Stat(Stat::FreeThrowsAttempted),
    RollingBase::Stat(Stat::Turnovers),
    RollingBase::MinutesPlayed,
];

pub fn rolling_column(base: RollingBase, window: usize) -> String {
    format!("{}_avg_{window}g", base.column())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    ReboundsPlusAssists,
    PointsReboundsAssists,
    PointsAssists,
    PointsRebounds,
    BlocksSteals,
}

impl Composite {
    pub const ALL: [Composite; 5] = [
        Composite::ReboundsPlusAssists,
        Composite::PointsReboundsAssists,
        Composite::PointsAssists,
        Composite::PointsRebounds,
        Composite::BlocksSteals,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Composite::ReboundsPlusAssists => "rebounds_plus_assists",
            Composite::PointsReboundsAssists => "points_rebounds_assists",
            Composite::PointsAssists => "points_assists",
            Composite::PointsRebounds => "points_rebounds",
            Composite::BlocksSteals => "blocks_steals",
        }
    }

    pub fn operands(self) -> &'static [Stat] {
        match self {
            Composite::ReboundsPlusAssists => &[Stat::ReboundsTotal, Stat::Assists],
            Composite::PointsReboundsAssists => &[Stat::Points, Stat::ReboundsTotal, Stat::Assists],
            Composite::PointsAssists => &[Stat::Points, Stat::Assists],
            Composite::PointsRebounds => &[Stat::Points, Stat::ReboundsTotal],
            Composite::BlocksSteals => &[Stat::Blocks, Stat::Steals],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollingFeature {
    pub base: RollingBase,
    pub window: usize,
    pub value: Imputed<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub game: GameRecord,
    pub minutes_played: Imputed<f64>,
    pub is_home: bool,
    pub opponent: Option<String>,
    pub rest_days: Imputed<i64>,
    pub is_back_to_back: bool,
    pub season_year: i32,
    pub season_month: u32,
    pub season_progress: f64,
    pub rolling: Vec<RollingFeature>,
    /// Raw-value sums; `None` when an operand cell was empty.
    pub composites: Vec<(Composite, Option<f64>)>,
}

impl FeatureRecord {
    pub fn rolling_value(&self, base: RollingBase, window: usize) -> Option<f64> {
        self.rolling
            .iter()
            .find(|f| f.base == base && f.window == window)
            .map(|f| f.value.value())
    }

    pub fn composite_value(&self, composite: Composite) -> f64 {
        self.composites
            .iter()
            .find(|(c, _)| *c == composite)
            .and_then(|(_, v)| *v)
            .unwrap_or(0.0)
    }
}

/// `MM:SS` to fractional minutes. Absent or malformed strings count as a
/// game the player did not play.
pub fn parse_minutes(raw: Option<&str>) -> Imputed<f64> {
    let Some((mins, secs)) = raw.and_then(|s| s.trim().split_once(':')) else {
        return Imputed::Default(0.0);
    };
    match (mins.trim().parse::<f64>(), secs.trim().parse::<f64>()) {
        (Ok(m), Ok(s)) if m.is_finite() && s.is_finite() => Imputed::Present(m + s / 60.0),
        _ => Imputed::Default(0.0),
    }
}

/// Returns `(is_home, opponent)`. A matchup without a known separator is
/// treated as an away game against an unknown opponent.
pub fn parse_matchup(matchup: Option<&str>, own_tricode: Option<&str>) -> (bool, Option<String>) {
    let Some(matchup) = matchup else {
        return (false, None);
    };
    let (is_home, sides) = if let Some(sides) = matchup.split_once(HOME_SEPARATOR) {
        (true, sides)
    } else if let Some(sides) = matchup.split_once(AWAY_SEPARATOR) {
        (false, sides)
    } else {
        return (false, None);
    };

    let (left, right) = (sides.0.trim(), sides.1.trim());
    let opponent = match own_tricode {
        Some(own) if own.eq_ignore_ascii_case(right) => left,
        _ => right,
    };
    let opponent = (!opponent.is_empty()).then(|| opponent.to_string());
    (is_home, opponent)
}

pub fn season_progress(month: u32, start_month: u32, span_months: u32) -> f64 {
    let offset = (i64::from(month) - i64::from(start_month)).rem_euclid(12);
    offset as f64 / f64::from(span_months)
}

/// Mean over the defined values at indices `[i - window, i)`. The value at
/// `i` itself never contributes.
pub fn trailing_mean(values: &[Option<f64>], i: usize, window: usize) -> Imputed<f64> {
    let start = i.saturating_sub(window);
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values[start..i].iter().flatten() {
        sum += v;
        n += 1;
    }
    if n == 0 {
        Imputed::Default(0.0)
    } else {
        Imputed::Present(sum / n as f64)
    }
}

/// Derives features for one player's games, which must already be in
/// ascending date order.
pub fn synthesize_timeline(games: &[GameRecord], cfg: &PipelineConfig) -> Vec<FeatureRecord> {
    let minutes: Vec<Imputed<f64>> = games
        .iter()
        .map(|g| parse_minutes(g.minutes.as_deref()))
        .collect();

    let series: Vec<(RollingBase, Vec<Option<f64>>)> = ROLLING_BASES
        .iter()
        .map(|base| {
            let values: Vec<Option<f64>> = match base {
                RollingBase::Stat(stat) => games.iter().map(|g| g.stats.get(*stat)).collect(),
                RollingBase::MinutesPlayed => minutes.iter().map(|m| Some(m.value())).collect(),
            };
            (*base, values)
        })
        .collect();

    let mut out = Vec::with_capacity(games.len());
    for (i, game) in games.iter().enumerate() {
        let rest_days = match i.checked_sub(1).map(|prev| &games[prev]) {
            Some(prev) => Imputed::Present((game.game_date - prev.game_date).num_days()),
            None => Imputed::Default(cfg.first_game_rest_days),
        };
        let (is_home, opponent) =
            parse_matchup(game.matchup.as_deref(), game.team_tricode.as_deref());

        let mut rolling = Vec::with_capacity(series.len() * cfg.rolling_windows.len());
        for (base, values) in &series {
            for window in &cfg.rolling_windows {
                rolling.push(RollingFeature {
                    base: *base,
                    window: *window,
                    value: trailing_mean(values, i, *window),
                });
            }
        }

        let composites = Composite::ALL
            .iter()
            .map(|c| (*c, game.stats.sum(c.operands())))
            .collect();

        let month = game.game_date.month();
        out.push(FeatureRecord {
            game: game.clone(),
            minutes_played: minutes[i],
            is_home,
            opponent,
            rest_days,
            is_back_to_back: rest_days.value() == 1,
            season_year: game.game_date.year(),
            season_month: month,
            season_progress: season_progress(
                month,
                cfg.season_start_month,
                cfg.season_span_months,
            ),
            rolling,
            composites,
        });
    }
    out
}

/// Splits `records` into per-player timelines and synthesizes each one.
/// Output is ordered by (player, date) regardless of input order.
pub fn synthesize(mut records: Vec<GameRecord>, cfg: &PipelineConfig) -> Vec<FeatureRecord> {
    records.sort_by(|a, b| {
        a.player_id
            .cmp(&b.player_id)
            .then(a.game_date.cmp(&b.game_date))
            .then(a.game_id.cmp(&b.game_id))
    });
    let timelines: Vec<&[GameRecord]> = records
        .chunk_by(|a, b| a.player_id == b.player_id)
        .collect();

    let out: Vec<FeatureRecord> = timelines
        .par_iter()
        .flat_map_iter(|timeline| synthesize_timeline(timeline, cfg))
        .collect();
    info!(
        players = timelines.len(),
        rows = out.len(),
        "synthesized features"
    );
    out
}

/// Counts of policy-filled values per derived column.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImputationAudit {
    pub rows: usize,
    pub defaults: BTreeMap<String, usize>,
}

impl ImputationAudit {
    pub fn from_records(records: &[FeatureRecord]) -> Self {
        let mut audit = Self {
            rows: records.len(),
            defaults: BTreeMap::new(),
        };
        for r in records {
            audit.bump("minutes_played", r.minutes_played.is_default());
            audit.bump("days_rest", r.rest_days.is_default());
            audit.bump("opponent", r.opponent.is_none());
            for f in &r.rolling {
                if f.value.is_default() {
                    *audit
                        .defaults
                        .entry(rolling_column(f.base, f.window))
                        .or_default() += 1;
                }
            }
            for (c, v) in &r.composites {
                audit.bump(c.column(), v.is_none());
            }
        }
        audit
    }

    fn bump(&mut self, column: &str, hit: bool) {
        if hit {
            *self.defaults.entry(column.to_string()).or_default() += 1;
        }
    }

    pub fn count(&self, column: &str) -> usize {
        self.defaults.get(column).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minutes_handles_defaults() {
        assert_eq!(parse_minutes(Some("31:30")), Imputed::Present(31.5));
        assert_eq!(parse_minutes(Some("0:45")), Imputed::Present(0.75));
        assert_eq!(parse_minutes(None), Imputed::Default(0.0));
        assert_eq!(parse_minutes(Some("DNP")), Imputed::Default(0.0));
        assert_eq!(parse_minutes(Some("12:xx")), Imputed::Default(0.0));
    }

    #[test]
    fn parse_matchup_home_and_away() {
        assert_eq!(
            parse_matchup(Some("LAL vs. BOS"), Some("LAL")),
            (true, Some("BOS".to_string()))
        );
        assert_eq!(
            parse_matchup(Some("LAL @ BOS"), Some("LAL")),
            (false, Some("BOS".to_string()))
        );
        assert_eq!(parse_matchup(Some("LAL-BOS"), None), (false, None));
        assert_eq!(parse_matchup(None, None), (false, None));
    }

    #[test]
    fn parse_matchup_picks_side_opposite_own_team() {
        assert_eq!(
            parse_matchup(Some("BOS @ LAL"), Some("LAL")),
            (false, Some("BOS".to_string()))
        );
    }

    #[test]
    fn season_progress_wraps_from_october() {
        assert_eq!(season_progress(10, 10, 11), 0.0);
        assert!((season_progress(1, 10, 11) - 3.0 / 11.0).abs() < 1e-12);
        assert!((season_progress(4, 10, 11) - 6.0 / 11.0).abs() < 1e-12);
        assert_eq!(season_progress(9, 10, 11), 1.0);
    }

    #[test]
    fn trailing_mean_excludes_current_and_shrinks_at_start() {
        let values = [Some(10.0), Some(20.0), None, Some(40.0)];
        assert_eq!(trailing_mean(&values, 0, 5), Imputed::Default(0.0));
        assert_eq!(trailing_mean(&values, 1, 5), Imputed::Present(10.0));
        assert_eq!(trailing_mean(&values, 3, 5), Imputed::Present(15.0));
        assert_eq!(trailing_mean(&values, 3, 1), Imputed::Default(0.0));
    }
}
