use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{PrepError, Result};

/// One row of the regular-season box-score export, as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBoxScore {
    pub person_id: u64,
    pub team_id: u64,
    pub game_id: u64,
    #[serde(rename = "game_date")]
    pub game_date: String,
    pub matchup: Option<String>,
    pub minutes: Option<String>,
    pub person_name: Option<String>,
    pub team_name: Option<String>,
    pub team_tricode: Option<String>,
    pub position: Option<String>,
    pub field_goals_made: Option<f64>,
    pub field_goals_attempted: Option<f64>,
    pub field_goals_percentage: Option<f64>,
    pub three_pointers_made: Option<f64>,
    pub three_pointers_attempted: Option<f64>,
    pub three_pointers_percentage: Option<f64>,
    pub free_throws_made: Option<f64>,
    pub free_throws_attempted: Option<f64>,
    pub free_throws_percentage: Option<f64>,
    pub rebounds_offensive: Option<f64>,
    pub rebounds_defensive: Option<f64>,
    pub rebounds_total: Option<f64>,
    pub assists: Option<f64>,
    pub steals: Option<f64>,
    pub blocks: Option<f64>,
    pub turnovers: Option<f64>,
    pub fouls_personal: Option<f64>,
    pub points: Option<f64>,
    pub plus_minus_points: Option<f64>,
}

pub const STAT_COUNT: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    FieldGoalsMade,
    FieldGoalsAttempted,
    FieldGoalsPercentage,
    ThreePointersMade,
    ThreePointersAttempted,
    ThreePointersPercentage,
    FreeThrowsMade,
    FreeThrowsAttempted,
    FreeThrowsPercentage,
    ReboundsOffensive,
    ReboundsDefensive,
    ReboundsTotal,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    FoulsPersonal,
    Points,
    PlusMinusPoints,
}

impl Stat {
    pub const ALL: [Stat; STAT_COUNT] = [
        Stat::FieldGoalsMade,
        Stat::FieldGoalsAttempted,
        Stat::FieldGoalsPercentage,
        Stat::ThreePointersMade,
        Stat::ThreePointersAttempted,
        Stat::ThreePointersPercentage,
        Stat::FreeThrowsMade,
        Stat::FreeThrowsAttempted,
        Stat::FreeThrowsPercentage,
        Stat::ReboundsOffensive,
        Stat::ReboundsDefensive,
        Stat::ReboundsTotal,
        Stat::Assists,
        Stat::Steals,
        Stat::Blocks,
        Stat::Turnovers,
        Stat::FoulsPersonal,
        Stat::Points,
        Stat::PlusMinusPoints,
    ];

    /// Column header used by the source export and the written partitions.
    pub fn column(self) -> &'static str {
        match self {
            Stat::FieldGoalsMade => "fieldGoalsMade",
            Stat::FieldGoalsAttempted => "fieldGoalsAttempted",
            Stat::FieldGoalsPercentage => "fieldGoalsPercentage",
            Stat::ThreePointersMade => "threePointersMade",
            Stat::ThreePointersAttempted => "threePointersAttempted",
            Stat::ThreePointersPercentage => "threePointersPercentage",
            Stat::FreeThrowsMade => "freeThrowsMade",
            Stat::FreeThrowsAttempted => "freeThrowsAttempted",
            Stat::FreeThrowsPercentage => "freeThrowsPercentage",
            Stat::ReboundsOffensive => "reboundsOffensive",
            Stat::ReboundsDefensive => "reboundsDefensive",
            Stat::ReboundsTotal => "reboundsTotal",
            Stat::Assists => "assists",
            Stat::Steals => "steals",
            Stat::Blocks => "blocks",
            Stat::Turnovers => "turnovers",
            Stat::FoulsPersonal => "foulsPersonal",
            Stat::Points => "points",
            Stat::PlusMinusPoints => "plusMinusPoints",
        }
    }
}

/// Counted statistics for one player in one game. `None` marks an empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatLine {
    values: [Option<f64>; STAT_COUNT],
}

impl StatLine {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        self.values[stat as usize]
    }

    pub fn set(&mut self, stat: Stat, value: Option<f64>) {
        self.values[stat as usize] = value;
    }

    pub fn with(mut self, stat: Stat, value: f64) -> Self {
        self.set(stat, Some(value));
        self
    }

    /// Sum of the given stats; undefined if any operand is undefined.
    pub fn sum(&self, stats: &[Stat]) -> Option<f64> {
        stats.iter().map(|s| self.get(*s)).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub player_id: u64,
    pub team_id: u64,
    pub game_id: u64,
    pub game_date: NaiveDate,
    pub matchup: Option<String>,
    pub minutes: Option<String>,
    pub player_name: Option<String>,
    pub team_name: Option<String>,
    pub team_tricode: Option<String>,
    pub position: Option<String>,
    pub stats: StatLine,
}

impl GameRecord {
    pub fn from_raw(raw: RawBoxScore, source_name: &str) -> Result<Self> {
        let game_date = parse_game_date(&raw.game_date).ok_or_else(|| {
            PrepError::format(
                source_name,
                format!(
                    "player {} game {}: unparseable game_date {:?}",
                    raw.person_id, raw.game_id, raw.game_date
                ),
            )
        })?;

        let mut stats = StatLine::default();
        let cells = [
            (Stat::FieldGoalsMade, raw.field_goals_made),
            (Stat::FieldGoalsAttempted, raw.field_goals_attempted),
            (Stat::FieldGoalsPercentage, raw.field_goals_percentage),
            (Stat::ThreePointersMade, raw.three_pointers_made),
            (Stat::ThreePointersAttempted, raw.three_pointers_attempted),
            (Stat::ThreePointersPercentage, raw.three_pointers_percentage),
            (Stat::FreeThrowsMade, raw.free_throws_made),
            (Stat::FreeThrowsAttempted, raw.free_throws_attempted),
            (Stat::FreeThrowsPercentage, raw.free_throws_percentage),
            (Stat::ReboundsOffensive, raw.rebounds_offensive),
            (Stat::ReboundsDefensive, raw.rebounds_defensive),
            (Stat::ReboundsTotal, raw.rebounds_total),
            (Stat::Assists, raw.assists),
            (Stat::Steals, raw.steals),
            (Stat::Blocks, raw.blocks),
            (Stat::Turnovers, raw.turnovers),
            (Stat::FoulsPersonal, raw.fouls_personal),
            (Stat::Points, raw.points),
            (Stat::PlusMinusPoints, raw.plus_minus_points),
        ];
        for (stat, value) in cells {
            stats.set(stat, value.filter(|v| v.is_finite()));
        }

        Ok(Self {
            player_id: raw.person_id,
            team_id: raw.team_id,
            game_id: raw.game_id,
            game_date,
            matchup: non_empty(raw.matchup),
            minutes: non_empty(raw.minutes),
            player_name: non_empty(raw.person_name),
            team_name: non_empty(raw.team_name),
            team_tricode: non_empty(raw.team_tricode),
            position: non_empty(raw.position),
            stats,
        })
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10)?;
    let rest = &trimmed[10..];
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('T')) {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_game_date_accepts_plain_and_timestamped() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 2);
        assert_eq!(parse_game_date("2023-01-02"), expected);
        assert_eq!(parse_game_date(" 2023-01-02 00:00:00"), expected);
        assert_eq!(parse_game_date("2023-01-02T19:30:00"), expected);
        assert_eq!(parse_game_date("2023-1-2"), None);
        assert_eq!(parse_game_date("2023-01-02junk"), None);
        assert_eq!(parse_game_date(""), None);
    }

    #[test]
    fn stat_sum_is_undefined_when_any_operand_missing() {
        let line = StatLine::default()
            .with(Stat::Points, 20.0)
            .with(Stat::Assists, 7.0);
        assert_eq!(line.sum(&[Stat::Points, Stat::Assists]), Some(27.0));
        assert_eq!(line.sum(&[Stat::Points, Stat::ReboundsTotal]), None);
    }
}
