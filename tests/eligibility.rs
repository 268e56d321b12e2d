use chrono::NaiveDate;

use boxscore_prep::PipelineConfig;
use boxscore_prep::box_score::{GameRecord, StatLine};
use boxscore_prep::config::DateRange;
use boxscore_prep::eligibility::{
    established_players, filter_established, first_game_dates, recently_active,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn game(player_id: u64, game_id: u64, day: &str) -> GameRecord {
    GameRecord {
        player_id,
        team_id: 1,
        game_id,
        game_date: date(day),
        matchup: None,
        minutes: None,
        player_name: None,
        team_name: None,
        team_tricode: None,
        position: None,
        stats: StatLine::default(),
    }
}

fn test_config() -> PipelineConfig {
    PipelineConfig {
        rookie_cutoff: date("2022-10-01"),
        recent_window: DateRange::new(date("2022-01-01"), date("2024-06-30")),
        ..PipelineConfig::default()
    }
}

fn history() -> Vec<GameRecord> {
    vec![
        // Veteran, active recently: whole history kept.
        game(10, 3, "2023-01-10"),
        game(10, 1, "2019-11-02"),
        game(10, 2, "2021-02-14"),
        // Rookie: first game after the cutoff.
        game(20, 4, "2022-10-25"),
        game(20, 5, "2023-03-01"),
        // Veteran who retired before the recent window.
        game(30, 6, "2018-01-01"),
        game(30, 7, "2021-12-31"),
        // First game exactly on the cutoff is not established.
        game(40, 8, "2022-10-01"),
    ]
}

#[test]
fn established_requires_first_game_strictly_before_cutoff() {
    let firsts = first_game_dates(&history());
    assert_eq!(firsts[&10], date("2019-11-02"));
    let established = established_players(&firsts, date("2022-10-01"));
    assert!(established.contains(&10));
    assert!(established.contains(&30));
    assert!(!established.contains(&20));
    assert!(!established.contains(&40));
}

#[test]
fn recent_activity_only_considers_established_players() {
    let records = history();
    let established = established_players(&first_game_dates(&records), date("2022-10-01"));
    let active = recently_active(
        &records,
        &established,
        DateRange::new(date("2022-01-01"), date("2024-06-30")),
    );
    assert_eq!(active.len(), 1);
    assert!(active.contains(&10));
}

#[test]
fn filter_keeps_full_history_sorted_by_player_and_date() {
    let (kept, summary) = filter_established(history(), &test_config());
    let dates: Vec<NaiveDate> = kept.iter().map(|g| g.game_date).collect();
    assert!(kept.iter().all(|g| g.player_id == 10));
    assert_eq!(
        dates,
        vec![date("2019-11-02"), date("2021-02-14"), date("2023-01-10")]
    );
    assert_eq!(summary.players_total, 4);
    assert_eq!(summary.players_established, 2);
    assert_eq!(summary.players_retained, 1);
    assert_eq!(summary.rows_before, 8);
    assert_eq!(summary.rows_after, 3);
}

#[test]
fn excluded_players_fail_one_of_the_two_conditions() {
    let records = history();
    let cfg = test_config();
    let firsts = first_game_dates(&records);
    let (kept, _) = filter_established(records.clone(), &cfg);

    for (player, first) in &firsts {
        let retained = kept.iter().any(|g| g.player_id == *player);
        let recent = records
            .iter()
            .any(|g| g.player_id == *player && cfg.recent_window.contains(g.game_date));
        assert_eq!(retained, *first < cfg.rookie_cutoff && recent, "player {player}");
    }
}

#[test]
fn no_qualifying_players_yields_empty_output() {
    let only_rookies = vec![game(20, 4, "2022-10-25"), game(21, 5, "2023-01-01")];
    let (kept, summary) = filter_established(only_rookies, &test_config());
    assert!(kept.is_empty());
    assert_eq!(summary.players_retained, 0);
}
