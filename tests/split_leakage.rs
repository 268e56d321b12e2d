use chrono::NaiveDate;

use boxscore_prep::leakage::{TARGET_COLUMNS, leakage_columns, strip_leakage, strip_split_key};
use boxscore_prep::split::{Partition, split_by_date};
use boxscore_prep::table::{Cell, DATE_COLUMN, FeatureTable};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn t1() -> NaiveDate {
    date("2022-10-18")
}

fn t2() -> NaiveDate {
    date("2023-10-24")
}

fn dated_table(days: &[&str]) -> FeatureTable {
    let mut t = FeatureTable::new(vec![
        "personId".to_string(),
        DATE_COLUMN.to_string(),
        "points".to_string(),
        "points_avg_5g".to_string(),
    ]);
    for (i, d) in days.iter().enumerate() {
        t.push_row(vec![
            Cell::Int(i as i64),
            Cell::Date(date(d)),
            Cell::Float(10.0),
            Cell::Float(i as f64),
        ]);
    }
    t
}

#[test]
fn boundaries_are_half_open() {
    assert_eq!(Partition::for_date(date("2022-10-17"), t1(), t2()), Partition::Train);
    assert_eq!(Partition::for_date(t1(), t1(), t2()), Partition::Validation);
    assert_eq!(Partition::for_date(date("2023-10-23"), t1(), t2()), Partition::Validation);
    assert_eq!(Partition::for_date(t2(), t1(), t2()), Partition::Test);
}

#[test]
fn partitions_are_disjoint_and_reconstruct_input() {
    let days = [
        "2023-11-01",
        "2021-01-01",
        "2022-10-18",
        "2022-10-17",
        "2023-10-24",
        "2023-01-01",
        "2021-01-01",
    ];
    let table = dated_table(&days);
    let split = split_by_date(&table, t1(), t2()).expect("split");
    assert_eq!(split.total_rows(), table.len());

    let mut ids: Vec<i64> = Vec::new();
    for p in Partition::ALL {
        let part = split.get(p);
        let mut prev = None;
        for row in 0..part.len() {
            let d = part
                .cell(row, DATE_COLUMN)
                .and_then(Cell::as_date)
                .expect("date cell");
            assert_eq!(Partition::for_date(d, t1(), t2()), p);
            if let Some(prev) = prev {
                assert!(prev <= d, "partition not date-ordered");
            }
            prev = Some(d);
            let id = part.cell(row, "personId").and_then(Cell::as_f64).expect("id");
            ids.push(id as i64);
        }
    }
    ids.sort_unstable();
    assert_eq!(ids, (0..days.len() as i64).collect::<Vec<_>>());
    assert_eq!(split.train.len(), 3);
    assert_eq!(split.validation.len(), 2);
    assert_eq!(split.test.len(), 2);
    assert_eq!(
        split.date_bounds(Partition::Test),
        Some((date("2023-10-24"), date("2023-11-01")))
    );
}

#[test]
fn split_requires_date_key() {
    let mut table = dated_table(&["2021-01-01"]);
    strip_split_key(&mut table);
    assert!(split_by_date(&table, t1(), t2()).expect_err("no key").is_format());
}

#[test]
fn split_rejects_inverted_cutoffs() {
    let table = dated_table(&["2021-01-01"]);
    assert!(split_by_date(&table, t2(), t1()).expect_err("inverted").is_config());
}

#[test]
fn leakage_guard_is_idempotent_and_keeps_date_key() {
    let mut once = dated_table(&["2021-01-01", "2023-01-01"]);
    strip_leakage(&mut once);
    let mut twice = once.clone();
    strip_leakage(&mut twice);

    assert_eq!(once, twice);
    assert_eq!(
        once.columns(),
        [DATE_COLUMN.to_string(), "points_avg_5g".to_string()]
    );
}

#[test]
fn leakage_list_covers_targets_and_their_predictions() {
    let cols = leakage_columns();
    for target in TARGET_COLUMNS {
        assert!(cols.iter().any(|c| c == target), "{target}");
        assert!(cols.iter().any(|c| *c == format!("{target}_pred")), "{target}_pred");
    }
    for current in ["fieldGoalsPercentage", "foulsPersonal", "plusMinusPoints", "reboundsOffensive"] {
        assert!(cols.iter().any(|c| c == current), "{current}");
    }
}
