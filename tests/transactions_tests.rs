// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::ArgMatches;
use rusqlite::{Connection, params};
use spendcast::{cli, commands::transactions, db};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    db::seed_defaults(&conn).unwrap();
    let rows = [
        ("t1", "2025-01-03 08:00:00", "45000", "Food", Some("Pho with team")),
        ("t2", "2025-01-10 19:30:00", "250000", "Other", Some("birthday gift")),
        ("t3", "2025-02-01 12:00:00", "30000", "Transport", None),
        ("t4", "2025-02-14 20:00:00", "600000", "Food", Some("Valentine dinner")),
    ];
    for (id, date, amount, category, note) in rows {
        conn.execute(
            "INSERT INTO transactions(id,date,amount,category,note) VALUES (?1,?2,?3,?4,?5)",
            params![id, date, amount, category, note],
        )
        .unwrap();
    }
    conn
}

/// Parses `args` after `spendcast tx` and returns the leaf subcommand.
fn tx_matches(args: &[&str]) -> (String, ArgMatches) {
    let mut argv = vec!["spendcast", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some((name, sub)) = tx_m.subcommand() else {
        panic!("no tx action");
    };
    (name.to_string(), sub.clone())
}

fn list(conn: &Connection, args: &[&str]) -> Vec<String> {
    let mut full = vec!["list"];
    full.extend_from_slice(args);
    let (_, sub) = tx_matches(&full);
    transactions::query_rows(conn, &sub)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect()
}

#[test]
fn list_is_newest_first_and_limited() {
    let conn = setup();
    assert_eq!(list(&conn, &[]), vec!["t4", "t3", "t2", "t1"]);
    assert_eq!(list(&conn, &["--limit", "2"]), vec!["t4", "t3"]);
}

#[test]
fn list_filters_by_period_anchor() {
    let conn = setup();
    assert_eq!(
        list(&conn, &["--period", "month", "--on", "2025-01-20"]),
        vec!["t2", "t1"]
    );
    assert_eq!(list(&conn, &["--period", "day", "--on", "2025-02-01"]), vec!["t3"]);
    // 2025-02-10 is a Monday; its ISO week runs through the 16th
    assert_eq!(list(&conn, &["--period", "week", "--on", "2025-02-10"]), vec!["t4"]);
    assert_eq!(list(&conn, &["--period", "year", "--on", "2024-06-01"]).len(), 0);
}

#[test]
fn list_searches_keyword_category_and_ranges() {
    let conn = setup();
    assert_eq!(list(&conn, &["--keyword", "GIFT"]), vec!["t2"]);
    // keyword also matches the category label
    assert_eq!(list(&conn, &["--keyword", "transp"]), vec!["t3"]);
    assert_eq!(list(&conn, &["--category", "Food"]), vec!["t4", "t1"]);
    assert_eq!(
        list(&conn, &["--from", "2025-01-05", "--to", "2025-02-01"]),
        vec!["t3", "t2"]
    );
    assert_eq!(list(&conn, &["--min", "40000", "--max", "300000"]), vec!["t2", "t1"]);
    assert_eq!(
        list(&conn, &["--category", "Food", "--min", "100000"]),
        vec!["t4"]
    );
}

#[test]
fn add_records_expense_with_explicit_date() {
    let conn = setup();
    let (_, sub) = tx_matches(&[
        "add",
        "--date",
        "2025-03-05 09:15",
        "--amount",
        "52000",
        "--category",
        "Fuel",
        "--note",
        " full tank ",
    ]);
    let id = transactions::add(&conn, &sub).unwrap();
    let (date, amount, category, note, kind): (String, String, String, Option<String>, String) =
        conn.query_row(
            "SELECT date, amount, category, note, type FROM transactions WHERE id=?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
        )
        .unwrap();
    assert_eq!(date, "2025-03-05 09:15:00");
    assert_eq!(amount, "52000");
    assert_eq!(category, "Fuel");
    assert_eq!(note.as_deref(), Some("full tank"));
    assert_eq!(kind, "Expense");
}

#[test]
fn add_rejects_non_positive_amounts() {
    let conn = setup();
    for amount in ["--amount=0", "--amount=-5", "--amount=abc"] {
        let (_, sub) = tx_matches(&["add", amount, "--category", "Food"]);
        assert!(transactions::add(&conn, &sub).is_err(), "{amount} accepted");
    }
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 4);
}

#[test]
fn add_accepts_unknown_category() {
    let conn = setup();
    let (_, sub) = tx_matches(&["add", "--amount", "10000", "--category", "Board Games"]);
    let id = transactions::add(&conn, &sub).unwrap();
    let cat: String = conn
        .query_row(
            "SELECT category FROM transactions WHERE id=?1",
            params![id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(cat, "Board Games");
}

#[test]
fn edit_updates_fields_and_clears_note() {
    let conn = setup();
    let m = cli::build_cli().get_matches_from([
        "spendcast", "tx", "edit", "--id", "t2", "--amount", "275000", "--note", "",
    ]);
    let Some(("tx", tx_m)) = m.subcommand() else {
        panic!("no tx subcommand");
    };
    transactions::handle(&conn, tx_m).unwrap();

    let (amount, note, updated): (String, Option<String>, Option<String>) = conn
        .query_row(
            "SELECT amount, note, updated_at FROM transactions WHERE id='t2'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(amount, "275000");
    assert_eq!(note, None);
    assert!(updated.is_some());
}

#[test]
fn edit_and_remove_report_missing_ids() {
    let conn = setup();
    for argv in [
        ["spendcast", "tx", "edit", "--id", "nope"],
        ["spendcast", "tx", "rm", "--id", "nope"],
    ] {
        let m = cli::build_cli().get_matches_from(argv);
        let Some(("tx", tx_m)) = m.subcommand() else {
            panic!("no tx subcommand");
        };
        assert!(transactions::handle(&conn, tx_m).is_err());
    }
}

#[test]
fn remove_deletes_one_row() {
    let conn = setup();
    let m = cli::build_cli().get_matches_from(["spendcast", "tx", "rm", "--id", "t3"]);
    let Some(("tx", tx_m)) = m.subcommand() else {
        panic!("no tx subcommand");
    };
    transactions::handle(&conn, tx_m).unwrap();
    assert_eq!(list(&conn, &[]), vec!["t4", "t2", "t1"]);
}

#[test]
fn failed_edit_leaves_row_untouched() {
    let conn = setup();
    let m = cli::build_cli().get_matches_from([
        "spendcast",
        "tx",
        "edit",
        "--id",
        "t1",
        "--date",
        "2025-07-09 10:00:00",
        "--category",
        "Transport",
        "--amount",
        "abc",
    ]);
    let Some(("tx", tx_m)) = m.subcommand() else {
        panic!("no tx subcommand");
    };
    assert!(transactions::handle(&conn, tx_m).is_err());

    let (date, amount, category, updated): (String, String, String, Option<String>) = conn
        .query_row(
            "SELECT date, amount, category, updated_at FROM transactions WHERE id='t1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(date, "2025-01-03 08:00:00");
    assert_eq!(amount, "45000");
    assert_eq!(category, "Food");
    assert_eq!(updated, None);
}
