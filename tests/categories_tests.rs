// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use spendcast::clusters::Cluster;
use spendcast::{cli, commands::categories, db};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    db::seed_defaults(&conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["spendcast", "category"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let Some(("category", cat_m)) = matches.subcommand() else {
        panic!("no category subcommand");
    };
    categories::handle(conn, cat_m)
}

#[test]
fn defaults_are_seeded_once() {
    let conn = setup();
    let cfg = db::load_cluster_config(&conn).unwrap();
    assert_eq!(cfg, spendcast::clusters::ClusterConfig::default());

    run(&conn, &["rm", "--name", "Printing"]).unwrap();
    db::seed_defaults(&conn).unwrap();
    assert!(!db::category_exists(&conn, "Printing").unwrap());
}

#[test]
fn add_defaults_to_spiky() {
    let conn = setup();
    run(&conn, &["add", "--name", "Gifts"]).unwrap();
    run(&conn, &["add", "--name", "Gym", "--cluster", "fixed"]).unwrap();
    let cfg = db::load_cluster_config(&conn).unwrap();
    assert_eq!(cfg.classify("Gifts"), Cluster::Spiky);
    assert!(cfg.categories_in(Cluster::Spiky).contains("Gifts"));
    assert_eq!(cfg.classify("Gym"), Cluster::Fixed);
}

#[test]
fn add_rejects_duplicates_and_bad_clusters() {
    let conn = setup();
    assert!(run(&conn, &["add", "--name", "Food"]).is_err());
    assert!(run(&conn, &["add", "--name", "Pets", "--cluster", "lumpy"]).is_err());
    assert!(!db::category_exists(&conn, "Pets").unwrap());
}

#[test]
fn set_cluster_moves_category() {
    let conn = setup();
    run(&conn, &["set-cluster", "--name", "Phone", "--cluster", "fixed"]).unwrap();
    let cfg = db::load_cluster_config(&conn).unwrap();
    assert!(cfg.is_fixed("Phone"));
    assert!(!cfg.categories_in(Cluster::Regular).contains("Phone"));
    assert!(run(&conn, &["set-cluster", "--name", "Nope", "--cluster", "fixed"]).is_err());
}

#[test]
fn removing_a_category_keeps_its_transactions() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(id,date,amount,category) VALUES ('x','2025-01-01 10:00:00','5000','Water')",
        [],
    )
    .unwrap();
    run(&conn, &["rm", "--name", "Water"]).unwrap();
    let txs = db::load_transactions(&conn).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].category, "Water");
    // no longer listed, so it now forecasts as spiky
    let cfg = db::load_cluster_config(&conn).unwrap();
    assert_eq!(cfg.classify("Water"), Cluster::Spiky);
    assert!(run(&conn, &["rm", "--name", "Water"]).is_err());
}
