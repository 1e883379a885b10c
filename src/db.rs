// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::clusters::{Cluster, ClusterConfig, DEFAULT_FIXED, DEFAULT_REGULAR, DEFAULT_SPIKY};
use crate::models::{Transaction, TransactionKind};
use crate::utils::{TS_FORMAT, get_setting, set_setting};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Spendcast", "spendcast"));

/// Environment variable that points the app at a specific database file.
pub const DB_ENV: &str = "SPENDCAST_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("spendcast.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    seed_defaults(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- vocabulary plus forecasting cluster; transactions do not reference it
    CREATE TABLE IF NOT EXISTS categories(
        name TEXT PRIMARY KEY,
        cluster TEXT NOT NULL DEFAULT 'spiky' CHECK(cluster IN ('fixed','regular','spiky')),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        category TEXT NOT NULL,
        note TEXT,
        type TEXT NOT NULL DEFAULT 'Expense',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    "#,
    )?;
    Ok(())
}

/// Inserts the default vocabulary once. Later deletions stick.
pub fn seed_defaults(conn: &Connection) -> Result<()> {
    if get_setting(conn, "defaults_seeded")?.is_some() {
        return Ok(());
    }
    for (names, cluster) in [
        (DEFAULT_FIXED, Cluster::Fixed),
        (DEFAULT_REGULAR, Cluster::Regular),
        (DEFAULT_SPIKY, Cluster::Spiky),
    ] {
        for name in names {
            conn.execute(
                "INSERT OR IGNORE INTO categories(name, cluster) VALUES (?1, ?2)",
                params![name, cluster.as_str()],
            )?;
        }
    }
    set_setting(conn, "defaults_seeded", "1")?;
    info!("seeded default categories");
    Ok(())
}

pub fn insert_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, date, amount, category, note, type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            t.id,
            t.date.format(TS_FORMAT).to_string(),
            t.amount.to_string(),
            t.category,
            t.note,
            t.kind.as_str()
        ],
    )?;
    Ok(())
}

/// Loads every stored expense for the engine. Rows with an unreadable date or
/// type are skipped; unreadable amounts count as zero.
pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, amount, category, note, type FROM transactions ORDER BY date DESC, id",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: String = r.get(0)?;
        let date_s: String = r.get(1)?;
        let amount_s: String = r.get(2)?;
        let category: String = r.get(3)?;
        let note: Option<String> = r.get(4)?;
        let kind_s: String = r.get(5)?;

        let Ok(date) = NaiveDateTime::parse_from_str(&date_s, TS_FORMAT) else {
            warn!(%id, date = %date_s, "skipping transaction with unreadable date");
            continue;
        };
        let Some(kind) = TransactionKind::parse(&kind_s) else {
            warn!(%id, kind = %kind_s, "skipping transaction of unknown type");
            continue;
        };
        let amount = amount_s.trim().parse::<Decimal>().unwrap_or_else(|_| {
            warn!(%id, amount = %amount_s, "unreadable amount treated as 0");
            Decimal::ZERO
        });
        out.push(Transaction {
            id,
            date,
            amount,
            category,
            note: note.filter(|n| !n.is_empty()),
            kind,
        });
    }
    Ok(out)
}

pub fn load_cluster_config(conn: &Connection) -> Result<ClusterConfig> {
    let mut stmt = conn.prepare("SELECT name, cluster FROM categories ORDER BY name")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut cfg = ClusterConfig::empty();
    for row in rows {
        let (name, cluster_s) = row?;
        let cluster = cluster_s
            .parse::<Cluster>()
            .with_context(|| format!("Category '{}' has invalid cluster", name))?;
        cfg.set(name, cluster);
    }
    Ok(cfg)
}

pub fn category_exists(conn: &Connection, name: &str) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM categories WHERE name=?1",
        params![name],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}
