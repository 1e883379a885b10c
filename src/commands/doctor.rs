// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{TS_FORMAT, now_local, pretty_table};
use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Returns `(issue, detail)` pairs for rows the engine would silently
/// discount or misclassify.
pub fn find_issues(conn: &Connection, now: NaiveDateTime) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();

    let mut stmt = conn.prepare("SELECT id, date, amount FROM transactions ORDER BY date, id")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: String = r.get(0)?;
        let date_s: String = r.get(1)?;
        let amount_s: String = r.get(2)?;
        match NaiveDateTime::parse_from_str(&date_s, TS_FORMAT) {
            Ok(d) if d > now => issues.push(("future_date".into(), format!("{} {}", id, date_s))),
            Ok(_) => {}
            Err(_) => issues.push(("bad_date".into(), format!("{} '{}'", id, date_s))),
        }
        match amount_s.trim().parse::<Decimal>() {
            Ok(a) if a <= Decimal::ZERO => {
                issues.push(("non_positive_amount".into(), format!("{} {}", id, a)))
            }
            Ok(_) => {}
            Err(_) => issues.push(("bad_amount".into(), format!("{} '{}'", id, amount_s))),
        }
    }

    let mut stmt = conn.prepare(
        "SELECT DISTINCT category FROM transactions
         WHERE category NOT IN (SELECT name FROM categories) ORDER BY category",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let c: String = r.get(0)?;
        issues.push(("unknown_category".into(), c));
    }
    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows: Vec<Vec<String>> = find_issues(conn, now_local())?
        .into_iter()
        .map(|(issue, detail)| vec![issue, detail])
        .collect();
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
