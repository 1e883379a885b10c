// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::anomaly::detect_velocity_anomalies;
use crate::commands::forecast::report_inputs;
use crate::db::load_transactions;
use crate::utils::{fmt_money, get_currency, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (now, clusters) = report_inputs(conn, sub)?;
    let transactions = load_transactions(conn)?;
    let flagged = detect_velocity_anomalies(&transactions, now, &clusters);

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &flagged)? {
        return Ok(());
    }
    if flagged.is_empty() {
        println!("Spending is steady: no category accelerated over the last 10 days.");
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = flagged
        .iter()
        .map(|a| {
            let change = match a.ratio {
                Some(r) => format!("+{:.0}%", (r - 1.0) * 100.0),
                None => "new".to_string(),
            };
            vec![
                a.category.clone(),
                change,
                fmt_money(a.current_sum, &ccy),
                fmt_money(a.baseline_norm, &ccy),
                fmt_money(a.diff, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Category", "Change", "Last 10 days", "Usual", "Over by"],
            rows
        )
    );
    Ok(())
}
