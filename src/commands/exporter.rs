// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_transactions;
use crate::utils::TS_FORMAT;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = sub
                .get_one::<String>("format")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "csv".to_string());
            let out = sub.get_one::<String>("out").unwrap();
            let n = export_transactions(conn, &fmt, Path::new(out))?;
            println!("Exported {} transactions to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes every transaction oldest first. The CSV layout is the one
/// `import transactions` reads back.
pub fn export_transactions(conn: &Connection, fmt: &str, out: &Path) -> Result<usize> {
    let mut txs = load_transactions(conn)?;
    txs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record(["Date", "Amount", "Category", "Note", "Type"])?;
            for t in &txs {
                wtr.write_record([
                    t.date.format(TS_FORMAT).to_string(),
                    t.amount.to_string(),
                    t.category.clone(),
                    t.note.clone().unwrap_or_default(),
                    t.kind.as_str().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&txs)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(txs.len())
}
