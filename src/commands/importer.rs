// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::insert_transaction;
use crate::models::{Transaction, TransactionKind};
use crate::utils::{parse_positive_amount, parse_timestamp};
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, StringRecord};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let summary = import_transactions(conn, Path::new(path))?;
            println!(
                "Imported {} transactions from {} ({} non-expense rows skipped)",
                summary.imported, path, summary.skipped
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Column positions resolved from the header row, case-insensitively.
#[derive(Debug, PartialEq, Eq)]
struct Columns {
    date: usize,
    amount: usize,
    category: usize,
    note: Option<usize>,
    kind: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        };
        let need = |name: &str| find(name).ok_or_else(|| anyhow!("CSV header has no '{}' column", name));
        Ok(Self {
            date: need("date")?,
            amount: need("amount")?,
            category: need("category")?,
            note: find("note"),
            kind: find("type"),
        })
    }
}

/// Imports every expense row in one database transaction; any bad row aborts
/// the whole file.
pub fn import_transactions(conn: &mut Connection, path: &Path) -> Result<ImportSummary> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;
    let cols = Columns::from_header(rdr.headers()?)?;

    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();
    for (idx, result) in rdr.records().enumerate() {
        let rec = result?;
        // header is line 1
        let line = idx + 2;
        let field = |i: usize| rec.get(i).map(str::trim).unwrap_or("");

        let kind_raw = cols.kind.map(field).unwrap_or("");
        let kind = if kind_raw.is_empty() {
            TransactionKind::Expense
        } else {
            match TransactionKind::parse(kind_raw) {
                Some(k) => k,
                None => {
                    debug!(line, kind = %kind_raw, "skipping non-expense row");
                    summary.skipped += 1;
                    continue;
                }
            }
        };

        let date = parse_timestamp(field(cols.date)).with_context(|| format!("Line {}", line))?;
        let amount =
            parse_positive_amount(field(cols.amount)).with_context(|| format!("Line {}", line))?;
        let category = field(cols.category);
        if category.is_empty() {
            return Err(anyhow!("Line {}: category is empty", line));
        }
        let note = cols.note.map(field).filter(|s| !s.is_empty());

        let mut t = Transaction::new(date, amount, category.to_string());
        t.note = note.map(|s| s.to_string());
        t.kind = kind;
        insert_transaction(&tx, &t)?;
        summary.imported += 1;
    }
    tx.commit()?;
    info!(imported = summary.imported, skipped = summary.skipped, "csv import done");
    Ok(summary)
}
