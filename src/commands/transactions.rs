// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{category_exists, insert_transaction, load_transactions};
use crate::models::Transaction;
use crate::utils::{
    TS_FORMAT, get_currency, maybe_print_json, now_local, parse_date, parse_decimal,
    parse_positive_amount, parse_timestamp, pretty_table, shift_month,
};
use anyhow::{Result, anyhow, bail};
use chrono::{Datelike, Days, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(conn, sub)?;
        }
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn trimmed<'a>(sub: &'a clap::ArgMatches, key: &str) -> Option<&'a str> {
    sub.get_one::<String>(key).map(|s| s.trim())
}

fn category_arg(sub: &clap::ArgMatches) -> Result<Option<String>> {
    match trimmed(sub, "category") {
        Some("") => bail!("Category must not be empty"),
        Some(c) => Ok(Some(c.to_string())),
        None => Ok(None),
    }
}

fn note_unknown_category(conn: &Connection, category: &str) -> Result<()> {
    if !category_exists(conn, category)? {
        warn!(%category, "category not in vocabulary, forecasts treat it as spiky");
        println!(
            "Note: '{}' is not a known category; it will be forecast as spiky spending",
            category
        );
    }
    Ok(())
}

/// Records the expense and returns its id.
pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<String> {
    let date = match trimmed(sub, "date") {
        Some(s) => parse_timestamp(s)?,
        None => now_local(),
    };
    let amount = parse_positive_amount(sub.get_one::<String>("amount").unwrap())?;
    let category = category_arg(sub)?.ok_or_else(|| anyhow!("Category is required"))?;
    let note = trimmed(sub, "note")
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    note_unknown_category(conn, &category)?;
    let mut tx = Transaction::new(date, amount, category);
    tx.note = note;
    insert_transaction(conn, &tx)?;
    println!(
        "Recorded {} {} on {} in '{}' (id {})",
        amount,
        get_currency(conn)?,
        tx.date.format(TS_FORMAT),
        tx.category,
        tx.id
    );
    Ok(tx.id)
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim().to_string();
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM transactions WHERE id=?1",
            params![&id],
            |r| r.get(0),
        )
        .optional()?;
    if existing.is_none() {
        bail!("Transaction '{}' not found", id);
    }

    // parse everything before touching the row
    let date = trimmed(sub, "date").map(parse_timestamp).transpose()?;
    let amount = trimmed(sub, "amount")
        .map(parse_positive_amount)
        .transpose()?;
    let category = category_arg(sub)?;
    let note = trimmed(sub, "note").map(|s| if s.is_empty() { None } else { Some(s) });

    if date.is_none() && amount.is_none() && category.is_none() && note.is_none() {
        println!("Nothing to change for {}", id);
        return Ok(());
    }
    if let Some(c) = &category {
        note_unknown_category(conn, c)?;
    }

    let tx = conn.unchecked_transaction()?;
    let mut changed = Vec::new();
    if let Some(date) = date {
        tx.execute(
            "UPDATE transactions SET date=?1 WHERE id=?2",
            params![date.format(TS_FORMAT).to_string(), &id],
        )?;
        changed.push("date");
    }
    if let Some(amount) = amount {
        tx.execute(
            "UPDATE transactions SET amount=?1 WHERE id=?2",
            params![amount.to_string(), &id],
        )?;
        changed.push("amount");
    }
    if let Some(category) = category {
        tx.execute(
            "UPDATE transactions SET category=?1 WHERE id=?2",
            params![category, &id],
        )?;
        changed.push("category");
    }
    if let Some(note) = note {
        tx.execute(
            "UPDATE transactions SET note=?1 WHERE id=?2",
            params![note, &id],
        )?;
        changed.push("note");
    }
    tx.execute(
        "UPDATE transactions SET updated_at=datetime('now') WHERE id=?1",
        params![&id],
    )?;
    tx.commit()?;
    println!("Updated {} ({})", id, changed.join(", "));
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Transaction '{}' not found", id);
    }
    println!("Removed transaction {}", id);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl Period {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            other => Err(anyhow!("Unknown period '{}'", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        }
    }

    /// Weeks start on Monday.
    pub fn contains(&self, anchor: NaiveDate, day: NaiveDate) -> bool {
        match self {
            Period::Day => day == anchor,
            Period::Week => day.iso_week() == anchor.iso_week(),
            Period::Month => day.year() == anchor.year() && day.month() == anchor.month(),
            Period::Year => day.year() == anchor.year(),
            Period::All => true,
        }
    }

    /// An anchor inside the period just before the one holding `anchor`.
    /// `All` has no predecessor.
    pub fn previous_anchor(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Day => anchor.pred_opt(),
            Period::Week => anchor.checked_sub_days(Days::new(7)),
            Period::Month => {
                let (y, m) = shift_month(anchor.year(), anchor.month(), -1);
                NaiveDate::from_ymd_opt(y, m, 1)
            }
            Period::Year => NaiveDate::from_ymd_opt(anchor.year() - 1, 1, 1),
            Period::All => None,
        }
    }
}

/// View and search criteria for `tx list`; every set criterion must match.
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub period: Period,
    pub anchor: NaiveDate,
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl TransactionFilter {
    pub fn from_matches(sub: &clap::ArgMatches, today: NaiveDate) -> Result<Self> {
        let period = Period::parse(trimmed(sub, "period").unwrap_or("all"))?;
        let anchor = match trimmed(sub, "on") {
            Some(s) => parse_date(s)?,
            None => today,
        };
        let opt_date = |key: &str| trimmed(sub, key).map(parse_date).transpose();
        let opt_amount = |key: &str| trimmed(sub, key).map(parse_decimal).transpose();
        Ok(Self {
            period,
            anchor,
            keyword: trimmed(sub, "keyword")
                .filter(|s| !s.is_empty())
                .map(|s| s.to_lowercase()),
            category: trimmed(sub, "category")
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            from: opt_date("from")?,
            to: opt_date("to")?,
            min: opt_amount("min")?,
            max: opt_amount("max")?,
        })
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        let day = t.date.date();
        if !self.period.contains(self.anchor, day) {
            return false;
        }
        if let Some(kw) = &self.keyword {
            let in_note = t
                .note
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(kw));
            if !in_note && !t.category.to_lowercase().contains(kw) {
                return false;
            }
        }
        if self.category.as_ref().is_some_and(|c| c != &t.category) {
            return false;
        }
        if self.from.is_some_and(|f| day < f) || self.to.is_some_and(|to| day > to) {
            return false;
        }
        if self.min.is_some_and(|m| t.amount < m) || self.max.is_some_and(|m| t.amount > m) {
            return false;
        }
        true
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub amount: String,
    pub category: String,
    pub note: String,
    #[serde(rename = "type")]
    pub kind: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = TransactionFilter::from_matches(sub, now_local().date())?;
    let limit = sub.get_one::<usize>("limit").copied();
    // load_transactions returns newest first
    let rows = load_transactions(conn)?
        .into_iter()
        .filter(|t| filter.matches(t))
        .take(limit.unwrap_or(usize::MAX))
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.format(TS_FORMAT).to_string(),
            amount: t.amount.to_string(),
            category: t.category,
            note: t.note.unwrap_or_default(),
            kind: t.kind.as_str().to_string(),
        })
        .collect();
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.note.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Amount", "Category", "Note", "ID"], rows)
        );
    }
    Ok(())
}
