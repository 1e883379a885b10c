// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::Period;
use crate::db::load_transactions;
use crate::models::Transaction;
use crate::utils::{
    TS_FORMAT, fmt_money, get_currency, maybe_print_json, now_local, parse_date, pretty_table,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("breakdown", sub)) => breakdown(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTrend {
    pub category: String,
    pub amount: Decimal,
    /// Share of the period total, in percent.
    pub share_pct: f64,
    pub previous: Decimal,
    /// `None` when the category had nothing in the previous period.
    pub change_pct: Option<f64>,
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestExpense {
    pub amount: Decimal,
    pub label: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub period: String,
    pub anchor: NaiveDate,
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub largest: Option<LargestExpense>,
    /// Total of the preceding period; absent for `all`.
    pub previous_total: Option<Decimal>,
    pub change_pct: Option<f64>,
    pub categories: Vec<CategoryTrend>,
}

/// Percent change from `prev` to `cur`; undefined without a positive base.
fn pct_change(cur: Decimal, prev: Decimal) -> Option<f64> {
    if prev <= Decimal::ZERO {
        return None;
    }
    ((cur - prev) / prev * Decimal::ONE_HUNDRED).to_f64()
}

fn by_category<'a, I>(txs: I) -> BTreeMap<&'a str, Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for t in txs {
        *totals.entry(t.category.as_str()).or_insert(Decimal::ZERO) += t.amount;
    }
    totals
}

/// Per-category totals for the period holding `anchor`, each compared with
/// the same category in the period before.
pub fn category_breakdown(
    transactions: &[Transaction],
    period: Period,
    anchor: NaiveDate,
) -> Breakdown {
    let expenses = || transactions.iter().filter(|t| t.is_expense());
    let current: Vec<&Transaction> = expenses()
        .filter(|t| period.contains(anchor, t.date.date()))
        .collect();
    let previous: Option<Vec<&Transaction>> = period.previous_anchor(anchor).map(|prev| {
        expenses()
            .filter(|t| period.contains(prev, t.date.date()))
            .collect()
    });

    let total: Decimal = current.iter().map(|t| t.amount).sum();
    let count = current.len();
    let average = if count > 0 {
        (total / Decimal::from(count)).round_dp(2)
    } else {
        Decimal::ZERO
    };
    let largest = current
        .iter()
        .copied()
        .reduce(|best, t| if t.amount > best.amount { t } else { best })
        .map(|t| LargestExpense {
            amount: t.amount,
            label: t.note.clone().unwrap_or_else(|| t.category.clone()),
            date: t.date.format(TS_FORMAT).to_string(),
        });

    let prev_totals = previous
        .as_ref()
        .map(|p| by_category(p.iter().copied()))
        .unwrap_or_default();
    let previous_total: Option<Decimal> = previous
        .as_ref()
        .map(|p| p.iter().map(|t| t.amount).sum());

    let mut categories: Vec<CategoryTrend> = by_category(current.iter().copied())
        .into_iter()
        .map(|(cat, amount)| {
            let prev = prev_totals.get(cat).copied().unwrap_or(Decimal::ZERO);
            let share_pct = if total > Decimal::ZERO {
                (amount / total * Decimal::ONE_HUNDRED)
                    .to_f64()
                    .unwrap_or(0.0)
            } else {
                0.0
            };
            CategoryTrend {
                category: cat.to_string(),
                amount,
                share_pct,
                previous: prev,
                change_pct: pct_change(amount, prev),
                is_new: period != Period::All && prev <= Decimal::ZERO && amount > Decimal::ZERO,
            }
        })
        .collect();
    // biggest first; ties stay in name order
    categories.sort_by(|a, b| b.amount.cmp(&a.amount));

    Breakdown {
        period: period.as_str().to_string(),
        anchor,
        total,
        count,
        average,
        largest,
        change_pct: previous_total.and_then(|p| pct_change(total, p)),
        previous_total,
        categories,
    }
}

fn trend_label(change: Option<f64>, is_new: bool) -> String {
    match change {
        Some(c) if c.round() > 0.0 => format!("+{:.0}%", c),
        Some(c) if c.round() < 0.0 => format!("{:.0}%", c),
        Some(_) => "same".to_string(),
        None if is_new => "new".to_string(),
        None => String::new(),
    }
}

fn breakdown(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period = Period::parse(
        sub.get_one::<String>("period")
            .map(|s| s.as_str())
            .unwrap_or("month"),
    )?;
    let anchor = match sub.get_one::<String>("on") {
        Some(s) => parse_date(s)?,
        None => now_local().date(),
    };
    let report = category_breakdown(&load_transactions(conn)?, period, anchor);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }

    let ccy = get_currency(conn)?;
    let money = |d: Decimal| fmt_money(d.to_f64().unwrap_or(0.0), &ccy);
    let mut summary = vec![
        vec!["Total".into(), money(report.total)],
        vec!["Transactions".into(), report.count.to_string()],
        vec!["Average".into(), money(report.average)],
    ];
    if let Some(l) = &report.largest {
        summary.push(vec![
            "Largest".into(),
            format!("{} ({}, {})", money(l.amount), l.label, l.date),
        ]);
    }
    if let Some(prev) = report.previous_total {
        summary.push(vec!["Previous period".into(), money(prev)]);
        summary.push(vec![
            "Change".into(),
            trend_label(report.change_pct, false),
        ]);
    }
    let heading = format!("{} of {}", report.period, report.anchor);
    println!("{}", pretty_table(&[heading.as_str(), "Value"], summary));

    if report.categories.is_empty() {
        println!("No expenses in this period.");
        return Ok(());
    }
    let rows = report
        .categories
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                money(c.amount),
                format!("{:.1}%", c.share_pct),
                trend_label(c.change_pct, c.is_new),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Spent", "Share", "vs previous"], rows)
    );
    Ok(())
}
