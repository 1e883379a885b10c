// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::clusters::ClusterConfig;
use crate::db::{load_cluster_config, load_transactions};
use crate::forecast::{ForecastResult, calculate_forecast};
use crate::utils::{fmt_money, get_currency, now_local, parse_as_of, pretty_table};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::path::Path;

/// Reference instant and cluster table shared by the reporting commands.
pub fn report_inputs(
    conn: &Connection,
    sub: &clap::ArgMatches,
) -> Result<(NaiveDateTime, ClusterConfig)> {
    let now = match sub.get_one::<String>("as-of") {
        Some(s) => parse_as_of(s)?,
        None => now_local(),
    };
    let clusters = match sub.get_one::<String>("clusters").map(|s| s.trim()) {
        Some(path) => ClusterConfig::from_json_file(Path::new(path))?,
        None => load_cluster_config(conn).context("Load category clusters")?,
    };
    Ok((now, clusters))
}

pub fn run(conn: &Connection, sub: &clap::ArgMatches) -> Result<ForecastResult> {
    let (now, clusters) = report_inputs(conn, sub)?;
    let transactions = load_transactions(conn)?;
    Ok(calculate_forecast(&transactions, now, &clusters))
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let result = run(conn, sub)?;
    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let ccy = get_currency(conn)?;
    let money = |v: f64| fmt_money(v, &ccy);
    let mut rows = vec![
        vec!["Projected total".into(), money(result.projected_total)],
        vec![
            "Range".into(),
            format!(
                "{} .. {}",
                money(result.projected_min),
                money(result.projected_max)
            ),
        ],
        vec!["Confidence".into(), format!("{}%", result.confidence)],
        vec!["Spent so far".into(), money(result.current_total)],
        vec!["Fixed paid so far".into(), money(result.current_fixed_paid)],
        vec!["Expected fixed".into(), money(result.expected_fixed_sum)],
        vec!["Projected variable".into(), money(result.projected_variable)],
        vec![
            "Daily burn rate".into(),
            format!(
                "{} ({})",
                money(result.daily_burn_rate),
                result.burn_rate_source.label()
            ),
        ],
        vec!["3-month average".into(), money(result.average_total)],
        vec![
            "Days remaining".into(),
            format!(
                "{} ({} weekend, {} weekday)",
                result.days_remaining, result.weekend_days, result.weekday_days
            ),
        ],
    ];
    for item in &result.pending_fixed_items {
        rows.push(vec![
            format!("Pending: {}", item.category),
            money(item.amount),
        ]);
    }
    println!("{}", pretty_table(&["Forecast", "Value"], rows));
    Ok(())
}
