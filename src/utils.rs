// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday,
};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::error::SpendError;

/// Storage format for transaction timestamps.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_CURRENCY: &str = "VND";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

fn parse_zoned(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DD HH:MM[:SS]` (space or `T`),
/// RFC 3339 and `YYYY-MM-DD HH:MM:SS +ZZZZ`. Zoned inputs are converted to local time.
pub fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, SpendError> {
    let s = s.trim();
    if let Some(dt) = parse_zoned(s) {
        return Ok(dt);
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::default()))
        .map_err(|_| SpendError::InvalidTimestamp(s.to_string()))
}

/// Reference instant for reports. A bare date means the end of that day, so
/// everything spent on it is already counted.
pub fn parse_as_of(s: &str) -> std::result::Result<NaiveDateTime, SpendError> {
    let trimmed = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(end_of_day(d));
    }
    parse_timestamp(trimmed)
}

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn end_of_day(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| SpendError::InvalidAmount(s.trim().to_string()))
        .with_context(|| format!("Invalid decimal '{}'", s.trim()))
}

/// Amounts entered by the user must be strictly positive.
pub fn parse_positive_amount(s: &str) -> Result<Decimal> {
    let amount = parse_decimal(s)?;
    if amount <= Decimal::ZERO {
        return Err(SpendError::NonPositiveAmount(amount.to_string()).into());
    }
    Ok(amount)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

/// Moves `(year, month)` by `delta` calendar months; month is 1-based.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let idx = year * 12 + (month as i32 - 1) + delta;
    (idx.div_euclid(12), (idx.rem_euclid(12) + 1) as u32)
}

pub fn in_month(ts: &NaiveDateTime, year: i32, month: u32) -> bool {
    ts.year() == year && ts.month() == month
}

pub fn is_weekend(d: NaiveDate) -> bool {
    matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts (weekend, weekday) among the `days` calendar days after `from`.
pub fn upcoming_day_mix(from: NaiveDate, days: u32) -> (u32, u32) {
    let mut weekend = 0;
    let mut weekday = 0;
    for i in 1..=days {
        let d = from + Duration::days(i as i64);
        if is_weekend(d) {
            weekend += 1;
        } else {
            weekday += 1;
        }
    }
    (weekend, weekday)
}

/// `1234567.5` -> `1,234,567.50`; whole amounts print without decimals.
pub fn fmt_amount(v: f64) -> String {
    let raw = format!("{:.2}", v.abs());
    let (int_part, frac) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if v < 0.0 && raw != "0.00" { "-" } else { "" };
    if frac == "00" {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

pub fn fmt_money(v: f64, ccy: &str) -> String {
    format!("{} {}", fmt_amount(v), ccy)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency")?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn set_currency(conn: &Connection, ccy: &str) -> Result<()> {
    set_setting(conn, "currency", ccy)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
