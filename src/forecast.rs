// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! End-of-month spending forecast.
//!
//! The projection has three parts:
//!
//! 1. what has already been spent this month,
//! 2. a burn rate for the variable (non-fixed) categories over the days left,
//!    split into a `regular` cluster (adaptive EWMA + weekday/weekend
//!    averages) and a `spiky` cluster (typical hit size x hit frequency),
//! 3. an expected amount for each fixed category, derived from the median of
//!    its last six months of payments.
//!
//! The engine is a pure function of the transaction slice, the reference
//! instant and the cluster table. It never fails: empty or odd input produces
//! zeros and a low confidence score.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clusters::{Cluster, ClusterConfig};
use crate::models::Transaction;
use crate::stats;
use crate::utils::{days_in_month, in_month, is_weekend, shift_month, upcoming_day_mix};

/// Length of the trailing window used for burn rates and confidence.
pub const WINDOW_DAYS: usize = 30;
/// Months of history searched for fixed-category payments.
pub const FIXED_HISTORY_MONTHS: i32 = 6;
/// Months averaged into the baseline total.
pub const BASELINE_MONTHS: i32 = 3;

/// Uncertainty band never exceeds this share of the projected variable spend.
const MAX_UNCERTAINTY_SHARE: f64 = 0.6;
/// A fixed category counts as paid once it reaches this share of its 25th percentile.
const PAID_P25_FACTOR: f64 = 0.8;
/// Fallback paid threshold (share of median) when history is shorter than three months.
const PAID_MEDIAN_FACTOR: f64 = 0.7;
/// Below this share of the paid threshold a fixed category is reported as pending.
const PENDING_FACTOR: f64 = 0.2;
/// Fewer active days than this in the window forces the minimum confidence.
const MIN_DATA_DAYS: usize = 3;
const SPARSE_CONFIDENCE: f64 = 10.0;
/// The days-remaining floor applies from this many days before month end.
const FLOOR_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BurnRateSource {
    /// Regular cluster projected from weekday/weekend averages over the days left.
    ClusteredWeekdayWeighted,
    /// No days left in the month: regular cluster uses the smoothed level as is.
    ClusteredEwma,
}

impl BurnRateSource {
    pub fn label(&self) -> &'static str {
        match self {
            BurnRateSource::ClusteredWeekdayWeighted => {
                "clustered trend (EWMA, weekday/weekend weighted)"
            }
            BurnRateSource::ClusteredEwma => "clustered trend (EWMA)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFixedItem {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub projected_total: f64,
    pub projected_min: f64,
    pub projected_max: f64,
    pub confidence: u8,
    pub current_total: f64,
    pub average_total: f64,
    pub projected_variable: f64,
    pub projected_variable_min: f64,
    pub projected_variable_max: f64,
    pub daily_burn_rate: f64,
    pub regular_burn_rate: f64,
    pub spiky_burn_rate: f64,
    pub burn_rate_source: BurnRateSource,
    pub expected_fixed_sum: f64,
    pub current_fixed_paid: f64,
    pub pending_fixed_items: Vec<PendingFixedItem>,
    pub days_remaining: u32,
    pub days_in_month: u32,
    pub weekend_days: u32,
    pub weekday_days: u32,
    pub adaptive_alpha: f64,
    pub days_with_data: usize,
}

/// Per-day sums over the trailing window, index 0 = oldest day, last = today.
struct DailySeries {
    regular: Vec<f64>,
    spiky: Vec<f64>,
    variable: Vec<f64>,
    weekend_regular: Vec<f64>,
    weekday_regular: Vec<f64>,
    active_days: usize,
}

impl DailySeries {
    fn build(
        transactions: &[Transaction],
        now: NaiveDateTime,
        clusters: &ClusterConfig,
    ) -> Self {
        let today = now.date();
        let start = today - Duration::days(WINDOW_DAYS as i64 - 1);
        let mut regular = vec![0.0; WINDOW_DAYS];
        let mut spiky = vec![0.0; WINDOW_DAYS];
        let mut variable = vec![0.0; WINDOW_DAYS];
        let mut active = BTreeSet::new();

        for t in transactions.iter().filter(|t| t.is_expense()) {
            if t.date > now {
                continue;
            }
            let Some(idx) = day_index(start, t.date.date()) else {
                continue;
            };
            let amount = t.amount_f64();
            match clusters.classify(&t.category) {
                Cluster::Fixed => continue,
                Cluster::Regular => regular[idx] += amount,
                Cluster::Spiky => spiky[idx] += amount,
            }
            variable[idx] += amount;
            active.insert(idx);
        }

        let mut weekend_regular = Vec::new();
        let mut weekday_regular = Vec::new();
        for (idx, v) in regular.iter().enumerate() {
            let day = start + Duration::days(idx as i64);
            if is_weekend(day) {
                weekend_regular.push(*v);
            } else {
                weekday_regular.push(*v);
            }
        }

        Self {
            regular,
            spiky,
            variable,
            weekend_regular,
            weekday_regular,
            active_days: active.len(),
        }
    }
}

fn day_index(start: NaiveDate, day: NaiveDate) -> Option<usize> {
    let offset = (day - start).num_days();
    if (0..WINDOW_DAYS as i64).contains(&offset) {
        Some(offset as usize)
    } else {
        None
    }
}

fn month_sum<'a, I>(txs: I) -> f64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    txs.into_iter().map(Transaction::amount_f64).sum()
}

/// Fixed-category payment totals for each of the previous months that had
/// any spending at all. Months where a category was not paid contribute no
/// data point for that category.
fn fixed_history(
    transactions: &[Transaction],
    year: i32,
    month: u32,
    clusters: &ClusterConfig,
) -> BTreeMap<String, Vec<f64>> {
    let mut history: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for back in 1..=FIXED_HISTORY_MONTHS {
        let (y, m) = shift_month(year, month, -back);
        let month_tx: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.is_expense() && in_month(&t.date, y, m))
            .collect();
        if month_tx.is_empty() {
            continue;
        }
        let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
        for t in month_tx.iter().filter(|t| clusters.is_fixed(&t.category)) {
            *sums.entry(t.category.as_str()).or_insert(0.0) += t.amount_f64();
        }
        for (cat, sum) in sums {
            history.entry(cat.to_string()).or_default().push(sum);
        }
    }
    history
}

/// Mean total of the previous months that had non-zero spending.
fn baseline_average(transactions: &[Transaction], year: i32, month: u32) -> f64 {
    let mut total = 0.0;
    let mut count = 0u32;
    for back in 1..=BASELINE_MONTHS {
        let (y, m) = shift_month(year, month, -back);
        let sum = month_sum(
            transactions
                .iter()
                .filter(|t| t.is_expense() && in_month(&t.date, y, m)),
        );
        if sum > 0.0 {
            total += sum;
            count += 1;
        }
    }
    if count > 0 { total / count as f64 } else { 0.0 }
}

struct FixedProjection {
    expected: f64,
    pending: Vec<PendingFixedItem>,
}

fn project_fixed(
    current_tx: &[&Transaction],
    history: &BTreeMap<String, Vec<f64>>,
    clusters: &ClusterConfig,
) -> FixedProjection {
    let mut expected = 0.0;
    let mut pending = Vec::new();

    for cat in clusters.categories_in(Cluster::Fixed) {
        let paid = month_sum(current_tx.iter().copied().filter(|t| &t.category == cat));
        let values = history.get(cat).map(Vec::as_slice).unwrap_or(&[]);
        let median = stats::median(values);
        let threshold = if values.len() >= 3 {
            stats::percentile(values, 25.0) * PAID_P25_FACTOR
        } else {
            median * PAID_MEDIAN_FACTOR
        };

        if median > 0.0 {
            if paid >= threshold {
                expected += paid;
            } else {
                expected += paid.max(median);
                if paid < threshold * PENDING_FACTOR {
                    pending.push(PendingFixedItem {
                        category: cat.clone(),
                        amount: median,
                    });
                }
            }
        } else {
            // no history: trust actuals
            expected += paid;
        }
    }

    FixedProjection { expected, pending }
}

/// Heuristic 0-100 score: data density, day-to-day consistency and how much
/// of the month has already elapsed.
fn confidence(
    series: &DailySeries,
    daily_burn_rate: f64,
    days_passed: u32,
    days_in_month: u32,
    days_remaining: u32,
) -> u8 {
    let data_density = (series.active_days as f64 / WINDOW_DAYS as f64).min(1.0);
    let cv = stats::coefficient_of_variation(&series.variable, daily_burn_rate);
    let consistency = (1.0 - cv.min(1.0)).max(0.0);
    let time_score = if days_in_month > 0 {
        days_passed as f64 / days_in_month as f64
    } else {
        0.0
    };

    // time matters more as the month fills with actuals
    let time_weight = 20.0 + time_score * 30.0;
    let remaining_weight = 80.0 - time_score * 30.0;
    let data_weight = remaining_weight * 0.5;
    let consist_weight = remaining_weight * 0.5;

    let mut score =
        data_density * data_weight + consistency * consist_weight + time_score * time_weight;

    if days_remaining <= FLOOR_DAYS {
        let floor = (90.0 - days_remaining as f64 * 5.0).max(40.0);
        score = score.max(floor);
    }
    // sparse data overrides the end-of-month floor
    if series.active_days < MIN_DATA_DAYS {
        score = SPARSE_CONFIDENCE;
    }

    score.round().clamp(0.0, 100.0) as u8
}

/// Projects total spending for the calendar month containing `now`.
pub fn calculate_forecast(
    transactions: &[Transaction],
    now: NaiveDateTime,
    clusters: &ClusterConfig,
) -> ForecastResult {
    let today = now.date();
    let (year, month) = (today.year(), today.month());
    let days_in_month = days_in_month(year, month);
    let days_passed = today.day();
    let days_remaining = days_in_month.saturating_sub(days_passed);

    let current_tx: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.is_expense() && in_month(&t.date, year, month))
        .collect();
    let current_total = month_sum(current_tx.iter().copied());
    let current_fixed_paid = month_sum(
        current_tx
            .iter()
            .copied()
            .filter(|t| clusters.is_fixed(&t.category)),
    );
    let current_variable_total = month_sum(
        current_tx
            .iter()
            .copied()
            .filter(|t| !clusters.is_fixed(&t.category)),
    );

    let history = fixed_history(transactions, year, month, clusters);
    let average_total = baseline_average(transactions, year, month);

    let series = DailySeries::build(transactions, now, clusters);

    // regular cluster
    let adaptive_alpha = stats::adaptive_alpha(&series.regular);
    let ewma_regular = stats::ewma(&series.regular, adaptive_alpha);
    let avg_weekend = if series.weekend_regular.is_empty() {
        ewma_regular
    } else {
        stats::mean(&series.weekend_regular)
    };
    let avg_weekday = if series.weekday_regular.is_empty() {
        ewma_regular
    } else {
        stats::mean(&series.weekday_regular)
    };
    let (weekend_days, weekday_days) = upcoming_day_mix(today, days_remaining);
    let (regular_burn_rate, burn_rate_source) = if days_remaining > 0 {
        let projected = avg_weekend * weekend_days as f64 + avg_weekday * weekday_days as f64;
        (
            projected / days_remaining as f64,
            BurnRateSource::ClusteredWeekdayWeighted,
        )
    } else {
        (ewma_regular, BurnRateSource::ClusteredEwma)
    };

    // spiky cluster: expected value of a sparse process
    let typical_hit = stats::median_non_zero(&series.spiky);
    let hit_days = series.spiky.iter().filter(|v| **v > 0.0).count();
    let frequency = hit_days as f64 / WINDOW_DAYS as f64;
    let spiky_burn_rate = typical_hit * frequency;

    let daily_burn_rate = regular_burn_rate + spiky_burn_rate;
    let projected_variable = daily_burn_rate * days_remaining as f64;

    let iqr_regular =
        stats::percentile(&series.regular, 75.0) - stats::percentile(&series.regular, 25.0);
    let spread_spiky = stats::stddev(&series.spiky, spiky_burn_rate);
    let combined_daily = iqr_regular.hypot(spread_spiky);
    let variable_uncertainty = (combined_daily * (days_remaining as f64).sqrt())
        .min(projected_variable * MAX_UNCERTAINTY_SHARE);
    let projected_variable_min = (projected_variable - variable_uncertainty).max(0.0);
    let projected_variable_max = projected_variable + variable_uncertainty;

    let confidence = confidence(
        &series,
        daily_burn_rate,
        days_passed,
        days_in_month,
        days_remaining,
    );

    let fixed = project_fixed(&current_tx, &history, clusters);

    let base = current_variable_total + fixed.expected;
    let projected_total = (base + projected_variable).max(current_total);
    let projected_min = (base + projected_variable_min).max(current_total);
    let projected_max = (base + projected_variable_max).max(current_total);

    debug!(
        %now,
        regular_burn_rate,
        spiky_burn_rate,
        adaptive_alpha,
        confidence,
        days_with_data = series.active_days,
        projected_total,
        "forecast computed"
    );

    ForecastResult {
        projected_total,
        projected_min,
        projected_max,
        confidence,
        current_total,
        average_total,
        projected_variable,
        projected_variable_min,
        projected_variable_max,
        daily_burn_rate,
        regular_burn_rate,
        spiky_burn_rate,
        burn_rate_source,
        expected_fixed_sum: fixed.expected,
        current_fixed_paid,
        pending_fixed_items: fixed.pending,
        days_remaining,
        days_in_month,
        weekend_days,
        weekday_days,
        adaptive_alpha,
        days_with_data: series.active_days,
    }
}
