// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spending-velocity watch: compares the last ten days of variable spending
//! per category with the thirty days before, scaled to the same length.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clusters::ClusterConfig;
use crate::models::Transaction;

pub const CURRENT_WINDOW_DAYS: i64 = 10;
pub const BASELINE_WINDOW_DAYS: i64 = 30;
/// How many flagged categories are reported.
pub const MAX_REPORTED: usize = 2;

/// A category with no baseline is flagged above this amount, or when it shows
/// up on at least `NEW_CATEGORY_MIN_DAYS` distinct days.
const NEW_CATEGORY_AMOUNT: f64 = 300_000.0;
const NEW_CATEGORY_MIN_DAYS: usize = 2;
/// Existing categories below this current-window amount are never flagged.
const MIN_CURRENT_SUM: f64 = 50_000.0;
const MAJOR_WEIGHT: f64 = 0.2;
const MINOR_WEIGHT: f64 = 0.05;
const MAJOR_RATIO: f64 = 1.15;
const DEFAULT_RATIO: f64 = 1.25;
const MINOR_RATIO: f64 = 1.4;
const MINOR_MIN_DIFF: f64 = 50_000.0;
const MIN_DIFF: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityAnomaly {
    pub category: String,
    pub current_sum: f64,
    pub baseline_norm: f64,
    /// `None` for categories without a baseline.
    pub ratio: Option<f64>,
    /// Amount above the normalized baseline; the full current sum for new categories.
    pub diff: f64,
    pub weight: f64,
    pub days_active: usize,
    pub is_new: bool,
}

#[derive(Default)]
struct CategoryWindow {
    current: f64,
    baseline: f64,
    days: BTreeSet<NaiveDate>,
}

/// Ratio above which a category is considered accelerating, by its share of
/// current spending: big categories are held to a tighter bound.
fn ratio_threshold(weight: f64) -> f64 {
    if weight > MAJOR_WEIGHT {
        MAJOR_RATIO
    } else if weight < MINOR_WEIGHT {
        MINOR_RATIO
    } else {
        DEFAULT_RATIO
    }
}

/// Returns at most [`MAX_REPORTED`] categories, largest overage first.
pub fn detect_velocity_anomalies(
    transactions: &[Transaction],
    now: NaiveDateTime,
    clusters: &ClusterConfig,
) -> Vec<VelocityAnomaly> {
    let today = now.date();
    let current_start = today - Duration::days(CURRENT_WINDOW_DAYS - 1);
    let base_start = current_start - Duration::days(BASELINE_WINDOW_DAYS);

    let mut windows: BTreeMap<&str, CategoryWindow> = BTreeMap::new();
    let mut current_total = 0.0;

    for t in transactions
        .iter()
        .filter(|t| t.is_expense() && !clusters.is_fixed(&t.category) && t.date <= now)
    {
        let day = t.date.date();
        let amount = t.amount_f64();
        if day >= current_start {
            let w = windows.entry(t.category.as_str()).or_default();
            w.current += amount;
            w.days.insert(day);
            current_total += amount;
        } else if day >= base_start {
            windows.entry(t.category.as_str()).or_default().baseline += amount;
        }
    }

    let mut flagged = Vec::new();
    for (cat, w) in windows.iter().filter(|(_, w)| !w.days.is_empty()) {
        let baseline_norm = w.baseline / BASELINE_WINDOW_DAYS as f64 * CURRENT_WINDOW_DAYS as f64;
        let weight = if current_total > 0.0 {
            w.current / current_total
        } else {
            0.0
        };
        let days_active = w.days.len();

        if baseline_norm == 0.0 {
            if w.current > NEW_CATEGORY_AMOUNT || days_active >= NEW_CATEGORY_MIN_DAYS {
                flagged.push(VelocityAnomaly {
                    category: cat.to_string(),
                    current_sum: w.current,
                    baseline_norm,
                    ratio: None,
                    diff: w.current,
                    weight,
                    days_active,
                    is_new: true,
                });
            }
            continue;
        }

        if w.current <= MIN_CURRENT_SUM {
            continue;
        }
        let ratio = w.current / baseline_norm;
        let diff = w.current - baseline_norm;
        let min_diff = if weight < MINOR_WEIGHT {
            MINOR_MIN_DIFF
        } else {
            MIN_DIFF
        };
        if ratio > ratio_threshold(weight) && diff > min_diff {
            flagged.push(VelocityAnomaly {
                category: cat.to_string(),
                current_sum: w.current,
                baseline_norm,
                ratio: Some(ratio),
                diff,
                weight,
                days_active,
                is_new: false,
            });
        }
    }

    flagged.sort_by(|a, b| b.diff.total_cmp(&a.diff));
    flagged.truncate(MAX_REPORTED);
    for a in &flagged {
        debug!(category = %a.category, diff = a.diff, is_new = a.is_new, "velocity anomaly");
    }
    flagged
}
