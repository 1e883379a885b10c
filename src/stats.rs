// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Small numeric helpers used by the forecast engine and the velocity watch.
//!
//! Every function is total: empty or degenerate input yields 0 (or the base
//! smoothing factor) instead of NaN.

/// Smoothing factor used when the series is neither very calm nor very noisy.
pub const BASE_ALPHA: f64 = 0.3;

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let v = sorted(values);
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    }
}

/// Median of the strictly positive values only ("typical hit size").
pub fn median_non_zero(values: &[f64]) -> f64 {
    let hits: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    median(&hits)
}

/// Linear-interpolation percentile, `p` in 0..=100.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let v = sorted(values);
    let index = (p / 100.0) * (v.len() - 1) as f64;
    let lower = index.floor().max(0.0) as usize;
    let upper = index.ceil().max(0.0) as usize;
    if upper >= v.len() {
        return v[lower.min(v.len() - 1)];
    }
    let weight = index - lower as f64;
    v[lower] * (1.0 - weight) + v[upper] * weight
}

/// Sample standard deviation (n - 1 denominator) around a caller-supplied centre.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sq / (values.len() - 1) as f64).sqrt()
}

pub fn coefficient_of_variation(values: &[f64], mean: f64) -> f64 {
    if mean > 0.0 {
        stddev(values, mean) / mean
    } else {
        0.0
    }
}

/// Picks an EWMA smoothing factor from the series' volatility: noisy series
/// get heavier smoothing, calm ones react faster.
pub fn adaptive_alpha(values: &[f64]) -> f64 {
    if values.len() < 7 {
        return BASE_ALPHA;
    }
    let cv = coefficient_of_variation(values, mean(values));
    if cv > 0.8 {
        0.15
    } else if cv > 0.5 {
        0.2
    } else if cv < 0.3 {
        0.4
    } else {
        BASE_ALPHA
    }
}

/// Single exponential smoothing over a chronological series, seeded by the
/// oldest value. Returns the final level.
pub fn ewma(values: &[f64], alpha: f64) -> f64 {
    let mut iter = values.iter();
    let Some(first) = iter.next() else {
        return 0.0;
    };
    iter.fold(*first, |level, v| v * alpha + level * (1.0 - alpha))
}
