// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use spendcast::stats;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn median_handles_empty_odd_and_even() {
    assert_eq!(stats::median(&[]), 0.0);
    assert_eq!(stats::median(&[5.0]), 5.0);
    assert_eq!(stats::median(&[1.0, 3.0]), 2.0);
    assert_eq!(stats::median(&[3.0, 1.0, 2.0]), 2.0);
    assert_eq!(stats::median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
}

#[test]
fn median_non_zero_ignores_quiet_days() {
    assert_eq!(stats::median_non_zero(&[0.0, 0.0, 0.0]), 0.0);
    assert_eq!(stats::median_non_zero(&[0.0, 300.0, 0.0, 100.0, 200.0]), 200.0);
}

#[test]
fn percentile_interpolates_between_ranks() {
    assert!(close(stats::percentile(&[10.0, 20.0, 30.0, 40.0], 50.0), 25.0));
    assert!(close(stats::percentile(&[40.0, 10.0, 30.0, 20.0], 25.0), 17.5));
    assert_eq!(stats::percentile(&[7.0], 75.0), 7.0);
    assert_eq!(stats::percentile(&[10.0, 20.0], 100.0), 20.0);
    assert_eq!(stats::percentile(&[], 25.0), 0.0);
    assert_eq!(stats::percentile(&[], 90.0), 0.0);
}

#[test]
fn stddev_uses_sample_denominator() {
    assert_eq!(stats::stddev(&[], 0.0), 0.0);
    assert_eq!(stats::stddev(&[42.0], 42.0), 0.0);
    let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    assert!(close(stats::stddev(&v, 5.0), (32.0f64 / 7.0).sqrt()));
}

#[test]
fn coefficient_of_variation_guards_non_positive_mean() {
    assert_eq!(stats::coefficient_of_variation(&[1.0, 2.0], 0.0), 0.0);
    assert_eq!(stats::coefficient_of_variation(&[1.0, 2.0], -1.0), 0.0);
    let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    assert!(close(
        stats::coefficient_of_variation(&v, 5.0),
        (32.0f64 / 7.0).sqrt() / 5.0
    ));
}

#[test]
fn adaptive_alpha_follows_volatility() {
    assert_eq!(stats::adaptive_alpha(&[100.0; 30]), 0.4);
    assert_eq!(stats::adaptive_alpha(&[0.0; 30]), 0.4);
    // short series keep the base factor
    assert_eq!(stats::adaptive_alpha(&[1.0, 50.0, 3.0]), stats::BASE_ALPHA);

    let mut noisy = vec![0.0; 30];
    noisy[0] = 1_000.0;
    noisy[15] = 1_000.0;
    assert_eq!(stats::adaptive_alpha(&noisy), 0.15);
}

#[test]
fn ewma_seeds_with_first_value() {
    assert_eq!(stats::ewma(&[], 0.3), 0.0);
    assert_eq!(stats::ewma(&[80.0], 0.3), 80.0);
    assert!(close(stats::ewma(&[10.0, 20.0], 0.5), 15.0));
    assert!(close(stats::ewma(&[10.0, 20.0, 30.0], 0.5), 22.5));
}

fn alternating(low: f64, high: f64) -> Vec<f64> {
    (0..10).map(|i| if i % 2 == 0 { low } else { high }).collect()
}

#[test]
fn adaptive_alpha_middle_tiers() {
    // cv ~0.53
    assert_eq!(stats::adaptive_alpha(&alternating(1.0, 3.0)), 0.2);
    // cv ~0.35
    assert_eq!(stats::adaptive_alpha(&alternating(1.5, 3.0)), 0.3);
    // cv ~0.21
    assert_eq!(stats::adaptive_alpha(&alternating(2.0, 3.0)), 0.4);
}
