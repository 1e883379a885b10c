// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod anomaly;
pub mod cli;
pub mod clusters;
pub mod commands;
pub mod db;
pub mod error;
pub mod forecast;
pub mod logging;
pub mod models;
pub mod stats;
pub mod utils;
