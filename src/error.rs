// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpendError {
    #[error("Unknown cluster '{0}', expected fixed|regular|spiky")]
    UnknownCluster(String),

    #[error("Invalid timestamp '{0}', expected YYYY-MM-DD[ HH:MM[:SS]] or RFC 3339")]
    InvalidTimestamp(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(String),

    #[error("Read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cluster config {path}: {source}")]
    ClusterConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SpendError>;
