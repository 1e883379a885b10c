// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category clusters drive how each category is forecast:
//!
//! * `fixed`: large, roughly monthly lump sums (rent, scheduled savings),
//!   projected from their own payment history.
//! * `regular`: everyday necessities with a steady cadence, projected with an
//!   adaptive EWMA and a weekday/weekend split.
//! * `spiky`: sparse, lumpy spending, projected as typical hit size times
//!   hit frequency.
//!
//! Any category that is not listed anywhere is treated as spiky.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Fixed,
    Regular,
    Spiky,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Fixed => "fixed",
            Cluster::Regular => "regular",
            Cluster::Spiky => "spiky",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = SpendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Cluster::Fixed),
            "regular" => Ok(Cluster::Regular),
            "spiky" => Ok(Cluster::Spiky),
            other => Err(SpendError::UnknownCluster(other.to_string())),
        }
    }
}

pub const DEFAULT_FIXED: &[&str] = &["Rent", "Savings"];
pub const DEFAULT_REGULAR: &[&str] = &["Food", "Transport", "Fuel", "Water", "Phone", "Medicine"];
pub const DEFAULT_SPIKY: &[&str] = &["Personal Items", "Printing", "Other"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub fixed: BTreeSet<String>,
    #[serde(default)]
    pub regular: BTreeSet<String>,
    /// Listed for completeness; membership here and "not listed at all" classify the same.
    #[serde(default)]
    pub spiky: BTreeSet<String>,
}

fn owned(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            fixed: owned(DEFAULT_FIXED),
            regular: owned(DEFAULT_REGULAR),
            spiky: owned(DEFAULT_SPIKY),
        }
    }
}

impl ClusterConfig {
    /// An empty table: every category forecasts as spiky.
    pub fn empty() -> Self {
        Self {
            fixed: BTreeSet::new(),
            regular: BTreeSet::new(),
            spiky: BTreeSet::new(),
        }
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Cluster)>,
        S: Into<String>,
    {
        let mut cfg = Self::empty();
        for (name, cluster) in pairs {
            cfg.set(name, cluster);
        }
        cfg
    }

    pub fn from_json_file(path: &Path) -> crate::error::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| SpendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg: ClusterConfig =
            serde_json::from_str(&raw).map_err(|source| SpendError::ClusterConfig {
                path: path.to_path_buf(),
                source,
            })?;
        cfg.normalize();
        Ok(cfg)
    }

    /// Fixed wins over regular, regular over spiky, so a name listed twice
    /// still lands in exactly one cluster.
    fn normalize(&mut self) {
        let fixed = self.fixed.clone();
        self.regular.retain(|c| !fixed.contains(c));
        let regular = self.regular.clone();
        self.spiky.retain(|c| !fixed.contains(c) && !regular.contains(c));
    }

    /// Unknown categories fall back to spiky.
    pub fn classify(&self, category: &str) -> Cluster {
        if self.fixed.contains(category) {
            Cluster::Fixed
        } else if self.regular.contains(category) {
            Cluster::Regular
        } else {
            Cluster::Spiky
        }
    }

    pub fn is_fixed(&self, category: &str) -> bool {
        self.fixed.contains(category)
    }

    pub fn set(&mut self, category: impl Into<String>, cluster: Cluster) {
        let category = category.into();
        self.remove(&category);
        match cluster {
            Cluster::Fixed => self.fixed.insert(category),
            Cluster::Regular => self.regular.insert(category),
            Cluster::Spiky => self.spiky.insert(category),
        };
    }

    pub fn remove(&mut self, category: &str) {
        self.fixed.remove(category);
        self.regular.remove(category);
        self.spiky.remove(category);
    }

    pub fn categories_in(&self, cluster: Cluster) -> &BTreeSet<String> {
        match cluster {
            Cluster::Fixed => &self.fixed,
            Cluster::Regular => &self.regular,
            Cluster::Spiky => &self.spiky,
        }
    }
}
