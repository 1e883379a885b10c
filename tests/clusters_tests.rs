// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use spendcast::clusters::{Cluster, ClusterConfig};
use spendcast::error::SpendError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn default_table_matches_everyday_vocabulary() {
    let cfg = ClusterConfig::default();
    assert_eq!(cfg.classify("Rent"), Cluster::Fixed);
    assert_eq!(cfg.classify("Savings"), Cluster::Fixed);
    assert_eq!(cfg.classify("Food"), Cluster::Regular);
    assert_eq!(cfg.classify("Medicine"), Cluster::Regular);
    assert_eq!(cfg.classify("Printing"), Cluster::Spiky);
    assert_eq!(cfg.classify("Never Seen Before"), Cluster::Spiky);
    // lookups are exact
    assert_eq!(cfg.classify("rent"), Cluster::Spiky);
}

#[test]
fn set_moves_a_category_between_clusters() {
    let mut cfg = ClusterConfig::default();
    cfg.set("Food", Cluster::Fixed);
    assert!(cfg.is_fixed("Food"));
    assert!(!cfg.categories_in(Cluster::Regular).contains("Food"));
    cfg.remove("Food");
    assert_eq!(cfg.classify("Food"), Cluster::Spiky);
}

#[test]
fn cluster_names_parse_case_insensitively() {
    assert_eq!(" Regular ".parse::<Cluster>().unwrap(), Cluster::Regular);
    assert_eq!("FIXED".parse::<Cluster>().unwrap(), Cluster::Fixed);
    let err = "lumpy".parse::<Cluster>().unwrap_err();
    assert!(matches!(err, SpendError::UnknownCluster(ref s) if s == "lumpy"));
}

#[test]
fn json_file_overrides_and_dedupes() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"fixed": ["Rent", "Tuition"], "regular": ["Tuition", "Coffee"], "spiky": ["Coffee", "Gifts"]}}"#
    )
    .unwrap();
    file.flush().unwrap();

    let cfg = ClusterConfig::from_json_file(file.path()).unwrap();
    assert_eq!(cfg.classify("Tuition"), Cluster::Fixed);
    assert_eq!(cfg.classify("Coffee"), Cluster::Regular);
    assert_eq!(cfg.classify("Gifts"), Cluster::Spiky);
    assert!(!cfg.categories_in(Cluster::Regular).contains("Tuition"));
    assert!(!cfg.categories_in(Cluster::Spiky).contains("Coffee"));
    // not in the file, so no longer regular
    assert_eq!(cfg.classify("Food"), Cluster::Spiky);
}

#[test]
fn json_file_may_omit_clusters() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"regular": ["Food"]}}"#).unwrap();
    file.flush().unwrap();
    let cfg = ClusterConfig::from_json_file(file.path()).unwrap();
    assert!(cfg.fixed.is_empty());
    assert_eq!(cfg.classify("Food"), Cluster::Regular);
}

#[test]
fn malformed_json_reports_the_path() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    file.flush().unwrap();
    let err = ClusterConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, SpendError::ClusterConfig { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClusterConfig::from_json_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, SpendError::Io { .. }));
}

#[test]
fn empty_table_lists_nothing() {
    let cfg = ClusterConfig::empty();
    assert_ne!(cfg, ClusterConfig::default());
    assert!(cfg.categories_in(Cluster::Fixed).is_empty());
    assert_eq!(cfg.classify("Rent"), Cluster::Spiky);
    assert_eq!(cfg.classify("Food"), Cluster::Spiky);
}
