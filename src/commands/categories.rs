// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::clusters::Cluster;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = name_arg(sub)?;
            let cluster = cluster_arg(sub)?;
            conn.execute(
                "INSERT INTO categories(name, cluster) VALUES (?1, ?2)",
                params![name, cluster.as_str()],
            )?;
            println!("Added category '{}' ({})", name, cluster);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = name_arg(sub)?;
            let n = conn.execute("DELETE FROM categories WHERE name=?1", params![name])?;
            if n == 0 {
                bail!("Category '{}' not found", name);
            }
            // existing transactions keep their label
            println!("Removed category '{}'", name);
        }
        Some(("set-cluster", sub)) => {
            let name = name_arg(sub)?;
            let cluster = cluster_arg(sub)?;
            let n = conn.execute(
                "UPDATE categories SET cluster=?1 WHERE name=?2",
                params![cluster.as_str(), name],
            )?;
            if n == 0 {
                bail!("Category '{}' not found", name);
            }
            println!("Category '{}' is now {}", name, cluster);
        }
        _ => {}
    }
    Ok(())
}

fn name_arg(sub: &clap::ArgMatches) -> Result<String> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    if name.is_empty() {
        bail!("Category name must not be empty");
    }
    Ok(name.to_string())
}

fn cluster_arg(sub: &clap::ArgMatches) -> Result<Cluster> {
    let raw = sub
        .get_one::<String>("cluster")
        .map(|s| s.as_str())
        .unwrap_or("spiky");
    Ok(raw.parse::<Cluster>()?)
}

#[derive(Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub cluster: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut stmt = conn.prepare("SELECT name, cluster FROM categories ORDER BY cluster, name")?;
    let rows = stmt.query_map([], |r| {
        Ok(CategoryRow {
            name: r.get(0)?,
            cluster: r.get(1)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|c| vec![c.name.clone(), c.cluster.clone()])
            .collect();
        println!("{}", pretty_table(&["Category", "Cluster"], rows));
    }
    Ok(())
}
