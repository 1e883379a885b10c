// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::db_path;
use crate::utils::{get_currency, pretty_table, set_currency};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let rows = vec![
                vec!["database".into(), db_path()?.display().to_string()],
                vec!["currency".into(), get_currency(conn)?],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set-currency", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().trim().to_uppercase();
            if ccy.is_empty() || !ccy.chars().all(|c| c.is_ascii_alphabetic()) {
                bail!("Currency must be a letter code such as VND or USD");
            }
            set_currency(conn, &ccy)?;
            println!("Currency set to {}", ccy);
        }
        _ => {}
    }
    Ok(())
}
