// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;

use super::{filter_from, optional};
use crate::clock::Clock;
use crate::csv_io::export_csv;
use crate::filter;
use crate::state::AppState;

pub fn handle(conn: &Connection, clock: &dyn Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            match export_transactions(conn, clock, sub)? {
                Some((path, count)) => {
                    println!("Exported {} transactions to {}", count, path.display())
                }
                None => println!("No transactions match; nothing exported"),
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn default_file_name(clock: &dyn Clock, ext: &str) -> String {
    format!("finanzas_export_{}.{}", clock.today().format("%Y-%m-%d"), ext)
}

/// Writes the filtered list. `None` when there is nothing to write.
pub fn export_transactions(
    conn: &Connection,
    clock: &dyn Clock,
    sub: &clap::ArgMatches,
) -> Result<Option<(PathBuf, usize)>> {
    let fmt = optional(sub, "format").unwrap_or("csv").to_lowercase();
    let state = AppState::load(conn)?;
    let f = filter_from(sub)?;
    let rows = filter::apply(&state.transactions, &f);
    if rows.is_empty() {
        return Ok(None);
    }

    let body = match fmt.as_str() {
        "csv" => export_csv(rows.iter().copied()),
        "json" => serde_json::to_string_pretty(&rows)?,
        other => bail!("Unknown format: {} (use csv|json)", other),
    };
    let out = match optional(sub, "out") {
        Some(p) => PathBuf::from(p.trim()),
        None => PathBuf::from(default_file_name(clock, &fmt)),
    };
    std::fs::write(&out, body).with_context(|| format!("Write {}", out.display()))?;
    tracing::info!(path = %out.display(), count = rows.len(), "export written");
    Ok(Some((out, rows.len())))
}
