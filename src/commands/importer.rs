// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;

use anyhow::Result;
use rusqlite::Connection;

use super::{commit, required};
use crate::clock::Clock;
use crate::csv_io::parse_csv;
use crate::error::ImportError;
use crate::state::AppState;

pub fn handle(conn: &Connection, clock: &dyn Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, clock, sub),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Reads `path`, prepends every valid row to the store and saves.
pub fn import_file(conn: &Connection, clock: &dyn Clock, path: &str) -> Result<ImportSummary> {
    let content = fs::read_to_string(path).map_err(|source| ImportError::Unreadable {
        path: path.to_string(),
        source,
    })?;
    let outcome = parse_csv(&content, clock);
    if outcome.transactions.is_empty() {
        return Err(ImportError::Empty(path.to_string()).into());
    }
    let summary = ImportSummary {
        imported: outcome.transactions.len(),
        skipped: outcome.skipped,
    };
    let mut state = AppState::load(conn)?;
    state.add_transactions(outcome.transactions);
    commit(conn, &state, clock)?;
    tracing::info!(path, imported = summary.imported, skipped = summary.skipped, "CSV import");
    Ok(summary)
}

fn import_transactions(conn: &Connection, clock: &dyn Clock, sub: &clap::ArgMatches) -> Result<()> {
    let path = required(sub, "path")?.trim();
    let summary = import_file(conn, clock, path)?;
    if summary.skipped > 0 {
        println!(
            "Imported {} transactions ({} rows skipped)",
            summary.imported, summary.skipped
        );
    } else {
        println!("Imported {} transactions", summary.imported);
    }
    Ok(())
}
