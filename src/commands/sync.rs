// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::{commit, required};
use crate::clock::Clock;
use crate::config::Settings;
use crate::error::SyncError;
use crate::models::{SyncData, local_datetime};
use crate::state::AppState;
use crate::sync::SheetClient;
use crate::utils::{confirm, http_client};

pub fn handle(
    conn: &Connection,
    clock: &dyn Clock,
    settings: &Settings,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("config", sub)) => {
            let url = required(sub, "URL")?.trim();
            let mut state = AppState::load(conn)?;
            state.sheet_config.script_url = url.to_string();
            state.save(conn)?;
            println!("Sync URL saved");
        }
        Some(("status", _)) => {
            let state = AppState::load(conn)?;
            let cfg = &state.sheet_config;
            if cfg.is_configured() {
                println!("URL:       {}", cfg.script_url);
                println!(
                    "Last sync: {}",
                    cfg.last_sync.as_deref().unwrap_or("never")
                );
            } else {
                println!("Sync is not configured. Run `finanzas sync config <URL>`.");
            }
        }
        Some(("upload", _)) => {
            let state = AppState::load(conn)?;
            let client = client_for(&state, settings)?;
            client
                .upload(&state.sync_snapshot())
                .context("Upload failed; local data unchanged")?;
            stamp_last_sync(conn, clock)?;
            println!("Uploaded {} transactions", state.transactions.len());
        }
        Some(("download", sub)) => {
            let state = AppState::load(conn)?;
            let client = client_for(&state, settings)?;
            if !confirm(
                "Replace local data with the spreadsheet copy?",
                sub.get_flag("yes"),
            )? {
                println!("Cancelled");
                return Ok(());
            }
            let data = client
                .download()
                .context("Download failed; local data unchanged")?;
            let count = apply_download(conn, clock, data)?;
            println!("Downloaded {} transactions", count);
        }
        _ => {}
    }
    Ok(())
}

fn client_for(state: &AppState, settings: &Settings) -> Result<SheetClient> {
    if !state.sheet_config.is_configured() {
        return Err(SyncError::NotConfigured.into());
    }
    let http = http_client(settings.http_timeout_secs)?;
    Ok(SheetClient::new(&state.sheet_config.script_url, http)?)
}

fn now_stamp(clock: &dyn Clock) -> String {
    clock.now().format(local_datetime::FORMAT).to_string()
}

/// Records a successful exchange.
pub fn stamp_last_sync(conn: &Connection, clock: &dyn Clock) -> Result<()> {
    let mut state = AppState::load(conn)?;
    state.sheet_config.last_sync = Some(now_stamp(clock));
    state.save(conn)
}

/// Merges a downloaded snapshot into local state, re-runs the rules and
/// stamps the sync time. Returns the resulting transaction count.
pub fn apply_download(conn: &Connection, clock: &dyn Clock, data: SyncData) -> Result<usize> {
    let mut state = AppState::load(conn)?;
    state.apply_sync(data);
    state.sheet_config.last_sync = Some(now_stamp(clock));
    commit(conn, &state, clock)?;
    tracing::info!(transactions = state.transactions.len(), "sync download applied");
    Ok(state.transactions.len())
}
