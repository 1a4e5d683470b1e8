// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use super::{commit, required};
use crate::ai::{GeminiClient, ReceiptScan, advice_or_fallback};
use crate::clock::Clock;
use crate::config::Settings;
use crate::models::Transaction;
use crate::state::AppState;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub fn handle(
    conn: &Connection,
    clock: &dyn Clock,
    settings: &Settings,
    m: &clap::ArgMatches,
) -> Result<()> {
    let client = GeminiClient::from_settings(settings)
        .inspect_err(|e| eprintln!("{}", e))
        .ok();
    match m.subcommand() {
        Some(("advice", _)) => {
            let state = AppState::load(conn)?;
            println!("{}", advice_or_fallback(client.as_ref(), &state.transactions));
        }
        Some(("scan", sub)) => scan(conn, clock, client.as_ref(), sub)?,
        _ => {}
    }
    Ok(())
}

fn scan(
    conn: &Connection,
    clock: &dyn Clock,
    client: Option<&GeminiClient>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let path = required(sub, "image")?.trim();
    let scanned = client.and_then(|c| {
        c.scan_receipt(Path::new(path))
            .inspect_err(|e| tracing::warn!("receipt scan failed: {e}"))
            .ok()
    });
    let Some(scan) = scanned else {
        println!("Could not read the receipt. Enter the expense with `finanzas tx add`.");
        return Ok(());
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &scan)? {
        if sub.get_flag("save") {
            save_scan(conn, clock, scan)?;
        }
        return Ok(());
    }
    let rows = vec![
        vec!["Amount".into(), fmt_money(&scan.amount)],
        vec!["Date".into(), scan.date.clone()],
        vec!["Description".into(), scan.description.clone()],
        vec![
            "Category".into(),
            scan.category.clone().unwrap_or_default(),
        ],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    if sub.get_flag("save") {
        let tx = save_scan(conn, clock, scan)?;
        println!("Recorded as {} in '{}' (id {})", fmt_money(&tx.amount), tx.category, tx.id);
    }
    Ok(())
}

/// Stores a scanned receipt as an expense.
pub fn save_scan(conn: &Connection, clock: &dyn Clock, scan: ReceiptScan) -> Result<Transaction> {
    let tx = scan.into_transaction(clock.now())?;
    let mut state = AppState::load(conn)?;
    state.add_transaction(tx.clone());
    commit(conn, &state, clock)?;
    Ok(tx)
}
