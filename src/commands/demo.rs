// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::commit;
use crate::clock::Clock;
use crate::demo::generate;
use crate::state::AppState;
use crate::utils::confirm;

pub fn handle(conn: &Connection, clock: &dyn Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("load", sub)) => {
            if !confirm(
                "This replaces all transactions and budgets with sample data. Continue?",
                sub.get_flag("yes"),
            )? {
                println!("Cancelled");
                return Ok(());
            }
            let count = load(conn, clock)?;
            println!("Loaded {} sample transactions and budgets", count);
        }
        _ => {}
    }
    Ok(())
}

pub fn load(conn: &Connection, clock: &dyn Clock) -> Result<usize> {
    let (transactions, budgets) = generate(clock.today());
    let count = transactions.len();
    let mut state = AppState::load(conn)?;
    state.replace_data(transactions, budgets);
    commit(conn, &state, clock)?;
    Ok(count)
}
