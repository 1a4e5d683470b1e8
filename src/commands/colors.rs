// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::required;
use crate::state::AppState;
use crate::utils::{confirm, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let state = AppState::load(conn)?;
            if !maybe_print_json(
                sub.get_flag("json"),
                sub.get_flag("jsonl"),
                &state.category_colors,
            )? {
                let rows = state
                    .category_colors
                    .iter()
                    .map(|(c, hex)| vec![c.clone(), hex.clone()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Color"], rows));
            }
        }
        Some(("set", sub)) => {
            let cat = required(sub, "CATEGORY")?;
            let color = required(sub, "COLOR")?;
            let mut state = AppState::load(conn)?;
            state.set_color(cat, color)?;
            state.save(conn)?;
            println!("{} -> {}", cat.trim(), color.trim());
        }
        Some(("reset", sub)) => {
            if confirm("Restore the default category colors?", sub.get_flag("yes"))? {
                let mut state = AppState::load(conn)?;
                state.reset_colors();
                state.save(conn)?;
                println!("Colors reset");
            } else {
                println!("Cancelled");
            }
        }
        _ => {}
    }
    Ok(())
}
