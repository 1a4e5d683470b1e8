// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use super::{commit, required};
use crate::aggregation::{BudgetLevel, BudgetStatus, budget_status};
use crate::clock::Clock;
use crate::error::ValidationError;
use crate::state::AppState;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal_lenient, pretty_table};

pub fn handle(conn: &Connection, clock: &dyn Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, clock, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => status(conn, clock, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, clock: &dyn Clock, sub: &clap::ArgMatches) -> Result<()> {
    let cat = required(sub, "category")?;
    let raw = required(sub, "amount")?;
    let amount =
        parse_decimal_lenient(raw).ok_or_else(|| ValidationError::InvalidAmount(raw.trim().into()))?;
    let mut state = AppState::load(conn)?;
    state.set_budget(cat, amount)?;
    commit(conn, &state, clock)?;
    println!("Budget set for {} = {}", cat.trim(), fmt_money(&amount));
    Ok(())
}

#[derive(Serialize)]
struct BudgetRow<'a> {
    category: &'a str,
    limit: rust_decimal::Decimal,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let state = AppState::load(conn)?;
    let data: Vec<BudgetRow> = state
        .budgets
        .iter()
        .filter(|(_, v)| !v.is_zero())
        .map(|(c, v)| BudgetRow {
            category: c,
            limit: *v,
        })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|r| vec![r.category.to_string(), fmt_money(&r.limit)])
        .collect();
    println!("{}", pretty_table(&["Category", "Monthly limit"], rows));
    Ok(())
}

/// Current-month standing per budgeted category.
pub fn status_rows(conn: &Connection, clock: &dyn Clock) -> Result<Vec<BudgetStatus>> {
    let state = AppState::load(conn)?;
    Ok(budget_status(&state.transactions, &state.budgets, clock.today()))
}

fn status(conn: &Connection, clock: &dyn Clock, sub: &clap::ArgMatches) -> Result<()> {
    let data = status_rows(conn, clock)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|s| {
            vec![
                s.category.clone(),
                fmt_money(&s.spent),
                fmt_money(&s.limit),
                format!("{:.0}%", s.percentage.round_dp(0)),
                fmt_money(&s.remaining),
                match s.level {
                    BudgetLevel::Ok => "ok",
                    BudgetLevel::Near => "near limit",
                    BudgetLevel::Exceeded => "EXCEEDED",
                }
                .to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Category", "Spent", "Limit", "Used", "Remaining", "Status"],
            rows,
        )
    );
    Ok(())
}
