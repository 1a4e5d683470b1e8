// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDateTime;
use rusqlite::Connection;

use super::{commit, filter_from, optional, required};
use crate::clock::Clock;
use crate::filter;
use crate::models::{Transaction, TransactionType};
use crate::state::AppState;
use crate::utils::{confirm, fmt_money, maybe_print_json, parse_amount, parse_timestamp, pretty_table};

pub fn handle(conn: &Connection, clock: &dyn Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, clock, sub)?,
        Some(("edit", sub)) => edit(conn, clock, sub)?,
        Some(("rm", sub)) => remove(conn, clock, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_when(raw: &str) -> Result<NaiveDateTime> {
    parse_timestamp(raw).ok_or_else(|| anyhow!("Invalid date '{}', expected YYYY-MM-DD", raw.trim()))
}

fn add(conn: &Connection, clock: &dyn Clock, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_amount(required(sub, "amount")?)?;
    let kind: TransactionType = required(sub, "type")?.parse()?;
    let category = required(sub, "category")?;
    let description = optional(sub, "description").unwrap_or_default();
    let date = match optional(sub, "date") {
        Some(raw) => parse_when(raw)?,
        None => clock.now(),
    };

    let tx = Transaction::new(amount, kind, category, description, date)?;
    let mut state = AppState::load(conn)?;
    println!(
        "Recorded {} {} in '{}' on {} (id {})",
        tx.kind.label(),
        fmt_money(&tx.amount),
        tx.category,
        tx.date.format("%Y-%m-%d"),
        tx.id
    );
    state.add_transaction(tx);
    commit(conn, &state, clock)?;
    Ok(())
}

fn edit(conn: &Connection, clock: &dyn Clock, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "ID")?;
    let mut state = AppState::load(conn)?;
    let current = state
        .find(id)
        .cloned()
        .with_context(|| format!("Transaction not found: {}", id))?;

    let amount = match optional(sub, "amount") {
        Some(raw) => parse_amount(raw)?,
        None => current.amount,
    };
    let kind = match optional(sub, "type") {
        Some(raw) => raw.parse()?,
        None => current.kind,
    };
    let date = match optional(sub, "date") {
        Some(raw) => parse_when(raw)?,
        None => current.date,
    };
    let mut updated = Transaction::new(
        amount,
        kind,
        optional(sub, "category").unwrap_or(&current.category),
        optional(sub, "description").unwrap_or(&current.description),
        date,
    )?;
    updated.id = current.id.clone();

    if updated == current {
        println!("Nothing to change");
        return Ok(());
    }
    state.update_transaction(updated);
    commit(conn, &state, clock)?;
    println!("Updated {}", id);
    Ok(())
}

fn remove(conn: &Connection, clock: &dyn Clock, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "ID")?;
    let mut state = AppState::load(conn)?;
    let Some(tx) = state.find(id) else {
        bail!("Transaction not found: {}", id);
    };
    let prompt = format!(
        "Delete {} {} '{}'?",
        tx.kind.label(),
        fmt_money(&tx.amount),
        tx.description
    );
    if !confirm(&prompt, sub.get_flag("yes"))? {
        println!("Cancelled");
        return Ok(());
    }
    state.remove_transaction(id);
    commit(conn, &state, clock)?;
    println!("Deleted {}", id);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "ID")?;
    let state = AppState::load(conn)?;
    let tx = state
        .find(id)
        .with_context(|| format!("Transaction not found: {}", id))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), tx)? {
        return Ok(());
    }
    let rows = vec![
        vec!["ID".into(), tx.id.clone()],
        vec!["Date".into(), tx.date.format("%Y-%m-%d %H:%M").to_string()],
        vec!["Type".into(), tx.kind.label().into()],
        vec!["Category".into(), tx.category.clone()],
        vec!["Description".into(), tx.description.clone()],
        vec!["Amount".into(), fmt_money(&tx.amount)],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

fn signed(tx: &Transaction) -> String {
    match tx.kind {
        TransactionType::Income => format!("+{}", fmt_money(&tx.amount)),
        TransactionType::Expense => format!("-{}", fmt_money(&tx.amount)),
    }
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.date.format("%Y-%m-%d %H:%M").to_string(),
                    t.kind.label().to_string(),
                    t.category.clone(),
                    t.description.clone(),
                    signed(t),
                    t.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Category", "Description", "Amount", "ID"],
                rows,
            )
        );
        let active = filter_from(sub)?.active_count();
        if active > 0 {
            println!("{} shown, {} active filter(s)", data.len(), active);
        } else {
            println!("{} shown", data.len());
        }
    }
    Ok(())
}

/// Filtered and sorted transactions for `tx list`, honouring `--limit`.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let state = AppState::load(conn)?;
    let f = filter_from(sub)?;
    let mut data: Vec<Transaction> = filter::apply(&state.transactions, &f)
        .into_iter()
        .cloned()
        .collect();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}
