// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;

use super::required;
use crate::ai::{GeminiClient, Unconfigured};
use crate::clock::Clock;
use crate::config::Settings;
use crate::notifications::{AlertAnalyzer, NotificationEngine, NotificationLog};
use crate::state::AppState;
use crate::utils::{confirm, maybe_print_json, pretty_table};

pub fn handle(
    conn: &Connection,
    clock: &dyn Clock,
    settings: &Settings,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("check", _)) => {
            let added = check(conn, clock)?;
            println!("{} new notification(s)", added);
        }
        Some(("read", sub)) => {
            let id = required(sub, "ID")?;
            let mut log = NotificationLog::load(conn)?;
            if !log.mark_as_read(id) {
                bail!("Notification not found: {}", id);
            }
            log.save(conn)?;
            println!("Marked {} as read", id);
        }
        Some(("read-all", _)) => {
            let mut log = NotificationLog::load(conn)?;
            log.mark_all_as_read();
            log.save(conn)?;
            println!("All notifications marked as read");
        }
        Some(("clear", sub)) => {
            let mut log = NotificationLog::load(conn)?;
            if log.is_empty() {
                println!("No notifications");
            } else if confirm(
                &format!("Delete all {} notifications?", log.len()),
                sub.get_flag("yes"),
            )? {
                log.clear();
                log.save(conn)?;
                println!("Notifications cleared");
            } else {
                println!("Cancelled");
            }
        }
        Some(("ai-check", _)) => {
            let added = match GeminiClient::from_settings(settings) {
                Ok(client) => ai_check(conn, clock, &client)?,
                Err(err) => {
                    eprintln!("{}", err);
                    ai_check(conn, clock, &Unconfigured)?
                }
            };
            println!("{} new alert(s) from the AI scan", added);
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let log = NotificationLog::load(conn)?;
    let unread_only = sub.get_flag("unread");
    let items: Vec<_> = log
        .items()
        .iter()
        .filter(|n| !unread_only || !n.read)
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let rows = items
        .iter()
        .map(|n| {
            vec![
                if n.read { " " } else { "*" }.to_string(),
                n.date.format("%Y-%m-%d %H:%M").to_string(),
                n.kind.to_string(),
                n.title.clone(),
                n.message.clone(),
                n.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["", "Date", "Type", "Title", "Message", "ID"], rows)
    );
    println!("{} unread of {}", log.unread_count(), log.len());
    Ok(())
}

/// Runs the budget and bill rules against stored state.
pub fn check(conn: &Connection, clock: &dyn Clock) -> Result<usize> {
    let state = AppState::load(conn)?;
    let mut log = NotificationLog::load(conn)?;
    let added = NotificationEngine::new(clock).evaluate(&mut log, &state.transactions, &state.budgets);
    log.save(conn)?;
    Ok(added)
}

pub fn ai_check(conn: &Connection, clock: &dyn Clock, analyzer: &dyn AlertAnalyzer) -> Result<usize> {
    let state = AppState::load(conn)?;
    let mut log = NotificationLog::load(conn)?;
    let added = NotificationEngine::new(clock).run_ai_check(&mut log, &state.transactions, analyzer);
    if added > 0 {
        log.save(conn)?;
    }
    Ok(added)
}
