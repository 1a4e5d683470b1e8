// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod advisor;
pub mod budgets;
pub mod colors;
pub mod demo;
pub mod exporter;
pub mod importer;
pub mod notifications;
pub mod reports;
pub mod sync;
pub mod transactions;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::clock::Clock;
use crate::filter::{FilterState, SortKey, TypeFilter};
use crate::notifications::{NotificationEngine, NotificationLog};
use crate::state::AppState;
use crate::utils::parse_date;

/// Saves `state`, then runs the budget and bill rules over it and saves the
/// log. Returns how many notifications were raised.
pub fn commit(conn: &Connection, state: &AppState, clock: &dyn Clock) -> Result<usize> {
    state.save(conn)?;
    let mut log = NotificationLog::load(conn)?;
    let added = NotificationEngine::new(clock).evaluate(&mut log, &state.transactions, &state.budgets);
    if added > 0 {
        log.save(conn)?;
        println!(
            "{} new notification(s), {} unread. See `finanzas notify list`.",
            added,
            log.unread_count()
        );
    }
    Ok(added)
}

pub(crate) fn required<'a>(sub: &'a clap::ArgMatches, id: &str) -> Result<&'a str> {
    sub.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("missing required argument '{}'", id))
}

pub(crate) fn optional<'a>(sub: &'a clap::ArgMatches, id: &str) -> Option<&'a str> {
    sub.get_one::<String>(id).map(String::as_str)
}

/// Builds the list/export filter from the shared filter flags.
pub(crate) fn filter_from(sub: &clap::ArgMatches) -> Result<FilterState> {
    let kind: TypeFilter = optional(sub, "type")
        .unwrap_or("all")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let sort: SortKey = optional(sub, "sort")
        .unwrap_or("date-desc")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let start_date = optional(sub, "from").map(parse_date).transpose()?;
    let end_date = optional(sub, "to").map(parse_date).transpose()?;
    let filter = FilterState {
        search: optional(sub, "search").unwrap_or_default().to_string(),
        kind,
        start_date,
        end_date,
        sort,
        ..Default::default()
    }
    .with_category(optional(sub, "category").unwrap_or("all"))
    .with_amount_bounds(optional(sub, "min"), optional(sub, "max"));
    Ok(filter)
}
