// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use super::optional;
use crate::aggregation::{
    MonthlyTotals, Summary, group_by_category, group_by_month, percentage_of, sort_by_total_desc,
    summarize,
};
use crate::models::{SAVINGS_GOAL_PERCENT, TransactionType};
use crate::state::AppState;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("by-category", sub)) => by_category(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    #[serde(flatten)]
    pub summary: Summary,
    pub savings_goal: Decimal,
    pub meets_goal: bool,
}

pub fn summary_report(conn: &Connection) -> Result<SummaryReport> {
    let state = AppState::load(conn)?;
    let summary = summarize(&state.transactions);
    let goal = Decimal::from(SAVINGS_GOAL_PERCENT);
    Ok(SummaryReport {
        summary,
        savings_goal: goal,
        meets_goal: summary.savings_rate >= goal,
    })
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = summary_report(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let s = &report.summary;
    let verdict = if s.total_income.is_zero() {
        "no income recorded".to_string()
    } else if report.meets_goal {
        format!("meets the {}% goal", report.savings_goal)
    } else {
        format!("below the {}% goal", report.savings_goal)
    };
    let rows = vec![
        vec!["Income".into(), fmt_money(&s.total_income)],
        vec!["Expenses".into(), fmt_money(&s.total_expense)],
        vec!["Balance".into(), fmt_money(&s.balance)],
        vec![
            "Savings rate".into(),
            format!("{:.1}% ({})", s.savings_rate.round_dp(1), verdict),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub share: Decimal,
}

/// Per-category totals, largest first, with each one's share of the whole.
pub fn category_totals(conn: &Connection, kind: TransactionType) -> Result<Vec<CategoryTotal>> {
    let state = AppState::load(conn)?;
    let mut groups = group_by_category(&state.transactions, kind);
    sort_by_total_desc(&mut groups);
    let grand = groups
        .iter()
        .fold(Decimal::ZERO, |acc, (_, v)| acc.saturating_add(*v));
    Ok(groups
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            share: if grand.is_zero() {
                Decimal::ZERO
            } else {
                percentage_of(total, grand)
            },
            category,
            total,
        })
        .collect())
}

fn by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TransactionType = optional(sub, "type").unwrap_or("expense").parse()?;
    let data = category_totals(conn, kind)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                fmt_money(&c.total),
                format!("{:.1}%", c.share.round_dp(1)),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Total", "Share"], rows));
    Ok(())
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let state = AppState::load(conn)?;
    let data: Vec<MonthlyTotals> = group_by_month(&state.transactions);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|m| {
            vec![
                m.month.to_string(),
                fmt_money(&m.income),
                fmt_money(&m.expense),
                fmt_money(&(m.income - m.expense)),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Income", "Expenses", "Net"], rows));
    Ok(())
}
