// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Summary statistics over the transaction store. Everything here is a pure
//! function of its inputs; callers recompute on demand.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{BudgetMap, Transaction, TransactionType};

/// Months kept in the trend series.
pub const MONTHLY_SERIES_CAP: usize = 12;

const NEAR_LIMIT_PERCENT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub savings_rate: Decimal,
}

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: &NaiveDateTime) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn containing(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn contains(&self, date: &NaiveDateTime) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub month: MonthKey,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Ok,
    Near,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub percentage: Decimal,
    pub remaining: Decimal,
    pub level: BudgetLevel,
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for t in transactions {
        match t.kind {
            TransactionType::Income => income = income.saturating_add(t.amount),
            TransactionType::Expense => expense = expense.saturating_add(t.amount),
        }
    }
    let balance = income.saturating_sub(expense);
    let savings_rate = if income > Decimal::ZERO {
        ratio_percent(balance, income)
    } else {
        Decimal::ZERO
    };
    Summary {
        total_income: income,
        total_expense: expense,
        balance,
        savings_rate,
    }
}

/// Expense total for one category in one calendar month (`month` is 1-12).
pub fn monthly_spending(
    transactions: &[Transaction],
    category: &str,
    month: u32,
    year: i32,
) -> Decimal {
    let key = MonthKey { year, month };
    transactions
        .iter()
        .filter(|t| t.is_expense() && t.category == category && key.contains(&t.date))
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

/// Per-category expense totals for one calendar month.
pub fn spending_by_category_for_month(
    transactions: &[Transaction],
    month: MonthKey,
) -> HashMap<String, Decimal> {
    let mut spending: HashMap<String, Decimal> = HashMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.is_expense() && month.contains(&t.date))
    {
        let slot = spending.entry(t.category.clone()).or_insert(Decimal::ZERO);
        *slot = slot.saturating_add(t.amount);
    }
    spending
}

/// Totals per category for one transaction type, in first-appearance order.
pub fn group_by_category(
    transactions: &[Transaction],
    kind: TransactionType,
) -> Vec<(String, Decimal)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<(String, Decimal)> = Vec::new();
    for t in transactions.iter().filter(|t| t.kind == kind) {
        match index.get(t.category.as_str()) {
            Some(&i) => out[i].1 = out[i].1.saturating_add(t.amount),
            None => {
                index.insert(t.category.as_str(), out.len());
                out.push((t.category.clone(), t.amount));
            }
        }
    }
    out
}

/// Largest totals first. Stable, so ties keep their incoming order.
pub fn sort_by_total_desc(groups: &mut [(String, Decimal)]) {
    groups.sort_by(|a, b| b.1.cmp(&a.1));
}

/// Income/expense per calendar month, oldest first, trimmed to the most
/// recent [`MONTHLY_SERIES_CAP`] months.
pub fn group_by_month(transactions: &[Transaction]) -> Vec<MonthlyTotals> {
    let mut map: BTreeMap<MonthKey, (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions {
        let entry = map
            .entry(MonthKey::of(&t.date))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match t.kind {
            TransactionType::Income => entry.0 = entry.0.saturating_add(t.amount),
            TransactionType::Expense => entry.1 = entry.1.saturating_add(t.amount),
        }
    }
    let skip = map.len().saturating_sub(MONTHLY_SERIES_CAP);
    map.into_iter()
        .skip(skip)
        .map(|(month, (income, expense))| MonthlyTotals {
            month,
            income,
            expense,
        })
        .collect()
}

/// `part / whole * 100`, saturating towards the sign of `part` when the
/// result does not fit. `whole` must be positive.
fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(HUNDRED))
        .unwrap_or(if part.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Percentage of `limit` consumed by `spent`. `limit` must be positive. A
/// result too large to represent reads as fully exceeded.
pub fn percentage_of(spent: Decimal, limit: Decimal) -> Decimal {
    ratio_percent(spent, limit)
}

/// Current-month standing of every category with a positive budget, in
/// category order.
pub fn budget_status(
    transactions: &[Transaction],
    budgets: &BudgetMap,
    today: NaiveDate,
) -> Vec<BudgetStatus> {
    let spending = spending_by_category_for_month(transactions, MonthKey::containing(today));
    budgets
        .iter()
        .filter(|(_, limit)| **limit > Decimal::ZERO)
        .map(|(category, limit)| {
            let spent = spending.get(category).copied().unwrap_or(Decimal::ZERO);
            let percentage = percentage_of(spent, *limit);
            let level = if percentage >= HUNDRED {
                BudgetLevel::Exceeded
            } else if percentage >= NEAR_LIMIT_PERCENT {
                BudgetLevel::Near
            } else {
                BudgetLevel::Ok
            };
            BudgetStatus {
                category: category.clone(),
                limit: *limit,
                spent,
                percentage,
                remaining: limit.saturating_sub(spent),
                level,
            }
        })
        .collect()
}
