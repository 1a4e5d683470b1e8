// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Filtered, ordered views of the transaction store for listing and export.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, TransactionType};
use crate::utils::parse_decimal_lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    fn matches(&self, kind: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => kind == TransactionType::Income,
            TypeFilter::Expense => kind == TransactionType::Expense,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(TypeFilter::All),
            "income" => Ok(TypeFilter::Income),
            "expense" => Ok(TypeFilter::Expense),
            other => Err(format!("unknown type filter '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "date-desc")]
    DateDesc,
    #[serde(rename = "date-asc")]
    DateAsc,
    #[serde(rename = "amount-desc")]
    AmountDesc,
    #[serde(rename = "amount-asc")]
    AmountAsc,
}

impl SortKey {
    pub const VARIANTS: [&'static str; 4] = ["date-desc", "date-asc", "amount-desc", "amount-asc"];
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date-desc" => Ok(SortKey::DateDesc),
            "date-asc" => Ok(SortKey::DateAsc),
            "amount-desc" => Ok(SortKey::AmountDesc),
            "amount-asc" => Ok(SortKey::AmountAsc),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

/// View configuration. `None` / `All` / empty search mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    pub search: String,
    pub kind: TypeFilter,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub sort: SortKey,
}

impl FilterState {
    /// `"all"` (any case) or blank clears the category constraint.
    pub fn with_category(mut self, category: &str) -> Self {
        let c = category.trim();
        self.category = if c.is_empty() || c.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(c.to_string())
        };
        self
    }

    /// Amount bounds come from free text; anything unparseable is ignored.
    pub fn with_amount_bounds(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.min_amount = min.and_then(parse_decimal_lenient);
        self.max_amount = max.and_then(parse_decimal_lenient);
        self
    }

    /// Number of active constraints, not counting the sort order.
    pub fn active_count(&self) -> usize {
        [
            !self.search.trim().is_empty(),
            self.kind != TypeFilter::All,
            self.category.is_some(),
            self.start_date.is_some(),
            self.end_date.is_some(),
            self.min_amount.is_some(),
            self.max_amount.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        if !self.kind.matches(t.kind) {
            return false;
        }
        if let Some(ref c) = self.category {
            if &t.category != c {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty()
            && !t.description.to_lowercase().contains(&needle)
            && !t.category.to_lowercase().contains(&needle)
        {
            return false;
        }
        let day = t.date.date();
        if self.start_date.is_some_and(|start| day < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| day > end) {
            return false;
        }
        if self.min_amount.is_some_and(|min| t.amount < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| t.amount > max) {
            return false;
        }
        true
    }
}

/// Matching transactions in the requested order. Equal keys keep store order.
pub fn apply<'a>(transactions: &'a [Transaction], filter: &FilterState) -> Vec<&'a Transaction> {
    let mut out: Vec<&Transaction> = transactions.iter().filter(|t| filter.matches(t)).collect();
    match filter.sort {
        SortKey::DateDesc => out.sort_by(|a, b| b.date.cmp(&a.date)),
        SortKey::DateAsc => out.sort_by(|a, b| a.date.cmp(&b.date)),
        SortKey::AmountDesc => out.sort_by(|a, b| b.amount.cmp(&a.amount)),
        SortKey::AmountAsc => out.sort_by(|a, b| a.amount.cmp(&b.amount)),
    }
    out
}

/// The `n` most recent transactions, newest first.
pub fn most_recent(transactions: &[Transaction], n: usize) -> Vec<Transaction> {
    let mut v = apply(transactions, &FilterState::default());
    v.truncate(n);
    v.into_iter().cloned().collect()
}
