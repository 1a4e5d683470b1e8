// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived alerts: budget thresholds, likely upcoming bills and alerts
//! returned by the AI analyzer, kept in a persisted, deduplicated log.
//!
//! A notification is suppressed when one with the same title already exists
//! dated on the same calendar day. Distinct conditions that share a title
//! therefore collapse into one entry per day.

use anyhow::Result;
use chrono::{Datelike, NaiveDateTime};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::aggregation::{MonthKey, percentage_of, spending_by_category_for_month};
use crate::clock::Clock;
use crate::db::{self, KEY_NOTIFICATIONS};
use crate::error::AiError;
use crate::filter::most_recent;
use crate::models::{BudgetMap, Notification, NotificationType, Transaction};
use crate::utils::fmt_money;

/// Transactions handed to the AI alert scan.
pub const AI_SCAN_LIMIT: usize = 20;

pub const BILL_TITLE: &str = "Posible Recibo Próximo";

const EXCEEDED_PERCENT: Decimal = Decimal::ONE_HUNDRED;
const NEAR_LIMIT_PERCENT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

pub fn exceeded_title(category: &str) -> String {
    format!("Presupuesto Excedido: {}", category)
}

pub fn near_limit_title(category: &str) -> String {
    format!("Presupuesto al Límite: {}", category)
}

/// Tuning for the "same bill as last month" reminder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillHeuristic {
    /// Days after today's day-of-month still considered "around now".
    pub window_days: u32,
    /// A payment this month within this distance (exclusive) counts as paid.
    pub amount_tolerance: Decimal,
}

impl Default for BillHeuristic {
    fn default() -> Self {
        Self {
            window_days: 3,
            amount_tolerance: Decimal::new(5, 0),
        }
    }
}

/// One alert suggested by the external analyzer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertSuggestion {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Info,
}

impl From<AlertKind> for NotificationType {
    fn from(k: AlertKind) -> Self {
        match k {
            AlertKind::Warning => NotificationType::Warning,
            AlertKind::Info => NotificationType::Info,
        }
    }
}

/// Anything that can look at recent transactions and suggest alerts.
pub trait AlertAnalyzer {
    fn analyze_alerts(&self, recent: &[Transaction]) -> Result<Vec<AlertSuggestion>, AiError>;
}

/// Newest-first notification log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationLog {
    items: Vec<Notification>,
}

impl NotificationLog {
    pub fn load(conn: &Connection) -> Result<Self> {
        let items: Vec<Notification> = db::get_json(conn, KEY_NOTIFICATIONS)?.unwrap_or_default();
        Ok(Self { items })
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        db::put_json(conn, KEY_NOTIFICATIONS, &self.items)
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    fn exists_on_day(&self, title: &str, now: &NaiveDateTime) -> bool {
        let day = now.date();
        self.items
            .iter()
            .any(|n| n.title == title && n.date.date() == day)
    }

    /// Records a notification unless the same title was already recorded
    /// today. Returns whether it was added.
    pub fn push(
        &mut self,
        title: &str,
        message: &str,
        kind: NotificationType,
        now: NaiveDateTime,
    ) -> bool {
        if self.exists_on_day(title, &now) {
            tracing::debug!(title, "notification suppressed, already raised today");
            return false;
        }
        tracing::info!(title, kind = %kind, "notification raised");
        self.items.insert(
            0,
            Notification {
                id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                message: message.to_string(),
                kind,
                date: now,
                read: false,
            },
        );
        true
    }

    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

pub struct NotificationEngine<'a> {
    clock: &'a dyn Clock,
    bills: BillHeuristic,
}

impl<'a> NotificationEngine<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self {
            clock,
            bills: BillHeuristic::default(),
        }
    }

    pub fn with_bill_heuristic(mut self, bills: BillHeuristic) -> Self {
        self.bills = bills;
        self
    }

    /// Runs the budget and recurring-bill rules to completion against the
    /// log. Returns the number of notifications added.
    pub fn evaluate(
        &self,
        log: &mut NotificationLog,
        transactions: &[Transaction],
        budgets: &BudgetMap,
    ) -> usize {
        let now = self.clock.now();
        let added = self.check_budgets(log, transactions, budgets, now)
            + self.check_upcoming_bills(log, transactions, now);
        tracing::debug!(added, "notification rules evaluated");
        added
    }

    fn check_budgets(
        &self,
        log: &mut NotificationLog,
        transactions: &[Transaction],
        budgets: &BudgetMap,
        now: NaiveDateTime,
    ) -> usize {
        let spending = spending_by_category_for_month(transactions, MonthKey::of(&now));
        let mut added = 0;
        for (category, limit) in budgets {
            if *limit <= Decimal::ZERO {
                continue;
            }
            let spent = spending.get(category).copied().unwrap_or(Decimal::ZERO);
            let percentage = percentage_of(spent, *limit);
            let pushed = if percentage >= EXCEEDED_PERCENT {
                log.push(
                    &exceeded_title(category),
                    &format!(
                        "Has gastado {} de tu límite de €{}.",
                        fmt_money(&spent),
                        limit.normalize()
                    ),
                    NotificationType::Alert,
                    now,
                )
            } else if percentage >= NEAR_LIMIT_PERCENT {
                log.push(
                    &near_limit_title(category),
                    &format!(
                        "Has consumido el 90% ({}) de tu presupuesto.",
                        fmt_money(&spent)
                    ),
                    NotificationType::Warning,
                    now,
                )
            } else {
                false
            };
            if pushed {
                added += 1;
            }
        }
        added
    }

    /// Last month's expenses whose day-of-month falls in
    /// `[today, today + window]` and which have no look-alike payment yet
    /// this month.
    pub fn upcoming_bills<'t>(
        &self,
        transactions: &'t [Transaction],
        now: NaiveDateTime,
    ) -> Vec<&'t Transaction> {
        let this_month = MonthKey::of(&now);
        let last_month = this_month.previous();
        let first_day = now.day();
        let last_day = first_day + self.bills.window_days;

        transactions
            .iter()
            .filter(|t| t.is_expense() && last_month.contains(&t.date))
            .filter(|t| (first_day..=last_day).contains(&t.date.day()))
            .filter(|past| {
                !transactions.iter().any(|t| {
                    this_month.contains(&t.date)
                        && t.category == past.category
                        && t.description == past.description
                        && (t.amount - past.amount).abs() < self.bills.amount_tolerance
                })
            })
            .collect()
    }

    fn check_upcoming_bills(
        &self,
        log: &mut NotificationLog,
        transactions: &[Transaction],
        now: NaiveDateTime,
    ) -> usize {
        let mut added = 0;
        for past in self.upcoming_bills(transactions, now) {
            let message = format!(
                "El mes pasado pagaste \"{}\" (€{}) por estas fechas. ¿Ya lo has previsto?",
                past.description,
                past.amount.normalize()
            );
            if log.push(BILL_TITLE, &message, NotificationType::Bill, now) {
                added += 1;
            }
        }
        added
    }

    /// Sends the most recent transactions to `analyzer` and records what it
    /// suggests. Failures are logged and count as zero alerts.
    pub fn run_ai_check(
        &self,
        log: &mut NotificationLog,
        transactions: &[Transaction],
        analyzer: &dyn AlertAnalyzer,
    ) -> usize {
        let recent = most_recent(transactions, AI_SCAN_LIMIT);
        let suggestions = match analyzer.analyze_alerts(&recent) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!("AI alert scan failed: {err}");
                return 0;
            }
        };
        let now = self.clock.now();
        suggestions
            .into_iter()
            .filter(|s| log.push(&s.title, &s.message, s.kind.into(), now))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::TransactionType;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn expense(amount: i64, cat: &str, desc: &str, date: NaiveDateTime) -> Transaction {
        Transaction::new(
            Decimal::new(amount, 0),
            TransactionType::Expense,
            cat,
            desc,
            date,
        )
        .unwrap()
    }

    fn budgets(cat: &str, limit: i64) -> BudgetMap {
        let mut b = BudgetMap::new();
        b.insert(cat.to_string(), Decimal::new(limit, 0));
        b
    }

    #[test]
    fn budget_at_95_percent_warns_once() {
        let clock = FixedClock(day(2024, 5, 20));
        let engine = NotificationEngine::new(&clock);
        let mut log = NotificationLog::default();
        let txs = vec![expense(380, "Alimentación", "Super", day(2024, 5, 3))];
        let b = budgets("Alimentación", 400);

        assert_eq!(engine.evaluate(&mut log, &txs, &b), 1);
        assert_eq!(log.items()[0].kind, NotificationType::Warning);
        assert_eq!(log.items()[0].title, "Presupuesto al Límite: Alimentación");
        assert_eq!(
            log.items()[0].message,
            "Has consumido el 90% (€380.00) de tu presupuesto."
        );

        // same day, same inputs
        assert_eq!(engine.evaluate(&mut log, &txs, &b), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn budget_over_limit_alerts_without_rewarning() {
        let clock = FixedClock(day(2024, 5, 20));
        let engine = NotificationEngine::new(&clock);
        let mut log = NotificationLog::default();
        let b = budgets("Alimentación", 400);
        let mut txs = vec![expense(380, "Alimentación", "Super", day(2024, 5, 3))];
        engine.evaluate(&mut log, &txs, &b);

        txs.push(expense(30, "Alimentación", "Fruta", day(2024, 5, 19)));
        assert_eq!(engine.evaluate(&mut log, &txs, &b), 1);

        let alerts: Vec<_> = log
            .items()
            .iter()
            .filter(|n| n.kind == NotificationType::Alert)
            .collect();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Presupuesto Excedido: Alimentación");
        assert_eq!(
            alerts[0].message,
            "Has gastado €410.00 de tu límite de €400."
        );
        let warnings = log
            .items()
            .iter()
            .filter(|n| n.kind == NotificationType::Warning)
            .count();
        assert_eq!(warnings, 1);
    }

    #[test]
    fn budget_rule_ignores_other_months_and_zero_limits() {
        let clock = FixedClock(day(2024, 5, 20));
        let engine = NotificationEngine::new(&clock);
        let mut log = NotificationLog::default();
        let txs = vec![
            expense(900, "Ocio", "Viaje", day(2024, 4, 28)),
            expense(900, "Otros", "Cosas", day(2024, 5, 2)),
        ];
        let mut b = budgets("Ocio", 100);
        b.insert("Otros".into(), Decimal::ZERO);
        assert_eq!(engine.evaluate(&mut log, &txs, &b), 0);
    }

    #[test]
    fn same_title_on_a_new_day_is_recorded_again() {
        let b = budgets("Ocio", 100);
        let txs = vec![expense(150, "Ocio", "Concierto", day(2024, 5, 2))];
        let mut log = NotificationLog::default();

        let d1 = FixedClock(day(2024, 5, 20));
        NotificationEngine::new(&d1).evaluate(&mut log, &txs, &b);
        let d2 = FixedClock(day(2024, 5, 21));
        NotificationEngine::new(&d2).evaluate(&mut log, &txs, &b);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn recurring_bill_reminder_fires_when_unpaid() {
        let clock = FixedClock(day(2024, 3, 3));
        let engine = NotificationEngine::new(&clock);
        let mut log = NotificationLog::default();
        let txs = vec![expense(45, "Ocio", "Netflix", day(2024, 2, 5))];

        assert_eq!(engine.evaluate(&mut log, &txs, &BudgetMap::new()), 1);
        let n = &log.items()[0];
        assert_eq!(n.kind, NotificationType::Bill);
        assert_eq!(n.title, BILL_TITLE);
        assert!(n.message.contains("Netflix"));
        assert!(n.message.contains("€45"));
    }

    #[test]
    fn recurring_bill_suppressed_when_paid_this_month() {
        let clock = FixedClock(day(2024, 3, 3));
        let engine = NotificationEngine::new(&clock);
        let mut log = NotificationLog::default();
        let txs = vec![
            expense(45, "Ocio", "Netflix", day(2024, 2, 5)),
            expense(45, "Ocio", "Netflix", day(2024, 3, 4)),
        ];
        assert_eq!(engine.evaluate(&mut log, &txs, &BudgetMap::new()), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn recurring_bill_window_and_tolerance() {
        let now = day(2024, 3, 3);
        let clock = FixedClock(now);
        let engine = NotificationEngine::new(&clock);
        let txs = vec![
            // outside the 3..=6 window
            expense(10, "Vivienda", "Agua", day(2024, 2, 2)),
            expense(10, "Vivienda", "Luz", day(2024, 2, 7)),
            // inside, paid with a small variance
            expense(50, "Vivienda", "Gas", day(2024, 2, 6)),
            expense(53, "Vivienda", "Gas", day(2024, 3, 1)),
            // inside, the "payment" differs by exactly the tolerance
            expense(20, "Ocio", "Gym", day(2024, 2, 3)),
            expense(25, "Ocio", "Gym", day(2024, 3, 1)),
        ];
        let due: Vec<&str> = engine
            .upcoming_bills(&txs, now)
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(due, vec!["Gym"]);

        let wide = NotificationEngine::new(&clock).with_bill_heuristic(BillHeuristic {
            window_days: 4,
            amount_tolerance: Decimal::new(10, 0),
        });
        let due: Vec<&str> = wide
            .upcoming_bills(&txs, now)
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(due, vec!["Luz"]);
    }

    #[test]
    fn january_looks_back_at_previous_december() {
        let now = day(2025, 1, 10);
        let clock = FixedClock(now);
        let engine = NotificationEngine::new(&clock);
        let txs = vec![expense(60, "Salud", "Seguro", day(2024, 12, 11))];
        assert_eq!(engine.upcoming_bills(&txs, now).len(), 1);
    }

    #[test]
    fn bill_title_is_shared_so_one_reminder_per_day() {
        let clock = FixedClock(day(2024, 3, 3));
        let engine = NotificationEngine::new(&clock);
        let mut log = NotificationLog::default();
        let txs = vec![
            expense(45, "Ocio", "Netflix", day(2024, 2, 4)),
            expense(9, "Ocio", "Spotify", day(2024, 2, 5)),
        ];
        assert_eq!(engine.evaluate(&mut log, &txs, &BudgetMap::new()), 1);
        assert!(log.items()[0].message.contains("Netflix"));
    }

    struct Canned(Result<Vec<AlertSuggestion>, ()>, RefCell<usize>);

    impl AlertAnalyzer for Canned {
        fn analyze_alerts(&self, recent: &[Transaction]) -> Result<Vec<AlertSuggestion>, AiError> {
            *self.1.borrow_mut() = recent.len();
            self.0.clone().map_err(|_| AiError::EmptyResponse)
        }
    }

    fn suggestion(title: &str) -> AlertSuggestion {
        AlertSuggestion {
            title: title.into(),
            message: "Revisa este gasto".into(),
            kind: AlertKind::Warning,
        }
    }

    #[test]
    fn ai_check_adds_deduplicated_alerts_and_caps_input() {
        let clock = FixedClock(day(2024, 3, 3));
        let engine = NotificationEngine::new(&clock);
        let mut log = NotificationLog::default();
        let txs: Vec<Transaction> = (1..=25)
            .map(|i| expense(i, "Ocio", "x", day(2024, 1, (i % 28 + 1) as u32)))
            .collect();
        let analyzer = Canned(
            Ok(vec![
                suggestion("Gasto duplicado"),
                suggestion("Gasto duplicado"),
                suggestion("Suscripción más cara"),
            ]),
            RefCell::new(0),
        );
        assert_eq!(engine.run_ai_check(&mut log, &txs, &analyzer), 2);
        assert_eq!(*analyzer.1.borrow(), AI_SCAN_LIMIT);
        assert_eq!(engine.run_ai_check(&mut log, &txs, &analyzer), 0);
    }

    #[test]
    fn ai_check_failure_adds_nothing() {
        let clock = FixedClock(day(2024, 3, 3));
        let engine = NotificationEngine::new(&clock);
        let mut log = NotificationLog::default();
        let analyzer = Canned(Err(()), RefCell::new(0));
        assert_eq!(engine.run_ai_check(&mut log, &[], &analyzer), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn read_and_clear_transitions() {
        let now = day(2024, 3, 3);
        let mut log = NotificationLog::default();
        log.push("A", "a", NotificationType::Info, now);
        log.push("B", "b", NotificationType::Success, now);
        assert_eq!(log.unread_count(), 2);

        let id = log.items()[1].id.clone();
        assert!(log.mark_as_read(&id));
        assert!(!log.mark_as_read("missing"));
        assert_eq!(log.unread_count(), 1);

        log.mark_all_as_read();
        assert_eq!(log.unread_count(), 0);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn log_persists_through_store() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let mut log = NotificationLog::load(&conn).unwrap();
        log.push("Hola", "mundo", NotificationType::Info, day(2024, 3, 3));
        log.save(&conn).unwrap();
        assert_eq!(NotificationLog::load(&conn).unwrap(), log);
    }
}
