// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Twelve months of a sample household, for trying the tool out.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::aggregation::MonthKey;
use crate::models::{BudgetMap, Transaction, TransactionType};

pub const DEMO_MONTHS: u32 = 12;

pub const DEMO_BUDGETS: &[(&str, i64)] = &[
    ("Vivienda", 550),
    ("Alimentación", 450),
    ("Transporte", 250),
    ("Salud", 150),
    ("Ocio", 100),
    ("Educación", 200),
    ("Ahorro", 150),
    ("Otros", 50),
];

/// Spread in `[0, span)` euros, in cents, derived from the slot so repeated
/// loads produce identical data.
fn jitter(month: MonthKey, slot: u32, span: i64) -> Decimal {
    let seed = (month.year as u64)
        .wrapping_mul(31)
        .wrapping_add(month.month as u64)
        .wrapping_mul(97)
        .wrapping_add(slot as u64)
        .wrapping_mul(2_654_435_761);
    let cents = (seed >> 7) % (span as u64 * 100);
    Decimal::new(cents as i64, 2)
}

struct MonthBuilder {
    month: MonthKey,
    out: Vec<Transaction>,
}

impl MonthBuilder {
    fn add(&mut self, amount: Decimal, kind: TransactionType, category: &str, desc: &str, day: u32) {
        let Some(date) = NaiveDate::from_ymd_opt(self.month.year, self.month.month, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
        else {
            return;
        };
        if let Ok(t) = Transaction::new(amount.round_dp(2), kind, category, desc, date) {
            self.out.push(t);
        }
    }

    fn expense(&mut self, base: i64, span: i64, slot: u32, category: &str, desc: &str, day: u32) {
        let amount = Decimal::from(base)
            + if span > 0 {
                jitter(self.month, slot, span)
            } else {
                Decimal::ZERO
            };
        self.add(amount, TransactionType::Expense, category, desc, day);
    }
}

pub fn demo_budgets() -> BudgetMap {
    DEMO_BUDGETS
        .iter()
        .map(|(c, v)| (c.to_string(), Decimal::from(*v)))
        .collect()
}

/// Transactions for the `DEMO_MONTHS` months ending with the month of
/// `today`, newest first.
pub fn generate(today: NaiveDate) -> (Vec<Transaction>, BudgetMap) {
    let mut month = MonthKey::containing(today);
    let mut txs = Vec::new();
    for _ in 0..DEMO_MONTHS {
        let mut b = MonthBuilder {
            month,
            out: Vec::new(),
        };
        b.add(
            Decimal::from(1500),
            TransactionType::Income,
            "Salario",
            "Nómina mensual",
            28,
        );

        b.expense(280, 0, 0, "Vivienda", "Hipoteca 2ª Vivienda", 5);
        b.expense(120, 0, 0, "Vivienda", "Comunidad y Gastos Casa Principal", 3);
        b.expense(90, 30, 1, "Vivienda", "Suministros (Luz/Agua)", 10);

        b.expense(120, 0, 0, "Salud", "Cuota Gimnasio Familiar", 2);
        b.expense(150, 0, 0, "Ahorro", "Ahorro mensual (10%)", 1);

        b.expense(65, 20, 2, "Transporte", "Gasolina Coche 1", 12);
        b.expense(65, 20, 3, "Transporte", "Gasolina Coche 2", 22);
        b.expense(25, 10, 4, "Transporte", "Gasolina Moto", 15);
        match month.month {
            3 => b.expense(350, 0, 0, "Transporte", "Seguro Coche 1", 10),
            9 => {
                b.expense(300, 0, 0, "Transporte", "Seguro Coche 2", 10);
                b.expense(120, 0, 0, "Transporte", "Seguro Moto", 12);
            }
            _ => {}
        }

        for (slot, day) in [(5, 4), (6, 11), (7, 18), (8, 25)] {
            b.expense(95, 20, slot, "Alimentación", "Supermercado Compra Semanal", day);
        }

        if matches!(month.month, 2 | 9) {
            b.expense(450, 0, 0, "Educación", "Matrícula Universidad", 15);
        }
        b.expense(50, 0, 0, "Educación", "Libros y material", 20);

        b.expense(40, 20, 9, "Ocio", "Cena fuera", 14);
        b.expense(20, 10, 10, "Ocio", "Streaming / Suscripciones", 5);

        txs.extend(b.out);
        month = month.previous();
    }
    txs.sort_by(|a, b| b.date.cmp(&a.date));
    tracing::debug!(count = txs.len(), "generated demo data");
    (txs, demo_budgets())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{group_by_month, summarize};
    use chrono::Datelike;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn twelve_months_newest_first() {
        let (txs, budgets) = generate(today());
        assert_eq!(budgets.len(), 8);
        assert_eq!(budgets["Vivienda"], Decimal::from(550));
        assert!(txs.windows(2).all(|w| w[0].date >= w[1].date));
        let months = group_by_month(&txs);
        assert_eq!(months.len(), 12);
        assert_eq!(months.first().unwrap().month.to_string(), "2023-07");
        assert_eq!(months.last().unwrap().month.to_string(), "2024-06");
        assert!(months.iter().all(|m| m.income == Decimal::from(1500)));
    }

    #[test]
    fn deterministic_and_within_ranges() {
        let (a, _) = generate(today());
        let (b, _) = generate(today());
        let amounts = |v: &[Transaction]| v.iter().map(|t| t.amount).collect::<Vec<_>>();
        assert_eq!(amounts(&a), amounts(&b));
        for t in a.iter().filter(|t| t.description == "Cena fuera") {
            assert!(t.amount >= Decimal::from(40) && t.amount < Decimal::from(60));
        }
        let s = summarize(&a);
        assert_eq!(s.total_income, Decimal::from(1500 * 12));
        assert!(s.total_expense > Decimal::ZERO);
    }

    #[test]
    fn seasonal_items_land_in_their_months() {
        let (txs, _) = generate(today());
        let tuition: Vec<u32> = txs
            .iter()
            .filter(|t| t.description == "Matrícula Universidad")
            .map(|t| t.date.month())
            .collect();
        assert_eq!(tuition.len(), 2);
        assert!(tuition.contains(&2) && tuition.contains(&9));
    }
}
