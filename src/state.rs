// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Application state: the transaction store, budget map, category colors and
//! sync settings. Loaded once at startup and written back after each mutation.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::{self, KEY_BUDGETS, KEY_CATEGORY_COLORS, KEY_SHEET_CONFIG, KEY_TRANSACTIONS};
use crate::error::ValidationError;
use crate::models::{
    BudgetMap, CategoryColorMap, SheetConfig, SyncData, Transaction, default_category_colors,
};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub transactions: Vec<Transaction>,
    pub budgets: BudgetMap,
    pub category_colors: CategoryColorMap,
    pub sheet_config: SheetConfig,
}

impl AppState {
    pub fn load(conn: &Connection) -> Result<Self> {
        let transactions: Vec<Transaction> =
            db::get_json(conn, KEY_TRANSACTIONS)?.unwrap_or_default();
        let budgets: BudgetMap = db::get_json(conn, KEY_BUDGETS)?.unwrap_or_default();
        let stored_colors: CategoryColorMap =
            db::get_json(conn, KEY_CATEGORY_COLORS)?.unwrap_or_default();
        let sheet_config: SheetConfig = db::get_json(conn, KEY_SHEET_CONFIG)?.unwrap_or_default();

        let mut category_colors = default_category_colors();
        category_colors.extend(stored_colors);

        tracing::debug!(
            transactions = transactions.len(),
            budgets = budgets.len(),
            "state loaded"
        );
        Ok(Self {
            transactions,
            budgets,
            category_colors,
            sheet_config,
        })
    }

    /// Writes every section or none of them.
    pub fn save(&self, conn: &Connection) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        db::put_json(&tx, KEY_TRANSACTIONS, &self.transactions)?;
        db::put_json(&tx, KEY_BUDGETS, &self.budgets)?;
        db::put_json(&tx, KEY_CATEGORY_COLORS, &self.category_colors)?;
        db::put_json(&tx, KEY_SHEET_CONFIG, &self.sheet_config)?;
        tx.commit()?;
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// New records go to the front of the store.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.insert(0, tx);
    }

    /// Prepends a batch, keeping the batch's own order.
    pub fn add_transactions(&mut self, batch: Vec<Transaction>) {
        self.transactions.splice(0..0, batch);
    }

    /// Replaces the record with the same id. Returns false when no such id.
    pub fn update_transaction(&mut self, tx: Transaction) -> bool {
        match self.transactions.iter_mut().find(|t| t.id == tx.id) {
            Some(slot) => {
                *slot = tx;
                true
            }
            None => false,
        }
    }

    pub fn remove_transaction(&mut self, id: &str) -> Option<Transaction> {
        let pos = self.transactions.iter().position(|t| t.id == id)?;
        Some(self.transactions.remove(pos))
    }

    pub fn set_budget(&mut self, category: &str, amount: Decimal) -> Result<(), ValidationError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativeBudget(category.to_string()));
        }
        self.budgets.insert(category.to_string(), amount);
        Ok(())
    }

    pub fn budget_for(&self, category: &str) -> Decimal {
        self.budgets.get(category).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn set_color(&mut self, category: &str, color: &str) -> Result<(), ValidationError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        self.category_colors
            .insert(category.to_string(), color.trim().to_string());
        Ok(())
    }

    pub fn reset_colors(&mut self) {
        self.category_colors = default_category_colors();
    }

    /// Replaces transactions and budgets wholesale (demo data).
    pub fn replace_data(&mut self, transactions: Vec<Transaction>, budgets: BudgetMap) {
        self.transactions = transactions;
        self.budgets = budgets;
    }

    pub fn sync_snapshot(&self) -> SyncData {
        SyncData {
            transactions: Some(self.transactions.clone()),
            budgets: Some(self.budgets.clone()),
            colors: Some(self.category_colors.clone()),
        }
    }

    /// Overwrites only the sections present in the downloaded snapshot.
    pub fn apply_sync(&mut self, data: SyncData) {
        if let Some(t) = data.transactions {
            self.transactions = t;
        }
        if let Some(b) = data.budgets {
            self.budgets = b;
        }
        if let Some(c) = data.colors {
            self.category_colors = c;
        }
    }
}
