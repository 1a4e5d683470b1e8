// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Category name -> monthly limit. A zero (or missing) entry means no budget.
pub type BudgetMap = BTreeMap<String, Decimal>;

/// Category name -> display color. Presentation metadata only.
pub type CategoryColorMap = BTreeMap<String, String>;

pub const DEFAULT_CATEGORY: &str = "Otros";
pub const DEFAULT_IMPORT_DESCRIPTION: &str = "Importado via CSV";

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Vivienda",
    "Alimentación",
    "Transporte",
    "Salud",
    "Educación",
    "Ocio",
    "Otros",
];

pub const INCOME_CATEGORIES: &[&str] = &["Salario", "Negocios", "Inversión", "Regalos", "Otros"];

/// Share of income the summary view treats as a healthy savings rate (percent).
pub const SAVINGS_GOAL_PERCENT: u32 = 20;

pub const DEFAULT_CATEGORY_COLORS: &[(&str, &str)] = &[
    ("Vivienda", "#ef4444"),
    ("Alimentación", "#f97316"),
    ("Transporte", "#eab308"),
    ("Salud", "#14b8a6"),
    ("Educación", "#3b82f6"),
    ("Ocio", "#8b5cf6"),
    ("Otros", "#64748b"),
    ("Salario", "#10b981"),
    ("Negocios", "#06b6d4"),
    ("Inversión", "#6366f1"),
    ("Regalos", "#ec4899"),
    ("Otros Ingresos", "#84cc16"),
    ("Ingresos", "#10b981"),
    ("Gastos", "#ef4444"),
];

pub fn default_category_colors() -> CategoryColorMap {
    DEFAULT_CATEGORY_COLORS
        .iter()
        .map(|(c, hex)| (c.to_string(), hex.to_string()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Spanish label used in exports and tables.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Ingreso",
            TransactionType::Expense => "Gasto",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "ingreso" | "ingresos" => Ok(TransactionType::Income),
            "expense" | "gasto" | "gastos" => Ok(TransactionType::Expense),
            other => Err(ValidationError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "local_datetime")]
    pub date: NaiveDateTime,
}

impl Transaction {
    /// Builds a validated transaction with a freshly generated id.
    pub fn new(
        amount: Decimal,
        kind: TransactionType,
        category: &str,
        description: &str,
        date: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount(amount));
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            amount,
            kind,
            category: category.to_string(),
            description: description.trim().to_string(),
            date,
        })
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Warning,
    Alert,
    Info,
    Success,
    Bill,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Warning => "warning",
            NotificationType::Alert => "alert",
            NotificationType::Info => "info",
            NotificationType::Success => "success",
            NotificationType::Bill => "bill",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(with = "local_datetime")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfig {
    #[serde(default)]
    pub script_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

impl SheetConfig {
    pub fn is_configured(&self) -> bool {
        !self.script_url.trim().is_empty()
    }
}

/// Snapshot exchanged with the spreadsheet endpoint. Sections missing from a
/// download are left untouched locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budgets: Option<BudgetMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<CategoryColorMap>,
}

/// Timestamps are kept as local wall-clock time. Incoming values may carry an
/// offset (converted to local) or be bare dates (midnight).
pub mod local_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        crate::utils::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn new_rejects_negative_amount() {
        let err = Transaction::new(
            Decimal::new(-100, 2),
            TransactionType::Expense,
            "Ocio",
            "Cine",
            at(2024, 1, 15),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::NegativeAmount(_)));
    }

    #[test]
    fn new_rejects_blank_category() {
        let err = Transaction::new(
            Decimal::ONE,
            TransactionType::Income,
            "   ",
            "",
            at(2024, 1, 15),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyCategory));
    }

    #[test]
    fn transaction_json_uses_type_field_and_numeric_amount() {
        let tx = Transaction::new(
            Decimal::new(4250, 2),
            TransactionType::Expense,
            "Ocio",
            "Cine",
            at(2024, 1, 15),
        )
        .unwrap();
        let v = serde_json::to_value(&tx).unwrap();
        assert_eq!(v["type"], "expense");
        assert_eq!(v["amount"].as_f64(), Some(42.5));
        assert_eq!(v["date"], "2024-01-15T10:30:00.000");
    }

    #[test]
    fn transaction_accepts_bare_date_and_integer_amount() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id":"abc","amount":1200,"type":"income","category":"Salario","date":"2024-01-16"}"#,
        )
        .unwrap();
        assert_eq!(tx.amount, Decimal::new(1200, 0));
        assert_eq!(tx.description, "");
        assert_eq!(tx.date.date(), NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    }

    #[test]
    fn type_parsing_accepts_spanish_labels() {
        assert_eq!("Ingresos".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("gasto".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
    }
}
