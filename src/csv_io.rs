// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spreadsheet-friendly CSV in both directions.
//!
//! Import is tolerant and positional: `date, amount, type, category,
//! description`. Bad rows are skipped, never fatal.

use std::str::FromStr;

use csv::ReaderBuilder;

use crate::clock::Clock;
use crate::models::{
    DEFAULT_CATEGORY, DEFAULT_IMPORT_DESCRIPTION, Transaction, TransactionType,
};
use crate::utils::{parse_decimal_lenient, parse_timestamp};

pub const BOM: char = '\u{feff}';
pub const EXPORT_HEADER: &str = "Fecha,Monto,Tipo,Categoría,Descripción,ID";

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub transactions: Vec<Transaction>,
    pub skipped: usize,
}

/// First line starts with something other than a digit: treat it as a header.
fn has_header(first_line: &str) -> bool {
    first_line
        .trim()
        .chars()
        .next()
        .is_some_and(|c| !c.is_ascii_digit())
}

fn parse_row(parts: &csv::StringRecord, clock: &dyn Clock) -> Option<Transaction> {
    if parts.len() < 2 {
        return None;
    }
    let field = |i: usize| parts.get(i).unwrap_or("");

    let amount = parse_decimal_lenient(field(1))?.abs();
    let kind = TransactionType::from_str(field(2)).unwrap_or(TransactionType::Expense);
    let category = match field(3) {
        "" => DEFAULT_CATEGORY,
        c => c,
    };
    let description = match field(4) {
        "" => DEFAULT_IMPORT_DESCRIPTION,
        d => d,
    };
    let date = parse_timestamp(field(0)).unwrap_or_else(|| {
        tracing::debug!("unparseable date '{}', using now", field(0));
        clock.now()
    });

    Transaction::new(amount, kind, category, description, date).ok()
}

/// Quoted fields may span lines, so the whole body goes through one reader.
pub fn parse_csv(content: &str, clock: &dyn Clock) -> ImportOutcome {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let header = content.lines().next().is_some_and(has_header);
    let mut rdr = ReaderBuilder::new()
        .has_headers(header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut out = ImportOutcome::default();
    for rec in rdr.records() {
        let rec = match rec {
            Ok(rec) => rec,
            Err(e) => {
                tracing::debug!("skipping unreadable CSV row: {e}");
                out.skipped += 1;
                continue;
            }
        };
        if rec.iter().all(str::is_empty) {
            continue;
        }
        match parse_row(&rec, clock) {
            Some(t) => out.transactions.push(t),
            None => {
                let line = rec.position().map(|p| p.line()).unwrap_or_default();
                tracing::debug!(line, "skipping CSV row {:?}", rec);
                out.skipped += 1;
            }
        }
    }
    out
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        quote(s)
    } else {
        s.to_string()
    }
}

/// Renders transactions with a BOM so spreadsheet apps detect UTF-8.
pub fn export_csv<'a, I>(transactions: I) -> String
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut lines = vec![EXPORT_HEADER.to_string()];
    for t in transactions {
        lines.push(
            [
                t.date.format("%Y-%m-%d").to_string(),
                t.amount.normalize().to_string(),
                t.kind.label().to_string(),
                escape(&t.category),
                quote(&t.description),
                escape(&t.id),
            ]
            .join(","),
        );
    }
    let mut out = String::new();
    out.push(BOM);
    out.push_str(&lines.join("\n"));
    out
}
