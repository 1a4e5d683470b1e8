// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::error::ValidationError;

const UA: &str = concat!("finanzas/", env!("CARGO_PKG_VERSION"));

pub fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

/// Parses a user-supplied amount. Amounts are magnitudes, so negatives are
/// rejected here rather than silently flipped.
pub fn parse_amount(s: &str) -> Result<Decimal, ValidationError> {
    let raw = s.trim();
    let d = parse_decimal_lenient(raw).ok_or_else(|| ValidationError::InvalidAmount(raw.into()))?;
    if d < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(d));
    }
    Ok(d)
}

/// Plain or scientific notation; `None` when the text is not a number.
pub fn parse_decimal_lenient(s: &str) -> Option<Decimal> {
    let raw = s.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Accepts RFC 3339 (converted to local time), ISO date-times without an
/// offset, and bare dates (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let raw = s.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("€{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Gate for destructive actions. `assume_yes` skips the prompt; anything but
/// an explicit yes declines.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    confirm_from(prompt, &mut stdin.lock(), &mut io::stdout())
}

pub fn confirm_from<R: BufRead, W: Write>(prompt: &str, input: &mut R, out: &mut W) -> Result<bool> {
    write!(out, "{} [y/N] ", prompt)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timestamp_handles_bare_dates_and_datetimes() {
        let d = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(d.to_string(), "2024-01-15 00:00:00");
        let dt = parse_timestamp("2024-01-15T08:05:00.000").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 08:05:00");
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn parse_amount_rejects_negative_and_garbage() {
        assert_eq!(parse_amount(" 42.50 ").unwrap(), Decimal::new(4250, 2));
        assert!(matches!(
            parse_amount("-3"),
            Err(ValidationError::NegativeAmount(_))
        ));
        assert!(matches!(
            parse_amount("abc"),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn confirm_requires_explicit_yes() {
        let mut out = Vec::new();
        assert!(confirm_from("Go?", &mut "y\n".as_bytes(), &mut out).unwrap());
        assert!(confirm_from("Go?", &mut "Sí\n".as_bytes(), &mut out).unwrap());
        assert!(!confirm_from("Go?", &mut "\n".as_bytes(), &mut out).unwrap());
        assert!(!confirm_from("Go?", &mut "nope\n".as_bytes(), &mut out).unwrap());
        assert!(confirm("ignored", true).unwrap());
    }
}
