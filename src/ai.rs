// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Gemini `generateContent` client: spending advice, receipt scanning and
//! anomaly alerts.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Settings;
use crate::error::{AiError, ValidationError};
use crate::filter::most_recent;
use crate::models::{DEFAULT_CATEGORY, EXPENSE_CATEGORIES, Transaction, TransactionType};
use crate::notifications::{AlertAnalyzer, AlertSuggestion};
use crate::utils::{http_client, parse_timestamp};

pub const ADVICE_LIMIT: usize = 50;
pub const ADVICE_FALLBACK: &str = "Lo siento, hubo un error al conectar con tu asesor financiero IA. Por favor intenta más tarde.";
pub const ADVICE_EMPTY: &str = "No se pudo generar el consejo en este momento.";

static DATA_URL_PREFIX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^data:image/(png|jpeg|jpg|webp);base64,").ok());

const ADVICE_PROMPT: &str = "Actúa como un experto asesor financiero personal. Analiza mis transacciones recientes y dame un resumen breve, \
identifica patrones de gasto preocupantes y dame 3 consejos concretos para mejorar mi salud financiera y acercarme a la libertad financiera.\n\n\
Mis datos (formato JSON):\n";

const RECEIPT_PROMPT: &str = "Analiza esta imagen de un recibo/ticket/factura.\n\
Extrae la siguiente información en formato JSON estricto:\n\
1. \"amount\": El total final a pagar (número).\n\
2. \"date\": La fecha de la transacción en formato YYYY-MM-DD. Si no hay año, asume el año actual.\n\
3. \"description\": El nombre del comercio o establecimiento.\n\
4. \"category\": Una categoría sugerida basada en el comercio (ej: \"Alimentación\", \"Transporte\", \"Ocio\", \"Salud\", \"Otros\").\n\
JSON Schema: {\"amount\": number, \"date\": \"string\", \"description\": \"string\", \"category\": \"string\"}";

const ALERTS_PROMPT: &str = "Analiza estas últimas transacciones y genera ALERTA si detectas algo inusual.\n\
Busca:\n1. Gastos duplicados.\n2. Suscripciones que han subido de precio.\n3. Gastos hormiga excesivos en poco tiempo.\n\
Devuelve un JSON array. Si no hay alertas, devuelve array vacío.\n\
Formato: [{ \"title\": \"...\", \"message\": \"...\", \"type\": \"warning\" | \"info\" }]\n\nDatos: ";

/// Fields extracted from a receipt photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptScan {
    pub amount: Decimal,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ReceiptScan {
    /// Turns the scan into an expense. Unparseable dates fall back to `now`.
    pub fn into_transaction(self, now: NaiveDateTime) -> Result<Transaction, ValidationError> {
        let date = parse_timestamp(&self.date).unwrap_or(now);
        let category = match_category(self.category.as_deref());
        Transaction::new(
            self.amount.abs(),
            TransactionType::Expense,
            category,
            &self.description,
            date,
        )
    }
}

/// Maps a suggested category onto the expense set: exact (case-insensitive)
/// first, then substring either way.
pub fn match_category(suggested: Option<&str>) -> &'static str {
    let Some(s) = suggested.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_CATEGORY;
    };
    let lower = s.to_lowercase();
    if let Some(c) = EXPENSE_CATEGORIES
        .iter()
        .find(|c| c.to_lowercase() == lower)
    {
        return c;
    }
    EXPENSE_CATEGORIES
        .iter()
        .find(|c| {
            let cl = c.to_lowercase();
            cl.contains(&lower) || lower.contains(&cl)
        })
        .copied()
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Strips a `data:image/...;base64,` header if the payload carries one.
pub fn strip_data_url(payload: &str) -> &str {
    match DATA_URL_PREFIX.as_ref().and_then(|re| re.find(payload)) {
        Some(m) => &payload[m.end()..],
        None => payload,
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Base64 body of an image file. Text files holding a data URL are accepted
/// as well.
pub fn encode_image(path: &Path) -> Result<(String, &'static str), AiError> {
    let bytes = fs::read(path)?;
    let mime = mime_for(path);
    if let Ok(text) = std::str::from_utf8(&bytes) {
        let text = text.trim();
        if text.starts_with("data:") {
            return Ok((strip_data_url(text).to_string(), mime));
        }
    }
    Ok((B64.encode(&bytes), mime))
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Text of the first candidate part.
pub fn extract_text(body: &str) -> Result<String, AiError> {
    let resp: GenerateResponse = serde_json::from_str(body)?;
    resp.candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(AiError::EmptyResponse)
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, AiError> {
        let api_key = settings
            .ai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AiError::NotConfigured)?;
        let http = http_client(settings.http_timeout_secs).map_err(|e| {
            tracing::error!("could not build HTTP client: {e:#}");
            AiError::NotConfigured
        })?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: settings.ai_model.clone(),
            endpoint: settings.ai_endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn generate(&self, parts: serde_json::Value, json_mode: bool) -> Result<String, AiError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let mut body = json!({ "contents": [{ "parts": parts }] });
        if json_mode {
            body["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }
        tracing::debug!(model = %self.model, "calling generateContent");
        let text = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?
            .error_for_status()?
            .text()?;
        extract_text(&text)
    }

    /// Markdown advice over the most recent transactions.
    pub fn advice(&self, transactions: &[Transaction]) -> Result<String, AiError> {
        let recent = most_recent(transactions, ADVICE_LIMIT);
        let prompt = format!(
            "{ADVICE_PROMPT}{}\n\nResponde en formato Markdown. Sé motivador pero directo.\nUsa emojis para hacerlo amigable.",
            serde_json::to_string(&recent)?
        );
        self.generate(json!([{ "text": prompt }]), false)
    }

    pub fn scan_receipt(&self, path: &Path) -> Result<ReceiptScan, AiError> {
        let (data, mime) = encode_image(path)?;
        let parts = json!([
            { "inlineData": { "mimeType": mime, "data": data } },
            { "text": RECEIPT_PROMPT },
        ]);
        let text = self.generate(parts, true)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl AlertAnalyzer for GeminiClient {
    fn analyze_alerts(&self, recent: &[Transaction]) -> Result<Vec<AlertSuggestion>, AiError> {
        let prompt = format!("{ALERTS_PROMPT}{}", serde_json::to_string(recent)?);
        let text = self.generate(json!([{ "text": prompt }]), true)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Used when no client can be built; every scan reports the missing key.
pub struct Unconfigured;

impl AlertAnalyzer for Unconfigured {
    fn analyze_alerts(&self, _recent: &[Transaction]) -> Result<Vec<AlertSuggestion>, AiError> {
        Err(AiError::NotConfigured)
    }
}

/// Advice text, degrading to a fixed apology on any failure.
pub fn advice_or_fallback(client: Option<&GeminiClient>, transactions: &[Transaction]) -> String {
    let result = match client {
        Some(c) => c.advice(transactions),
        None => Err(AiError::NotConfigured),
    };
    match result {
        Ok(text) => text,
        Err(AiError::EmptyResponse) => ADVICE_EMPTY.to_string(),
        Err(err) => {
            tracing::warn!("AI advice failed: {err}");
            ADVICE_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    #[test]
    fn category_matching() {
        assert_eq!(match_category(Some("alimentación")), "Alimentación");
        assert_eq!(match_category(Some("Transporte público")), "Transporte");
        assert_eq!(match_category(Some("Electrónica")), "Otros");
        assert_eq!(match_category(None), "Otros");
        assert_eq!(match_category(Some("  ")), "Otros");
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        assert_eq!(strip_data_url("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url("data:image/jpg;base64,QQ=="), "QQ==");
        assert_eq!(strip_data_url("AAAA"), "AAAA");
    }

    #[test]
    fn encode_image_handles_raw_bytes_and_data_urls() {
        let mut raw = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        raw.write_all(&[0x89, 0x50, 0x4e, 0x47, 0xff]).unwrap();
        let (data, mime) = encode_image(raw.path()).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(B64.decode(data).unwrap(), vec![0x89, 0x50, 0x4e, 0x47, 0xff]);

        let mut url = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(url, "data:image/jpeg;base64,SGVsbG8=").unwrap();
        let (data, mime) = encode_image(url.path()).unwrap();
        assert_eq!(data, "SGVsbG8=");
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn extract_text_reads_first_candidate() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[]"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "[]");
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(AiError::EmptyResponse)
        ));
        assert!(matches!(extract_text("nope"), Err(AiError::Malformed(_))));
    }

    #[test]
    fn receipt_scan_becomes_expense() {
        let scan: ReceiptScan = serde_json::from_str(
            r#"{"amount":23.4,"date":"2024-03-02","description":"Mercadona","category":"alimentacion"}"#,
        )
        .unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let tx = scan.into_transaction(now).unwrap();
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.amount, Decimal::new(234, 1));
        assert_eq!(tx.date.date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        // no accent, so neither exact nor substring matches
        assert_eq!(tx.category, "Otros");
    }

    #[test]
    fn missing_key_is_not_configured() {
        let settings = Settings::default();
        assert!(matches!(
            GeminiClient::from_settings(&settings),
            Err(AiError::NotConfigured)
        ));
        let text = advice_or_fallback(None, &[]);
        assert_eq!(text, ADVICE_FALLBACK);
        assert!(Unconfigured.analyze_alerts(&[]).is_err());
    }
}
