// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Rejected user input. The operation that produced it is a no-op.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Amount must not be negative (got {0})")]
    NegativeAmount(Decimal),
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("Budget for '{0}' must not be negative")]
    NegativeBudget(String),
    #[error("Category must not be empty")]
    EmptyCategory,
    #[error("Unknown transaction type '{0}', expected income|expense")]
    UnknownType(String),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no valid transactions found in {0}")]
    Empty(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync is not configured; set a script URL first")]
    NotConfigured,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote returned status '{0}'")]
    Remote(String),
    #[error("remote response carried no data")]
    MissingData,
    #[error("remote data rejected: {0}")]
    InvalidData(String),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI service is not configured; set FINANZAS_AI_API_KEY")]
    NotConfigured,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AI service returned no content")]
    EmptyResponse,
    #[error("malformed AI response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
