// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Mirror of local state to a user-deployed spreadsheet web app.

use std::collections::HashSet;

use reqwest::header::CONTENT_TYPE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::models::SyncData;

#[derive(Serialize)]
struct UploadRequest<'a> {
    action: &'static str,
    data: &'a SyncData,
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    status: String,
    #[serde(default)]
    data: Option<SyncData>,
}

pub struct SheetClient {
    script_url: String,
    http: reqwest::blocking::Client,
}

impl SheetClient {
    pub fn new(script_url: &str, http: reqwest::blocking::Client) -> Result<Self, SyncError> {
        let script_url = script_url.trim();
        if script_url.is_empty() {
            return Err(SyncError::NotConfigured);
        }
        Ok(Self {
            script_url: script_url.to_string(),
            http,
        })
    }

    /// Pushes the snapshot. The endpoint must answer `{"status":"success"}`.
    pub fn upload(&self, data: &SyncData) -> Result<(), SyncError> {
        let body = serde_json::to_string(&UploadRequest {
            action: "upload",
            data,
        })?;
        // Plain text keeps script hosts from rejecting the request as a
        // non-simple content type.
        let text = self
            .http
            .post(&self.script_url)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()?
            .error_for_status()?
            .text()?;
        tracing::debug!(bytes = text.len(), "upload response received");
        interpret_upload(&text)
    }

    pub fn download(&self) -> Result<SyncData, SyncError> {
        let text = self
            .http
            .get(&self.script_url)
            .query(&[("action", "download")])
            .send()?
            .error_for_status()?
            .text()?;
        tracing::debug!(bytes = text.len(), "download response received");
        interpret_download(&text)
    }
}

pub fn interpret_upload(body: &str) -> Result<(), SyncError> {
    let resp: SyncResponse = serde_json::from_str(body)?;
    if resp.status == "success" {
        Ok(())
    } else {
        Err(SyncError::Remote(resp.status))
    }
}

pub fn interpret_download(body: &str) -> Result<SyncData, SyncError> {
    let resp: SyncResponse = serde_json::from_str(body)?;
    if resp.status != "success" {
        return Err(SyncError::Remote(resp.status));
    }
    let data = resp.data.ok_or(SyncError::MissingData)?;
    validate_snapshot(&data)?;
    Ok(data)
}

/// Rejects a snapshot that would break store invariants: negative amounts,
/// repeated ids and negative budgets.
fn validate_snapshot(data: &SyncData) -> Result<(), SyncError> {
    if let Some(txs) = &data.transactions {
        let mut seen = HashSet::with_capacity(txs.len());
        for t in txs {
            if t.amount < Decimal::ZERO {
                return Err(SyncError::InvalidData(format!(
                    "transaction {} has negative amount {}",
                    t.id, t.amount
                )));
            }
            if !seen.insert(t.id.as_str()) {
                return Err(SyncError::InvalidData(format!(
                    "duplicate transaction id {}",
                    t.id
                )));
            }
        }
    }
    if let Some((category, _)) = data
        .budgets
        .iter()
        .flatten()
        .find(|(_, v)| **v < Decimal::ZERO)
    {
        return Err(SyncError::InvalidData(format!(
            "budget for {category} is negative"
        )));
    }
    Ok(())
}
