// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const KEY_TRANSACTIONS: &str = "transactions";
pub const KEY_BUDGETS: &str = "budgets";
pub const KEY_CATEGORY_COLORS: &str = "categoryColors";
pub const KEY_SHEET_CONFIG: &str = "sheetConfig";
pub const KEY_NOTIFICATIONS: &str = "notifications";

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Finanzas", "finanzas"));

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")
}

/// Database location; `data_dir` overrides the platform default.
pub fn db_path(data_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match data_dir {
        Some(d) => d.to_path_buf(),
        None => project_dirs()?.data_dir().to_path_buf(),
    };
    fs::create_dir_all(&dir).context("Failed to create data dir")?;
    Ok(dir.join("finanzas.sqlite"))
}

pub fn open_or_init(data_dir: Option<&Path>) -> Result<Connection> {
    let path = db_path(data_dir)?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!("opened store at {}", path.display());
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS kv(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

/// Reads and decodes the JSON stored under `key`; `None` when absent.
pub fn get_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| r.get(0))
        .optional()?;
    match raw {
        Some(s) => {
            let v = serde_json::from_str(&s)
                .with_context(|| format!("Corrupt value stored under '{}'", key))?;
            Ok(Some(v))
        }
        None => Ok(None),
    }
}

pub fn put_json<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let s = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO kv(key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
        params![key, s],
    )?;
    Ok(())
}
