// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finanzas::clock::FixedClock;
use finanzas::config::Settings;
use finanzas::error::SyncError;
use finanzas::models::{Transaction, TransactionType};
use finanzas::state::AppState;
use finanzas::sync::interpret_download;
use finanzas::{cli, commands::sync, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn clock() -> FixedClock {
    FixedClock::at(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), 8, 15).unwrap()
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["finanzas", "sync"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("sync", m)) => sync::handle(conn, &clock(), &Settings::default(), m),
        _ => panic!("no sync subcommand"),
    }
}

#[test]
fn config_persists_url() {
    let conn = setup();
    run(&conn, &["config", " https://script.example/exec "]).unwrap();
    let state = AppState::load(&conn).unwrap();
    assert_eq!(state.sheet_config.script_url, "https://script.example/exec");
    assert!(state.sheet_config.last_sync.is_none());
}

#[test]
fn upload_without_url_is_not_configured() {
    let conn = setup();
    let err = run(&conn, &["upload"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::NotConfigured)
    ));
}

#[test]
fn download_overwrites_only_present_sections() {
    let conn = setup();
    let mut state = AppState::load(&conn).unwrap();
    state.add_transaction(
        Transaction::new(
            Decimal::from(9),
            TransactionType::Expense,
            "Ocio",
            "local",
            NaiveDate::from_ymd_opt(2024, 4, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
        .unwrap(),
    );
    state.set_budget("Ocio", Decimal::from(80)).unwrap();
    state.set_color("Ocio", "#000000").unwrap();
    state.save(&conn).unwrap();

    let data = interpret_download(
        r#"{"status":"success","data":{"transactions":[
            {"id":"r1","amount":12.5,"type":"expense","category":"Salud","description":"Farmacia","date":"2024-04-20T10:00:00.000Z"},
            {"id":"r2","amount":1500,"type":"income","category":"Salario","description":"Nómina","date":"2024-04-28"}
        ]}}"#,
    )
    .unwrap();
    let count = sync::apply_download(&conn, &clock(), data).unwrap();
    assert_eq!(count, 2);

    let state = AppState::load(&conn).unwrap();
    assert_eq!(state.transactions.len(), 2);
    assert_eq!(state.transactions[0].id, "r1");
    assert_eq!(state.budget_for("Ocio"), Decimal::from(80));
    assert_eq!(state.category_colors["Ocio"], "#000000");
    assert_eq!(
        state.sheet_config.last_sync.as_deref(),
        Some("2024-05-02T08:15:00.000")
    );
}

#[test]
fn failed_download_leaves_state_untouched() {
    let conn = setup();
    let before = AppState::load(&conn).unwrap().transactions.len();
    assert!(interpret_download(r#"{"status":"error"}"#).is_err());
    assert_eq!(AppState::load(&conn).unwrap().transactions.len(), before);
}

#[test]
fn invalid_remote_transactions_are_refused() {
    let conn = setup();
    let mut state = AppState::load(&conn).unwrap();
    state.set_budget("Ocio", Decimal::from(80)).unwrap();
    state.save(&conn).unwrap();

    let err = interpret_download(
        r#"{"status":"success","data":{"transactions":[
            {"id":"a","amount":-45,"type":"expense","category":"Ocio","date":"2024-04-20"},
            {"id":"a","amount":10,"type":"expense","category":"Ocio","date":"2024-04-21"}
        ],"budgets":{}}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::InvalidData(_)));

    let err = interpret_download(
        r#"{"status":"success","data":{"transactions":[
            {"id":"a","amount":45,"type":"expense","category":"Ocio","date":"2024-04-20"},
            {"id":"a","amount":10,"type":"expense","category":"Ocio","date":"2024-04-21"}
        ]}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::InvalidData(_)));

    let state = AppState::load(&conn).unwrap();
    assert!(state.transactions.is_empty());
    assert_eq!(state.budget_for("Ocio"), Decimal::from(80));
}
