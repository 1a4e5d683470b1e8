// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finanzas::clock::FixedClock;
use finanzas::error::ValidationError;
use finanzas::models::TransactionType;
use finanzas::state::AppState;
use finanzas::{cli, commands::transactions, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn clock() -> FixedClock {
    FixedClock::at(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), 12, 0).unwrap()
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["finanzas", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => transactions::handle(conn, &clock(), tx_m),
        _ => panic!("no tx subcommand"),
    }
}

fn add(conn: &Connection, amount: &str, kind: &str, cat: &str, desc: &str, date: &str) {
    run(
        conn,
        &[
            "add",
            "--amount",
            amount,
            "--type",
            kind,
            "--category",
            cat,
            "--description",
            desc,
            "--date",
            date,
        ],
    )
    .unwrap();
}

fn seeded() -> Connection {
    let conn = setup();
    add(&conn, "10", "gasto", "Ocio", "Cine", "2025-01-01");
    add(&conn, "1500", "income", "Salario", "Nómina", "2025-01-02");
    add(&conn, "42.5", "expense", "Alimentación", "Mercado", "2025-01-03");
    conn
}

fn list_rows(conn: &Connection, args: &[&str]) -> Vec<finanzas::models::Transaction> {
    let mut argv = vec!["finanzas", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            return transactions::query_rows(conn, list_m).unwrap();
        }
    }
    panic!("no tx list subcommand");
}

#[test]
fn add_prepends_and_defaults_date_to_now() {
    let conn = seeded();
    run(
        &conn,
        &["add", "--amount", "5", "--type", "expense", "--category", "Otros"],
    )
    .unwrap();
    let state = AppState::load(&conn).unwrap();
    assert_eq!(state.transactions.len(), 4);
    let newest = &state.transactions[0];
    assert_eq!(newest.category, "Otros");
    assert_eq!(newest.description, "");
    assert_eq!(newest.date, clock().0);
}

#[test]
fn list_limit_respected() {
    let conn = seeded();
    let rows = list_rows(&conn, &["--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date.date(), NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
}

#[test]
fn list_applies_filters_and_sort() {
    let conn = seeded();
    let rows = list_rows(&conn, &["--type", "expense", "--sort", "amount-asc"]);
    let amounts: Vec<Decimal> = rows.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![Decimal::from(10), Decimal::new(425, 1)]);

    let rows = list_rows(&conn, &["--search", "NÓMINA"]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, TransactionType::Income);

    let rows = list_rows(&conn, &["--from", "2025-01-02", "--to", "2025-01-02"]);
    assert_eq!(rows.len(), 1);

    let rows = list_rows(&conn, &["--min", "not-a-number", "--max", "50"]);
    assert_eq!(rows.len(), 2);
}

#[test]
fn negative_amount_is_rejected_without_mutation() {
    let conn = seeded();
    let err = run(
        &conn,
        &["add", "--amount", "-3", "--type", "expense", "--category", "Ocio"],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::NegativeAmount(_))
    ));
    let id = AppState::load(&conn).unwrap().transactions[0].id.clone();
    assert!(run(&conn, &["edit", &id, "--amount", "-1"]).is_err());
    let state = AppState::load(&conn).unwrap();
    assert_eq!(state.transactions.len(), 3);
    assert_eq!(state.find(&id).unwrap().amount, Decimal::new(425, 1));
}

#[test]
fn edit_keeps_id_and_changes_fields() {
    let conn = seeded();
    let id = AppState::load(&conn).unwrap().transactions[0].id.clone();
    run(&conn, &["edit", &id, "--description", "Mercado"]).unwrap();
    run(&conn, &["edit", &id, "--amount", "50", "--category", "Salud"]).unwrap();
    let state = AppState::load(&conn).unwrap();
    let t = state.find(&id).unwrap();
    assert_eq!(t.amount, Decimal::from(50));
    assert_eq!(t.category, "Salud");
    assert_eq!(t.description, "Mercado");
    assert!(run(&conn, &["edit", "missing", "--amount", "1"]).is_err());
}

#[test]
fn rm_with_yes_deletes() {
    let conn = seeded();
    let id = AppState::load(&conn).unwrap().transactions[1].id.clone();
    run(&conn, &["rm", &id, "--yes"]).unwrap();
    let state = AppState::load(&conn).unwrap();
    assert_eq!(state.transactions.len(), 2);
    assert!(state.find(&id).is_none());
    assert!(run(&conn, &["rm", &id, "--yes"]).is_err());
}
