// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use finanzas::clock::SystemClock;
use finanzas::{cli, commands, config, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let settings = config::load(matches.get_one::<String>("config").map(String::as_str))?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = settings.data_dir.as_deref();
    let conn = db::open_or_init(data_dir)?;
    let clock = SystemClock;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path(data_dir)?.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&conn, &clock, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, &clock, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&conn, &clock, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &clock, sub)?,
        Some(("notify", sub)) => commands::notifications::handle(&conn, &clock, &settings, sub)?,
        Some(("colors", sub)) => commands::colors::handle(&conn, sub)?,
        Some(("sync", sub)) => commands::sync::handle(&conn, &clock, &settings, sub)?,
        Some(("advisor", sub)) => commands::advisor::handle(&conn, &clock, &settings, sub)?,
        Some(("demo", sub)) => commands::demo::handle(&conn, &clock, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
