// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

use crate::filter::SortKey;

fn json_args() -> [Arg; 2] {
    [
        arg!(--json "Print JSON").action(ArgAction::SetTrue),
        arg!(--jsonl "Print one JSON object per line").action(ArgAction::SetTrue),
    ]
}

fn yes_arg() -> Arg {
    arg!(-y --yes "Skip the confirmation prompt").action(ArgAction::SetTrue)
}

fn type_arg(help: &'static str) -> Arg {
    Arg::new("type").long("type").value_name("TYPE").help(help)
}

/// Shared by `tx list` and `export`.
fn filter_args() -> Vec<Arg> {
    vec![
        arg!(--search <TEXT> "Case-insensitive match on description or category"),
        type_arg("all | income | expense")
            .value_parser(["all", "income", "expense"])
            .default_value("all"),
        arg!(--category <NAME> "Only this category (`all` for any)"),
        arg!(--from <DATE> "Start date, inclusive (YYYY-MM-DD)"),
        arg!(--to <DATE> "End date, inclusive (YYYY-MM-DD)"),
        arg!(--min <AMOUNT> "Minimum amount, inclusive"),
        arg!(--max <AMOUNT> "Maximum amount, inclusive"),
        arg!(--sort <KEY> "Ordering")
            .value_parser(SortKey::VARIANTS)
            .default_value("date-desc"),
    ]
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a transaction")
                .arg(
                    arg!(--amount <AMOUNT> "Amount, never negative")
                        .required(true)
                        .allow_negative_numbers(true),
                )
                .arg(type_arg("income | expense (ingreso | gasto)").required(true))
                .arg(arg!(--category <NAME> "Category").required(true))
                .arg(arg!(--description <TEXT> "Free text"))
                .arg(arg!(--date <DATE> "YYYY-MM-DD or ISO date-time; defaults to now")),
        )
        .subcommand(
            Command::new("edit")
                .about("Change fields of an existing transaction")
                .arg(arg!(<ID> "Transaction id"))
                .arg(arg!(--amount <AMOUNT> "New amount").allow_negative_numbers(true))
                .arg(type_arg("income | expense"))
                .arg(arg!(--category <NAME> "New category"))
                .arg(arg!(--description <TEXT> "New description"))
                .arg(arg!(--date <DATE> "New date")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(arg!(<ID> "Transaction id"))
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Show one transaction")
                .arg(arg!(<ID> "Transaction id"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("list")
                .about("List transactions")
                .args(filter_args())
                .arg(arg!(--limit <N> "Show at most N rows").value_parser(value_parser!(usize)))
                .args(json_args()),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly category budgets")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .about("Set a category limit (0 removes the budget)")
                .arg(arg!(--category <NAME> "Category").required(true))
                .arg(
                    arg!(--amount <AMOUNT> "Monthly limit")
                        .required(true)
                        .allow_negative_numbers(true),
                ),
        )
        .subcommand(Command::new("list").about("List budgets").args(json_args()))
        .subcommand(
            Command::new("status")
                .about("Spending against each budget this month")
                .args(json_args()),
        )
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Summaries and trends")
        .subcommand_required(true)
        .subcommand(
            Command::new("summary")
                .about("Income, expenses, balance and savings rate")
                .args(json_args()),
        )
        .subcommand(
            Command::new("by-category")
                .about("Totals per category, largest first")
                .arg(
                    type_arg("income | expense")
                        .value_parser(["income", "expense"])
                        .default_value("expense"),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("monthly")
                .about("Income and expenses for the last 12 months")
                .args(json_args()),
        )
}

fn notify_cmd() -> Command {
    Command::new("notify")
        .about("Budget alerts and bill reminders")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("Show notifications, newest first")
                .arg(arg!(--unread "Only unread").action(ArgAction::SetTrue))
                .args(json_args()),
        )
        .subcommand(Command::new("check").about("Evaluate budget and bill rules now"))
        .subcommand(
            Command::new("read")
                .about("Mark one notification as read")
                .arg(arg!(<ID> "Notification id")),
        )
        .subcommand(Command::new("read-all").about("Mark every notification as read"))
        .subcommand(
            Command::new("clear")
                .about("Delete all notifications")
                .arg(yes_arg()),
        )
        .subcommand(Command::new("ai-check").about("Ask the AI service to look for anomalies"))
}

fn colors_cmd() -> Command {
    Command::new("colors")
        .about("Category colors")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("Show the color map").args(json_args()))
        .subcommand(
            Command::new("set")
                .about("Assign a color to a category")
                .arg(arg!(<CATEGORY> "Category"))
                .arg(arg!(<COLOR> "Color, e.g. #ef4444")),
        )
        .subcommand(
            Command::new("reset")
                .about("Restore the default colors")
                .arg(yes_arg()),
        )
}

fn sync_cmd() -> Command {
    Command::new("sync")
        .about("Spreadsheet backup")
        .subcommand_required(true)
        .subcommand(
            Command::new("config")
                .about("Set the web app URL")
                .arg(arg!(<URL> "Deployed script URL")),
        )
        .subcommand(Command::new("status").about("Show sync configuration"))
        .subcommand(Command::new("upload").about("Send local data to the sheet"))
        .subcommand(
            Command::new("download")
                .about("Replace local data with the sheet's copy")
                .arg(yes_arg()),
        )
}

fn advisor_cmd() -> Command {
    Command::new("advisor")
        .about("AI assistance")
        .subcommand_required(true)
        .subcommand(Command::new("advice").about("Advice based on recent transactions"))
        .subcommand(
            Command::new("scan")
                .about("Extract a transaction from a receipt photo")
                .arg(arg!(--image <FILE> "Receipt image (png, jpeg, webp)").required(true))
                .arg(arg!(--save "Record the scanned expense").action(ArgAction::SetTrue))
                .args(json_args()),
        )
}

pub fn build_cli() -> Command {
    Command::new("finanzas")
        .about("Personal finance tracker: transactions, budgets, alerts")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(arg!(--config <FILE> "Configuration file").global(true))
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(tx_cmd())
        .subcommand(budget_cmd())
        .subcommand(report_cmd())
        .subcommand(
            Command::new("import")
                .about("Import data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .about("Import transactions from CSV (date, amount, type, category, description)")
                        .arg(arg!(--path <FILE> "CSV file").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .about("Write the (filtered) transaction list to a file")
                        .arg(
                            arg!(--format <FORMAT> "csv | json")
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(arg!(--out <FILE> "Output path; defaults to finanzas_export_<date>.<ext>"))
                        .args(filter_args()),
                ),
        )
        .subcommand(notify_cmd())
        .subcommand(colors_cmd())
        .subcommand(sync_cmd())
        .subcommand(advisor_cmd())
        .subcommand(
            Command::new("demo")
                .about("Sample data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("load")
                        .about("Replace transactions and budgets with a sample year")
                        .arg(yes_arg()),
                ),
        )
}
