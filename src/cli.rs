// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}

fn json_flags() -> [Arg; 2] {
    [
        flag("json", "Print as pretty JSON"),
        flag("jsonl", "Print as JSON lines"),
    ]
}

fn as_of_args() -> [Arg; 2] {
    [
        opt(
            "as-of",
            "Reference instant (YYYY-MM-DD[ HH:MM[:SS]]); a bare date means end of day",
        ),
        opt("clusters", "JSON file overriding the stored category clusters"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("spendcast")
        .version(clap::crate_version!())
        .about("Personal expense tracker with end-of-month spending forecasts")
        .arg(flag("verbose", "Log engine details to stderr").global(true))
        .subcommand(Command::new("init").about("Create the database if needed"))
        .subcommand(
            Command::new("tx")
                .about("Record and browse expenses")
                .subcommand(
                    Command::new("add")
                        .about("Record an expense")
                        .arg(opt("date", "When it was spent (default: now)"))
                        .arg(req("amount", "Positive amount"))
                        .arg(req("category", "Category name"))
                        .arg(opt("note", "Free-text note")),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of an expense")
                        .arg(req("id", "Transaction id"))
                        .arg(opt("date", "New timestamp"))
                        .arg(opt("amount", "New amount"))
                        .arg(opt("category", "New category"))
                        .arg(opt("note", "New note (empty string clears it)")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an expense")
                        .arg(req("id", "Transaction id")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List expenses, newest first")
                        .arg(
                            opt("period", "day|week|month|year|all")
                                .value_parser(["day", "week", "month", "year", "all"])
                                .default_value("all"),
                        )
                        .arg(opt("on", "Anchor date for --period (default: today)"))
                        .arg(opt("keyword", "Match note or category, case-insensitive"))
                        .arg(opt("category", "Exact category"))
                        .arg(opt("from", "First date, inclusive"))
                        .arg(opt("to", "Last date, inclusive"))
                        .arg(opt("min", "Minimum amount"))
                        .arg(opt("max", "Maximum amount"))
                        .arg(opt("limit", "Maximum rows").value_parser(value_parser!(usize)))
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories and their forecasting clusters")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Category name"))
                        .arg(opt("cluster", "fixed|regular|spiky").default_value("spiky")),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(Command::new("rm").arg(req("name", "Category name")))
                .subcommand(
                    Command::new("set-cluster")
                        .arg(req("name", "Category name"))
                        .arg(req("cluster", "fixed|regular|spiky")),
                ),
        )
        .subcommand(
            Command::new("forecast")
                .about("Project this month's total spending")
                .args(as_of_args())
                .arg(flag("json", "Print as pretty JSON")),
        )
        .subcommand(
            Command::new("anomalies")
                .about("Categories spending faster than usual over the last 10 days")
                .args(as_of_args())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("report").subcommand(
                Command::new("breakdown")
                    .about("Spending per category, compared with the previous period")
                    .arg(
                        opt("period", "day|week|month|year|all")
                            .value_parser(["day", "week", "month", "year", "all"])
                            .default_value("month"),
                    )
                    .arg(opt("on", "Any date inside the period (default: today)"))
                    .args(json_flags()),
            ),
        )
        .subcommand(
            Command::new("import").subcommand(
                Command::new("transactions")
                    .about("Import a CSV with Date, Amount, Category, Note, Type columns")
                    .arg(req("path", "CSV file")),
            ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        opt("format", "csv|json")
                            .value_parser(["csv", "json"])
                            .default_value("csv"),
                    )
                    .arg(req("out", "Output file")),
            ),
        )
        .subcommand(Command::new("doctor").about("Report data problems"))
        .subcommand(
            Command::new("config")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-currency").arg(req("currency", "Display currency code")),
                ),
        )
}
