//! Recur CLI - Recurring-transaction engine
//!
//! Usage:
//!   recur init                               Initialize database
//!   recur import --plan 1 --bucket 1 -f CSV  Import expense history
//!   recur detect --plan 1                    Suggest recurring templates
//!   recur generate --plan 1                  Generate templates due today
//!   recur serve --port 3000                  Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve { port, host } => commands::cmd_serve(&cli.db, &host, port).await,
        Commands::Plans { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(PlansAction::List) => commands::cmd_plans_list(&db),
                Some(PlansAction::Add { name, currency }) => {
                    commands::cmd_plans_add(&db, &name, &currency)
                }
            }
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                ExpensesAction::List { plan, limit } => {
                    commands::cmd_expenses_list(&db, plan, limit)
                }
                ExpensesAction::Add {
                    plan,
                    name,
                    amount,
                    category,
                    bucket,
                    date,
                    currency,
                } => commands::cmd_expenses_add(
                    &db,
                    plan,
                    &name,
                    &amount,
                    &category,
                    bucket,
                    date.as_deref(),
                    currency.as_deref(),
                ),
            }
        }
        Commands::Import { plan, bucket, file } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_import(&db, plan, bucket, &file)
        }
        Commands::Detect {
            plan,
            min_occurrences,
            json,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_detect(&db, plan, min_occurrences, json)
        }
        Commands::Suggestions { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                SuggestionsAction::Accept {
                    plan,
                    index,
                    bucket,
                } => commands::cmd_suggestions_accept(&db, plan, index, bucket),
            }
        }
        Commands::Templates { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                TemplatesAction::List { plan } => commands::cmd_templates_list(&db, plan),
                TemplatesAction::FromExpense { expense, day } => {
                    commands::cmd_templates_from_expense(&db, expense, day)
                }
                TemplatesAction::Enable { id } => commands::cmd_templates_set_active(&db, id, true),
                TemplatesAction::Disable { id } => {
                    commands::cmd_templates_set_active(&db, id, false)
                }
                TemplatesAction::SetDay { id, day } => {
                    commands::cmd_templates_set_day(&db, id, day)
                }
                TemplatesAction::Delete { id } => commands::cmd_templates_delete(&db, id),
                TemplatesAction::Next { id } => commands::cmd_templates_next(&db, id),
            }
        }
        Commands::Generate { template, plan } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_generate(&db, template, plan)
        }
    }
}
