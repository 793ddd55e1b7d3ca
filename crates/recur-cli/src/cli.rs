//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

/// Recur - Find recurring charges and keep them on schedule
#[derive(Parser)]
#[command(name = "recur")]
#[command(
    about = "Recurring-transaction detection and generation for budget plans",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "recur.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage budget plans
    Plans {
        #[command(subcommand)]
        action: Option<PlansAction>,
    },

    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        action: ExpensesAction,
    },

    /// Import expense history from CSV (date,name,amount[,category][,currency][,notes])
    Import {
        /// Plan to import into
        #[arg(long)]
        plan: i64,

        /// Budget bucket for imported expenses
        #[arg(long)]
        bucket: i64,

        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Detect recurring patterns in a plan's history
    Detect {
        #[arg(long)]
        plan: i64,

        /// Minimum occurrences for a pattern (default 2)
        #[arg(long)]
        min_occurrences: Option<usize>,

        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Act on detected suggestions
    Suggestions {
        #[command(subcommand)]
        action: SuggestionsAction,
    },

    /// Manage recurring templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },

    /// Generate expenses from templates
    #[command(group(ArgGroup::new("target").required(true).args(["template", "plan"])))]
    Generate {
        /// Generate one expense from this template now, ignoring its schedule
        #[arg(long)]
        template: Option<i64>,

        /// Generate every template of this plan that is due today
        #[arg(long)]
        plan: Option<i64>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum PlansAction {
    /// List plans
    List,

    /// Create a plan
    Add {
        #[arg(long)]
        name: String,

        /// ISO currency code
        #[arg(long, default_value = "USD")]
        currency: String,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List a plan's expenses, newest first
    List {
        #[arg(long)]
        plan: i64,

        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Record an expense
    Add {
        #[arg(long)]
        plan: i64,

        #[arg(long)]
        name: String,

        /// Amount in major units (e.g. 15.99)
        #[arg(long)]
        amount: String,

        #[arg(long, default_value = "other")]
        category: String,

        #[arg(long)]
        bucket: i64,

        /// Transaction date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        currency: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SuggestionsAction {
    /// Accept the N-th suggestion from `recur detect` as a template
    Accept {
        #[arg(long)]
        plan: i64,

        /// 1-based position in the detect output
        #[arg(long)]
        index: usize,

        /// Budget bucket for the new template
        #[arg(long)]
        bucket: i64,
    },
}

#[derive(Subcommand)]
pub enum TemplatesAction {
    /// List a plan's templates
    List {
        #[arg(long)]
        plan: i64,
    },

    /// Create a template that repeats an existing expense
    FromExpense {
        #[arg(long)]
        expense: i64,

        /// Anchor day of month (1-31, default: today's day)
        #[arg(long)]
        day: Option<u32>,
    },

    /// Resume a template
    Enable {
        #[arg(long)]
        id: i64,
    },

    /// Pause a template
    Disable {
        #[arg(long)]
        id: i64,
    },

    /// Move a template to another anchor day
    SetDay {
        #[arg(long)]
        id: i64,

        /// Anchor day of month (1-31); omit to revert to the creation day
        #[arg(long)]
        day: Option<u32>,
    },

    /// Delete a template (generated expenses are kept)
    Delete {
        #[arg(long)]
        id: i64,
    },

    /// Show the next generation date
    Next {
        #[arg(long)]
        id: i64,
    },
}
