//! Recur Core Library
//!
//! Recurring-transaction engine for budget plans:
//! - Name normalization for grouping transaction variants
//! - Pattern detection over transaction history
//! - Monthly anchor-day scheduling of recurring templates
//! - Expense generation, singly or as a due batch
//! - SQLite storage and CSV import

pub mod db;
pub mod detect;
pub mod engine;
pub mod error;
pub mod generate;
pub mod import;
pub mod models;
pub mod normalize;
pub mod schedule;
pub mod store;

pub use db::Database;
pub use detect::{DetectionConfig, PatternDetector};
pub use engine::{Clock, RecurringEngine};
pub use error::{Error, Result};
pub use generate::Generator;
pub use models::*;
pub use normalize::normalize_name;
pub use store::{TemplateStore, TransactionStore};
