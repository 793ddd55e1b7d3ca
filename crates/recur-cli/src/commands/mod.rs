//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init command and shared utilities (open_db)
//! - `plans` - Plan commands (list, add)
//! - `expenses` - Expense commands (list, add) and CSV import
//! - `detect` - Pattern detection and suggestion acceptance
//! - `templates` - Template management commands
//! - `generate` - Expense generation (single template or due batch)
//! - `serve` - Web server command

pub mod core;
pub mod detect;
pub mod expenses;
pub mod generate;
pub mod plans;
pub mod serve;
pub mod templates;

// Re-export command functions for main.rs
pub use core::*;
pub use detect::*;
pub use expenses::*;
pub use generate::*;
pub use plans::*;
pub use serve::*;
pub use templates::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format integer minor units as a decimal amount (1599 -> "15.99")
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
