//! CSV import of transaction history
//!
//! Expected header (case-insensitive, any column order):
//! `date,name,amount[,category][,currency][,notes]`

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ExpenseCategory, Frequency, NewExpense};

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    name: usize,
    amount: usize,
    category: Option<usize>,
    currency: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing required column: {}", name)))
        };

        Ok(Self {
            date: require("date")?,
            name: require("name")?,
            amount: require("amount")?,
            category: find("category"),
            currency: find("currency"),
            notes: find("notes"),
        })
    }
}

/// Parse an expense history CSV into new expenses for `plan_id`.
///
/// Every row becomes a variable monthly expense charged to `bucket_id`.
pub fn parse_expense_csv<R: Read>(
    reader: R,
    plan_id: i64,
    bucket_id: i64,
) -> Result<Vec<NewExpense>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut expenses = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let row = index + 1;
        let record = result?;

        let field = |col: usize| record.get(col).map(str::trim).unwrap_or("");
        let optional = |col: Option<usize>| {
            col.map(field)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        let date = parse_date(field(columns.date))
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;

        let name = field(columns.name);
        if name.is_empty() {
            return Err(Error::Import(format!("Row {}: missing name", row)));
        }

        let amount = parse_amount(field(columns.amount)).map_err(|e| match e {
            Error::Import(msg) => Error::Import(format!("Row {}: {}", row, msg)),
            other => other,
        })?;

        let category = optional(columns.category)
            .and_then(|s| s.parse().ok())
            .unwrap_or(ExpenseCategory::Other);

        expenses.push(NewExpense {
            plan_id,
            name: name.to_string(),
            amount,
            frequency: Frequency::Monthly,
            category,
            currency: optional(columns.currency).map(|c| c.to_uppercase()),
            transaction_date: Some(date),
            bucket_id,
            is_fixed: false,
            notes: optional(columns.notes),
            template_id: None,
        });
    }

    debug!(rows = expenses.len(), "Parsed expense CSV");
    Ok(expenses)
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    Err(format!("unable to parse date: {:?}", s))
}

/// Parse a decimal major-unit amount (`15.99`, `$1,200`, `-8.25`) into
/// absolute minor units
pub fn parse_amount(s: &str) -> Result<i64> {
    let invalid = || Error::Import(format!("unable to parse amount: {:?}", s));
    let cleaned = s.replace(['$', ',', ' '], "");
    let value: f64 = cleaned.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok((value.abs() * 100.0).round() as i64)
}
