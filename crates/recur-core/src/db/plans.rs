//! Plan operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Plan;

fn row_to_plan(row: &rusqlite::Row) -> rusqlite::Result<Plan> {
    let created_at_str: String = row.get(3)?;
    Ok(Plan {
        id: row.get(0)?,
        name: row.get(1)?,
        currency: row.get(2)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Create a plan. The currency code is stored upper-cased.
    pub fn create_plan(&self, name: &str, currency: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Plan name is required".to_string()));
        }
        let currency = currency.trim().to_uppercase();
        if currency.is_empty() {
            return Err(Error::InvalidData("Plan currency is required".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO plans (name, currency) VALUES (?, ?)",
            params![name, currency],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_plan(&self, id: i64) -> Result<Option<Plan>> {
        let conn = self.conn()?;
        let plan = conn
            .query_row(
                "SELECT id, name, currency, created_at FROM plans WHERE id = ?",
                params![id],
                row_to_plan,
            )
            .optional()?;
        Ok(plan)
    }

    /// Like [`get_plan`](Self::get_plan) but unknown ids are an error
    pub fn require_plan(&self, id: i64) -> Result<Plan> {
        self.get_plan(id)?
            .ok_or_else(|| Error::NotFound(format!("Plan {}", id)))
    }

    pub fn list_plans(&self) -> Result<Vec<Plan>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, currency, created_at FROM plans ORDER BY id")?;
        let plans = stmt
            .query_map([], row_to_plan)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(plans)
    }
}
