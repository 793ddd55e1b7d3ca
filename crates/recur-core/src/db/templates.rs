//! Recurring template operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::generate::validate_day_of_month;
use crate::models::{ExpenseCategory, Frequency, NewRecurringTemplate, RecurringTemplate};
use crate::schedule;
use crate::store::TemplateStore;

const TEMPLATE_COLUMNS: &str = "id, plan_id, name, amount, frequency, category, bucket_id, \
     currency, day_of_month, is_active, last_generated_date, notes, is_fixed, created_at, updated_at";

fn row_to_template(row: &rusqlite::Row) -> rusqlite::Result<RecurringTemplate> {
    let frequency_str: String = row.get(4)?;
    let category_str: String = row.get(5)?;
    let created_at_str: String = row.get(13)?;
    let updated_at_str: String = row.get(14)?;

    Ok(RecurringTemplate {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        frequency: frequency_str.parse().unwrap_or(Frequency::Monthly),
        category: category_str.parse().unwrap_or(ExpenseCategory::Other),
        bucket_id: row.get(6)?,
        currency: row.get(7)?,
        day_of_month: row.get(8)?,
        is_active: row.get(9)?,
        last_generated_date: parse_date(row.get(10)?),
        notes: row.get(11)?,
        is_fixed: row.get(12)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

impl Database {
    fn query_templates(&self, plan_id: i64, active_only: bool) -> Result<Vec<RecurringTemplate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM recurring_templates
            WHERE plan_id = ? AND (? = 0 OR is_active = 1)
            ORDER BY id
            "#,
            TEMPLATE_COLUMNS
        ))?;
        let templates = stmt
            .query_map(params![plan_id, active_only], row_to_template)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    /// Enable or disable a template
    pub fn set_template_active(&self, id: i64, active: bool) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE recurring_templates SET is_active = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
            params![active, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Template {}", id)));
        }
        Ok(())
    }

    /// Change the anchor day. `None` reverts to the creation day.
    pub fn update_template_schedule(&self, id: i64, day_of_month: Option<u32>) -> Result<()> {
        if let Some(day) = day_of_month {
            validate_day_of_month(day)?;
        }
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE recurring_templates SET day_of_month = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
            params![day_of_month, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Template {}", id)));
        }
        Ok(())
    }

    /// Delete a template. Generated expenses are kept and lose their link.
    ///
    /// Returns false when no template had that id.
    pub fn delete_template(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM recurring_templates WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}

impl TemplateStore for Database {
    fn get_template(&self, id: i64) -> Result<Option<RecurringTemplate>> {
        let conn = self.conn()?;
        let template = conn
            .query_row(
                &format!(
                    "SELECT {} FROM recurring_templates WHERE id = ?",
                    TEMPLATE_COLUMNS
                ),
                params![id],
                row_to_template,
            )
            .optional()?;
        Ok(template)
    }

    fn create_template(&self, template: &NewRecurringTemplate) -> Result<RecurringTemplate> {
        template.validate()?;

        let id = {
            let conn = self.conn()?;
            conn.execute(
                r#"
                INSERT INTO recurring_templates (plan_id, name, amount, frequency, category, bucket_id,
                                                 currency, day_of_month, is_active, notes, is_fixed)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    template.plan_id,
                    template.name.trim(),
                    template.amount,
                    template.frequency.as_str(),
                    template.category.as_str(),
                    template.bucket_id,
                    template.currency,
                    template.day_of_month,
                    template.is_active,
                    template.notes,
                    template.is_fixed,
                ],
            )?;
            conn.last_insert_rowid()
        };

        self.get_template(id)?
            .ok_or_else(|| Error::NotFound(format!("Template {}", id)))
    }

    fn update_last_generated(&self, id: i64, date: NaiveDate) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE recurring_templates
            SET last_generated_date = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![date.to_string(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Template {}", id)));
        }
        Ok(())
    }

    fn templates_for_today(
        &self,
        plan_id: i64,
        today: NaiveDate,
    ) -> Result<Vec<RecurringTemplate>> {
        Ok(schedule::due_templates(
            self.active_templates_by_plan(plan_id)?,
            today,
        ))
    }

    fn templates_by_plan(&self, plan_id: i64) -> Result<Vec<RecurringTemplate>> {
        self.query_templates(plan_id, false)
    }

    fn active_templates_by_plan(&self, plan_id: i64) -> Result<Vec<RecurringTemplate>> {
        self.query_templates(plan_id, true)
    }
}
