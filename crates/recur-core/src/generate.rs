//! Expense generation from recurring templates
//!
//! Generation writes the expense first and then advances the template's
//! `last_generated_date`. The two writes are not transactional: if the second
//! one fails the template stays due and may generate again on the next check.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{
    BatchResult, Expense, GenerationFailure, NewExpense, NewRecurringTemplate, RecurringTemplate,
    TemplateSuggestion,
};
use crate::store::{TemplateStore, TransactionStore};

/// Appended to the template note on every generated expense
pub const AUTO_GENERATED_MARKER: &str = "(auto-generated)";

/// Note used when the template has none
pub const DEFAULT_GENERATED_NOTE: &str = "Auto-generated from recurring template";

impl NewRecurringTemplate {
    /// Check the template invariants before it is stored
    pub fn validate(&self) -> Result<()> {
        if self.amount < 0 {
            return Err(Error::InvalidData(format!(
                "Template amount must not be negative (got {})",
                self.amount
            )));
        }
        if let Some(day) = self.day_of_month {
            validate_day_of_month(day)?;
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidData("Template name is required".to_string()));
        }
        Ok(())
    }
}

pub fn validate_day_of_month(day: u32) -> Result<()> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "Day of month must be between 1 and 31 (got {})",
            day
        )))
    }
}

/// Build the expense a template materializes into on `today`
pub fn expense_from_template(template: &RecurringTemplate, today: NaiveDate) -> NewExpense {
    let notes = match template.notes.as_deref() {
        Some(note) if !note.trim().is_empty() => {
            format!("{} {}", note.trim(), AUTO_GENERATED_MARKER)
        }
        _ => DEFAULT_GENERATED_NOTE.to_string(),
    };

    NewExpense {
        plan_id: template.plan_id,
        name: template.name.clone(),
        amount: template.amount,
        frequency: template.frequency,
        category: template.category,
        currency: template.currency.clone(),
        transaction_date: Some(today),
        bucket_id: template.bucket_id,
        is_fixed: template.is_fixed,
        notes: Some(notes),
        template_id: Some(template.id),
    }
}

/// Build an active, fixed template from an accepted suggestion
pub fn template_from_suggestion(
    plan_id: i64,
    suggestion: &TemplateSuggestion,
    bucket_id: i64,
) -> NewRecurringTemplate {
    let count = suggestion.source_expense_ids.len();
    NewRecurringTemplate {
        plan_id,
        name: suggestion.name.clone(),
        amount: suggestion.amount,
        frequency: suggestion.frequency,
        category: suggestion.category,
        bucket_id,
        currency: suggestion.currency.clone(),
        day_of_month: None,
        is_active: true,
        notes: Some(format!(
            "Created from {} detected transaction{}",
            count,
            if count == 1 { "" } else { "s" }
        )),
        is_fixed: true,
    }
}

/// Build an active, fixed template that repeats an existing expense
pub fn template_from_expense(
    expense: &Expense,
    day_of_month: Option<u32>,
) -> Result<NewRecurringTemplate> {
    if let Some(day) = day_of_month {
        validate_day_of_month(day)?;
    }

    Ok(NewRecurringTemplate {
        plan_id: expense.plan_id,
        name: expense.name.clone(),
        amount: expense.amount,
        frequency: expense.frequency,
        category: expense.category,
        bucket_id: expense.bucket_id,
        currency: expense.currency.clone(),
        day_of_month,
        is_active: true,
        notes: expense.notes.clone(),
        is_fixed: true,
    })
}

/// Materializes expenses from templates held in a template store
pub struct Generator<'a> {
    templates: &'a dyn TemplateStore,
    transactions: &'a dyn TransactionStore,
}

impl<'a> Generator<'a> {
    pub fn new(templates: &'a dyn TemplateStore, transactions: &'a dyn TransactionStore) -> Self {
        Self {
            templates,
            transactions,
        }
    }

    /// Create one expense from the template and mark it generated on `today`
    pub fn generate_from_template(
        &self,
        template: &RecurringTemplate,
        today: NaiveDate,
    ) -> Result<Expense> {
        let expense = self
            .transactions
            .create_expense(&expense_from_template(template, today))?;
        self.templates.update_last_generated(template.id, today)?;

        debug!(
            template_id = template.id,
            expense_id = expense.id,
            "Generated expense from template {:?}",
            template.name
        );

        Ok(expense)
    }

    /// Generate immediately, ignoring the schedule. `None` when the id is unknown.
    pub fn generate_now(&self, template_id: i64, today: NaiveDate) -> Result<Option<Expense>> {
        match self.templates.get_template(template_id)? {
            Some(template) => self.generate_from_template(&template, today).map(Some),
            None => {
                debug!(template_id, "generate_now: template not found");
                Ok(None)
            }
        }
    }

    /// Generate every template of the plan that is due on `today`.
    ///
    /// A failing template is recorded in the result and never stops the
    /// batch. Only failing to list the due templates is returned as an error.
    pub fn run_due_batch(&self, plan_id: i64, today: NaiveDate) -> Result<BatchResult> {
        let due = self.templates.templates_for_today(plan_id, today)?;
        let mut result = BatchResult {
            checked_count: due.len(),
            ..Default::default()
        };

        for template in &due {
            match self.generate_from_template(template, today) {
                Ok(_) => {
                    result.generated_count += 1;
                    result.processed_template_ids.push(template.id);
                }
                Err(e) => {
                    warn!(
                        template_id = template.id,
                        "Failed to generate from template {:?}: {}", template.name, e
                    );
                    result.errors.push(GenerationFailure {
                        template_id: template.id,
                        template_name: template.name.clone(),
                        error_message: e.to_string(),
                    });
                }
            }
        }

        info!(
            plan_id,
            due = result.checked_count,
            generated = result.generated_count,
            failed = result.errors.len(),
            "Recurring generation batch complete"
        );

        Ok(result)
    }
}
