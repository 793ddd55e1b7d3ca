//! Engine façade
//!
//! Ties the detector, scheduler, and generator to a pair of stores and a
//! clock. This is the surface the CLI and the server call.

use chrono::NaiveDate;

use crate::detect::{DetectionConfig, PatternDetector};
use crate::error::Result;
use crate::generate::{self, Generator};
use crate::models::{BatchResult, Expense, RecurringTemplate, TemplateSuggestion};
use crate::schedule;
use crate::store::{TemplateStore, TransactionStore};

/// Source of "today"
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// The local calendar date
    #[default]
    System,
    /// A pinned date, for tests and replays
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Self::System => chrono::Local::now().date_naive(),
            Self::Fixed(date) => *date,
        }
    }
}

pub struct RecurringEngine<'a> {
    templates: &'a dyn TemplateStore,
    transactions: &'a dyn TransactionStore,
    clock: Clock,
}

impl<'a> RecurringEngine<'a> {
    pub fn new(templates: &'a dyn TemplateStore, transactions: &'a dyn TransactionStore) -> Self {
        Self {
            templates,
            transactions,
            clock: Clock::System,
        }
    }

    pub fn with_clock(
        templates: &'a dyn TemplateStore,
        transactions: &'a dyn TransactionStore,
        clock: Clock,
    ) -> Self {
        Self {
            templates,
            transactions,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn generator(&self) -> Generator<'a> {
        Generator::new(self.templates, self.transactions)
    }

    /// Suggest templates from the plan's history (default minimum: 2 occurrences)
    pub fn detect_recurring_patterns(
        &self,
        plan_id: i64,
        min_occurrences: Option<usize>,
    ) -> Result<Vec<TemplateSuggestion>> {
        let config = min_occurrences
            .map(DetectionConfig::with_min_occurrences)
            .unwrap_or_default();
        PatternDetector::with_config(self.transactions, config).detect(plan_id)
    }

    /// Accept a suggestion by storing it as an active template
    pub fn create_template_from_suggestion(
        &self,
        plan_id: i64,
        suggestion: &TemplateSuggestion,
        bucket_id: i64,
    ) -> Result<RecurringTemplate> {
        let new = generate::template_from_suggestion(plan_id, suggestion, bucket_id);
        self.templates.create_template(&new)
    }

    /// Store a template that repeats an existing expense
    pub fn create_template_from_expense(
        &self,
        expense: &Expense,
        day_of_month: Option<u32>,
    ) -> Result<RecurringTemplate> {
        let new = generate::template_from_expense(expense, day_of_month)?;
        self.templates.create_template(&new)
    }

    pub fn generate_from_template(&self, template: &RecurringTemplate) -> Result<Expense> {
        self.generator().generate_from_template(template, self.today())
    }

    /// Generate one expense now regardless of schedule; `None` for unknown ids
    pub fn generate_now(&self, template_id: i64) -> Result<Option<Expense>> {
        self.generator().generate_now(template_id, self.today())
    }

    /// Run the due batch for a plan
    pub fn check_and_generate_for_plan(&self, plan_id: i64) -> Result<BatchResult> {
        self.generator().run_due_batch(plan_id, self.today())
    }

    pub fn templates_due_today(&self, plan_id: i64) -> Result<Vec<RecurringTemplate>> {
        self.templates.templates_for_today(plan_id, self.today())
    }

    pub fn next_generation_date(&self, template: &RecurringTemplate) -> Option<NaiveDate> {
        schedule::next_due_date(template, self.today())
    }
}
