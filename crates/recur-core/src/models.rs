//! Domain models for the recurring-transaction engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A budget plan that owns expenses and recurring templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    /// Default currency for templates and expenses without an explicit one
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// How often a charge recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Semimonthly => "semimonthly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    /// Map an average gap between charges (in days) to the nearest frequency.
    ///
    /// Thresholds are inclusive upper bounds.
    pub fn from_average_gap(days: f64) -> Self {
        if days <= 10.0 {
            Self::Weekly
        } else if days <= 18.0 {
            Self::Biweekly
        } else if days <= 20.0 {
            Self::Semimonthly
        } else if days <= 45.0 {
            Self::Monthly
        } else if days <= 120.0 {
            Self::Quarterly
        } else {
            Self::Annual
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "bi-weekly" => Ok(Self::Biweekly),
            "semimonthly" | "semi-monthly" => Ok(Self::Semimonthly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Housing,
    Utilities,
    Groceries,
    Transportation,
    Insurance,
    Healthcare,
    Debt,
    Subscriptions,
    Entertainment,
    Dining,
    Personal,
    Education,
    Savings,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housing => "housing",
            Self::Utilities => "utilities",
            Self::Groceries => "groceries",
            Self::Transportation => "transportation",
            Self::Insurance => "insurance",
            Self::Healthcare => "healthcare",
            Self::Debt => "debt",
            Self::Subscriptions => "subscriptions",
            Self::Entertainment => "entertainment",
            Self::Dining => "dining",
            Self::Personal => "personal",
            Self::Education => "education",
            Self::Savings => "savings",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "housing" | "rent" | "mortgage" => Ok(Self::Housing),
            "utilities" => Ok(Self::Utilities),
            "groceries" => Ok(Self::Groceries),
            "transportation" | "transport" => Ok(Self::Transportation),
            "insurance" => Ok(Self::Insurance),
            "healthcare" | "health" => Ok(Self::Healthcare),
            "debt" => Ok(Self::Debt),
            "subscriptions" | "subscription" => Ok(Self::Subscriptions),
            "entertainment" => Ok(Self::Entertainment),
            "dining" => Ok(Self::Dining),
            "personal" => Ok(Self::Personal),
            "education" => Ok(Self::Education),
            "savings" => Ok(Self::Savings),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An individual expense record (transaction)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    /// Amount in integer minor currency units (e.g. cents)
    pub amount: i64,
    pub frequency: Frequency,
    pub category: ExpenseCategory,
    /// Falls back to the plan currency when absent
    pub currency: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    /// Budget bucket this expense is charged against
    pub bucket_id: i64,
    pub is_fixed: bool,
    pub notes: Option<String>,
    /// Template that generated this expense, if any
    pub template_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// The date the expense happened, falling back to when it was recorded
    pub fn effective_date(&self) -> NaiveDate {
        self.transaction_date
            .unwrap_or_else(|| self.created_at.date_naive())
    }
}

/// A new expense (before DB insertion)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub plan_id: i64,
    pub name: String,
    pub amount: i64,
    pub frequency: Frequency,
    pub category: ExpenseCategory,
    pub currency: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub bucket_id: i64,
    pub is_fixed: bool,
    pub notes: Option<String>,
    pub template_id: Option<i64>,
}

/// A persisted recurring-payment definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTemplate {
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    /// Amount in integer minor currency units, never negative
    pub amount: i64,
    pub frequency: Frequency,
    pub category: ExpenseCategory,
    pub bucket_id: i64,
    /// Falls back to the plan currency when absent
    pub currency: Option<String>,
    /// Explicit schedule anchor (1-31); the creation day is used when absent
    pub day_of_month: Option<u32>,
    pub is_active: bool,
    pub last_generated_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_fixed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new recurring template (before DB insertion)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecurringTemplate {
    pub plan_id: i64,
    pub name: String,
    pub amount: i64,
    pub frequency: Frequency,
    pub category: ExpenseCategory,
    pub bucket_id: i64,
    pub currency: Option<String>,
    pub day_of_month: Option<u32>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub is_fixed: bool,
}

/// A candidate template produced by pattern detection.
///
/// Suggestions are plain values: they are rebuilt on every detection run
/// and carry no storage identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSuggestion {
    pub name: String,
    /// Mean amount of the matched group, rounded to the nearest minor unit
    pub amount: i64,
    pub frequency: Frequency,
    pub category: ExpenseCategory,
    pub currency: Option<String>,
    /// Ranking score in [0, 1]
    pub confidence: f64,
    /// Expenses that produced this suggestion
    pub source_expense_ids: Vec<i64>,
}

/// A single template that failed to generate during a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub template_id: i64,
    pub template_name: String,
    pub error_message: String,
}

/// Outcome of a due-template generation batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Templates that were due and attempted
    pub checked_count: usize,
    pub generated_count: usize,
    /// Templates that generated successfully, in processing order
    pub processed_template_ids: Vec<i64>,
    pub errors: Vec<GenerationFailure>,
}
