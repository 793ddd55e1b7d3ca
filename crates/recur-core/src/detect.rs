//! Recurring pattern detection
//!
//! Groups a plan's expense history by normalized name and currency, scores
//! each group on how often it repeats and how stable its amount is, and
//! proposes the strongest groups as template suggestions.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Expense, ExpenseCategory, Frequency, TemplateSuggestion};
use crate::normalize::normalize_name;
use crate::store::TransactionStore;

/// Detection configuration
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Groups with fewer members are never suggested
    pub min_occurrences: usize,
    /// Suggestions scoring below this are dropped
    pub min_confidence: f64,
    /// Occurrence count at which the occurrence score saturates
    pub occurrence_saturation: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 2,
            min_confidence: 0.5,
            occurrence_saturation: 6,
        }
    }
}

impl DetectionConfig {
    pub fn with_min_occurrences(min_occurrences: usize) -> Self {
        Self {
            min_occurrences,
            ..Default::default()
        }
    }
}

/// Composite grouping key: two expenses are the same charge when both parts match
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    name: String,
    currency: Option<String>,
}

struct ExpenseGroup<'a> {
    key: GroupKey,
    members: Vec<&'a Expense>,
}

/// Detector that reads history from a transaction store
pub struct PatternDetector<'a> {
    store: &'a dyn TransactionStore,
    config: DetectionConfig,
}

impl<'a> PatternDetector<'a> {
    pub fn new(store: &'a dyn TransactionStore) -> Self {
        Self {
            store,
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(store: &'a dyn TransactionStore, config: DetectionConfig) -> Self {
        Self { store, config }
    }

    /// Detect recurring patterns in a plan's history, best suggestions first
    pub fn detect(&self, plan_id: i64) -> Result<Vec<TemplateSuggestion>> {
        let expenses = self.store.expenses_by_plan(plan_id)?;
        let suggestions = detect_patterns(&expenses, &self.config);

        info!(
            plan_id,
            expenses = expenses.len(),
            suggestions = suggestions.len(),
            "Recurring pattern detection complete"
        );

        Ok(suggestions)
    }
}

/// Score every qualifying group in `expenses` and return suggestions ordered
/// by descending confidence. Ties keep first-seen group order.
pub fn detect_patterns(expenses: &[Expense], config: &DetectionConfig) -> Vec<TemplateSuggestion> {
    let min_occurrences = config.min_occurrences.max(1);

    let mut suggestions: Vec<TemplateSuggestion> = group_expenses(expenses)
        .into_iter()
        .filter(|group| {
            let keep = group.members.len() >= min_occurrences;
            if !keep {
                debug!(
                    "Skipping {:?} - {} occurrence(s), need {}",
                    group.key.name,
                    group.members.len(),
                    min_occurrences
                );
            }
            keep
        })
        .filter_map(|group| score_group(&group, config))
        .collect();

    suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    suggestions
}

/// Group expenses by key, keeping groups in the order their first member appears
fn group_expenses(expenses: &[Expense]) -> Vec<ExpenseGroup<'_>> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<ExpenseGroup<'_>> = Vec::new();

    for expense in expenses {
        let key = GroupKey {
            name: normalize_name(&expense.name),
            currency: expense.currency.clone(),
        };

        match index.get(&key) {
            Some(&i) => groups[i].members.push(expense),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ExpenseGroup {
                    key,
                    members: vec![expense],
                });
            }
        }
    }

    groups
}

fn score_group(group: &ExpenseGroup<'_>, config: &DetectionConfig) -> Option<TemplateSuggestion> {
    let representative = most_recent(&group.members)?;

    let amounts: Vec<i64> = group.members.iter().map(|e| e.amount).collect();
    let (mean, amount_score) = amount_consistency(&amounts);
    let occurrences = occurrence_score(group.members.len(), config.occurrence_saturation);
    let confidence = (0.4 * occurrences + 0.6 * amount_score).clamp(0.0, 1.0);

    if confidence < config.min_confidence {
        debug!(
            "Skipping {:?} - confidence {:.2} below {:.2}",
            group.key.name, confidence, config.min_confidence
        );
        return None;
    }

    let dates: Vec<NaiveDate> = group.members.iter().map(|e| e.effective_date()).collect();

    Some(TemplateSuggestion {
        name: representative.name.clone(),
        amount: mean.round() as i64,
        frequency: infer_frequency(&dates),
        category: dominant_category(&group.members),
        currency: group.key.currency.clone(),
        confidence,
        source_expense_ids: group.members.iter().map(|e| e.id).collect(),
    })
}

/// Member with the latest effective date; the first one wins on ties
fn most_recent<'a>(members: &[&'a Expense]) -> Option<&'a Expense> {
    let mut best: Option<&'a Expense> = None;
    for &expense in members {
        match best {
            Some(current) if expense.effective_date() <= current.effective_date() => {}
            _ => best = Some(expense),
        }
    }
    best
}

/// Mean amount and a [0, 1] score that drops as the largest deviation from
/// the mean grows. A zero mean scores 0.
fn amount_consistency(amounts: &[i64]) -> (f64, f64) {
    if amounts.is_empty() {
        return (0.0, 0.0);
    }

    let mean = amounts.iter().map(|&a| a as f64).sum::<f64>() / amounts.len() as f64;
    if mean == 0.0 {
        return (mean, 0.0);
    }

    let max_deviation = amounts
        .iter()
        .map(|&a| (a as f64 - mean).abs())
        .fold(0.0_f64, f64::max);

    let score = 1.0 - 2.0 * (max_deviation / mean.abs());
    (mean, score.clamp(0.0, 1.0))
}

fn occurrence_score(count: usize, saturation: usize) -> f64 {
    if saturation == 0 {
        return 1.0;
    }
    (count as f64 / saturation as f64).min(1.0)
}

/// Infer a cadence from the average positive gap between sorted dates.
///
/// Defaults to monthly when there is no positive gap to measure.
pub fn infer_frequency(dates: &[NaiveDate]) -> Frequency {
    let mut sorted = dates.to_vec();
    sorted.sort();

    let gaps: Vec<i64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .filter(|&gap| gap > 0)
        .collect();

    if gaps.is_empty() {
        return Frequency::Monthly;
    }

    let average = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
    Frequency::from_average_gap(average)
}

/// Most frequent category; the first one seen wins ties
fn dominant_category(members: &[&Expense]) -> ExpenseCategory {
    let mut counts: Vec<(ExpenseCategory, usize)> = Vec::new();
    for expense in members {
        match counts.iter_mut().find(|(c, _)| *c == expense.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((expense.category, 1)),
        }
    }

    let mut best: Option<(ExpenseCategory, usize)> = None;
    for (category, n) in counts {
        match best {
            Some((_, best_n)) if n <= best_n => {}
            _ => best = Some((category, n)),
        }
    }
    best.map(|(c, _)| c).unwrap_or(ExpenseCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: i64, name: &str, amount: i64, on: NaiveDate) -> Expense {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Expense {
            id,
            plan_id: 1,
            name: name.to_string(),
            amount,
            frequency: Frequency::Monthly,
            category: ExpenseCategory::Subscriptions,
            currency: Some("USD".to_string()),
            transaction_date: Some(on),
            bucket_id: 1,
            is_fixed: false,
            notes: None,
            template_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// `count` charges of `amount` spaced `gap` days apart, starting at id `first_id`
    fn series(first_id: i64, name: &str, amount: i64, count: usize, gap: i64) -> Vec<Expense> {
        let start = date(2024, 1, 1);
        (0..count)
            .map(|i| {
                expense(
                    first_id + i as i64,
                    name,
                    amount,
                    start + Duration::days(gap * i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn test_amount_consistency() {
        let (mean, score) = amount_consistency(&[1000, 1000, 1000]);
        assert_eq!(mean, 1000.0);
        assert_eq!(score, 1.0);

        // mean 1000, max deviation 100 -> 1 - 2 * 0.1
        let (_, score) = amount_consistency(&[900, 1100]);
        assert!((score - 0.8).abs() < 1e-9);

        // deviation of half the mean or more floors at zero
        let (_, score) = amount_consistency(&[100, 1900]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_amount_consistency_negative_amounts_stay_in_range() {
        let (mean, score) = amount_consistency(&[-1000, -1000, -1000]);
        assert_eq!(mean, -1000.0);
        assert_eq!(score, 1.0);

        let (_, score) = amount_consistency(&[-900, -1100]);
        assert!((score - 0.8).abs() < 1e-9);

        let (_, score) = amount_consistency(&[-100, -1900]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_amount_consistency_zero_mean() {
        assert_eq!(amount_consistency(&[0, 0, 0]), (0.0, 0.0));
    }

    #[test]
    fn test_occurrence_score_saturates() {
        assert!((occurrence_score(3, 6) - 0.5).abs() < 1e-9);
        assert_eq!(occurrence_score(6, 6), 1.0);
        assert_eq!(occurrence_score(12, 6), 1.0);
    }

    #[test]
    fn test_infer_frequency_table() {
        let cases = [
            (7, Frequency::Weekly),
            (14, Frequency::Biweekly),
            (19, Frequency::Semimonthly),
            (30, Frequency::Monthly),
            (90, Frequency::Quarterly),
            (200, Frequency::Annual),
        ];
        for (gap, expected) in cases {
            let dates: Vec<NaiveDate> = (0..4)
                .map(|i| date(2020, 1, 1) + Duration::days(gap * i))
                .collect();
            assert_eq!(infer_frequency(&dates), expected, "gap {}", gap);
        }
    }

    #[test]
    fn test_infer_frequency_ignores_order_and_same_day_gaps() {
        let dates = vec![
            date(2024, 3, 1),
            date(2024, 1, 1),
            date(2024, 1, 1),
            date(2024, 2, 1),
        ];
        assert_eq!(infer_frequency(&dates), Frequency::Monthly);
    }

    #[test]
    fn test_infer_frequency_defaults_to_monthly() {
        assert_eq!(infer_frequency(&[]), Frequency::Monthly);
        assert_eq!(infer_frequency(&[date(2024, 1, 1)]), Frequency::Monthly);
        assert_eq!(
            infer_frequency(&[date(2024, 1, 1), date(2024, 1, 1)]),
            Frequency::Monthly
        );
    }

    #[test]
    fn test_detect_groups_by_normalized_name() {
        let expenses = vec![
            expense(1, "Netflix - January 2024", 1599, date(2024, 1, 15)),
            expense(2, "NETFLIX 02/15/2024", 1599, date(2024, 2, 15)),
            expense(3, "netflix #3", 1599, date(2024, 3, 15)),
        ];
        let suggestions = detect_patterns(&expenses, &DetectionConfig::default());
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].source_expense_ids, vec![1, 2, 3]);
        assert_eq!(suggestions[0].frequency, Frequency::Monthly);
        // representative is the most recent charge
        assert_eq!(suggestions[0].name, "netflix #3");
    }

    #[test]
    fn test_detect_separates_currencies() {
        let mut eur = series(10, "Spotify", 999, 2, 30);
        for e in &mut eur {
            e.currency = Some("EUR".to_string());
        }
        let mut expenses = series(1, "Spotify", 999, 2, 30);
        expenses.extend(eur);

        let suggestions = detect_patterns(&expenses, &DetectionConfig::default());
        assert_eq!(suggestions.len(), 2);
        let currencies: Vec<_> = suggestions
            .iter()
            .map(|s| s.currency.clone().unwrap())
            .collect();
        assert_eq!(currencies, vec!["USD".to_string(), "EUR".to_string()]);
    }

    #[test]
    fn test_detect_missing_currency_groups_together() {
        let mut expenses = series(1, "Gym", 4000, 3, 30);
        for e in &mut expenses {
            e.currency = None;
        }
        let suggestions = detect_patterns(&expenses, &DetectionConfig::default());
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].currency, None);
    }

    #[test]
    fn test_min_occurrences_boundary() {
        let config = DetectionConfig::with_min_occurrences(3);

        let below = series(1, "Water", 5000, 2, 30);
        assert!(detect_patterns(&below, &config).is_empty());

        let at = series(1, "Water", 5000, 3, 30);
        assert_eq!(detect_patterns(&at, &config).len(), 1);
    }

    #[test]
    fn test_perfect_group_scores_one() {
        let expenses = series(1, "Rent", 150_000, 6, 30);
        let suggestions = detect_patterns(&expenses, &DetectionConfig::default());
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].confidence, 1.0);
        assert_eq!(suggestions[0].amount, 150_000);
    }

    #[test]
    fn test_volatile_amounts_are_filtered() {
        // occurrence 2/6, amount score 0 -> confidence ~0.13
        let expenses = vec![
            expense(1, "Groceries", 2000, date(2024, 1, 1)),
            expense(2, "Groceries", 18000, date(2024, 1, 8)),
        ];
        assert!(detect_patterns(&expenses, &DetectionConfig::default()).is_empty());
    }

    #[test]
    fn test_mean_amount_is_rounded() {
        let expenses = vec![
            expense(1, "Electric", 1000, date(2024, 1, 1)),
            expense(2, "Electric", 1001, date(2024, 2, 1)),
        ];
        let suggestions = detect_patterns(&expenses, &DetectionConfig::default());
        // 1000.5 rounds away from zero
        assert_eq!(suggestions[0].amount, 1001);
    }

    #[test]
    fn test_suggestions_sorted_by_confidence() {
        let mut expenses = series(1, "Phone", 5000, 2, 30);
        expenses.extend(series(10, "Insurance", 12000, 6, 30));
        let suggestions = detect_patterns(&expenses, &DetectionConfig::default());
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].name, "Insurance");
        assert!(suggestions[0].confidence >= suggestions[1].confidence);
    }

    #[test]
    fn test_confidence_ties_keep_first_seen_order() {
        let mut expenses = series(1, "Alpha", 5000, 2, 30);
        expenses.extend(series(10, "Beta", 5000, 2, 30));
        let suggestions = detect_patterns(&expenses, &DetectionConfig::default());
        let names: Vec<_> = suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_dominant_category_first_seen_wins_ties() {
        let mut a = expense(1, "Bill", 100, date(2024, 1, 1));
        a.category = ExpenseCategory::Utilities;
        let mut b = expense(2, "Bill", 100, date(2024, 2, 1));
        b.category = ExpenseCategory::Housing;
        assert_eq!(dominant_category(&[&a, &b]), ExpenseCategory::Utilities);

        let mut c = expense(3, "Bill", 100, date(2024, 3, 1));
        c.category = ExpenseCategory::Housing;
        assert_eq!(dominant_category(&[&a, &b, &c]), ExpenseCategory::Housing);
    }

    #[test]
    fn test_representative_falls_back_to_created_at() {
        let mut old = expense(1, "Parking", 800, date(2024, 1, 1));
        old.transaction_date = None;
        old.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        old.name = "Parking (undated)".to_string();
        let newer = expense(2, "Parking", 800, date(2024, 4, 1));

        let rep = most_recent(&[&old, &newer]).unwrap();
        assert_eq!(rep.id, 1);
    }

    #[test]
    fn test_confidence_bounds() {
        let mut expenses = series(1, "Internet", 6000, 9, 30);
        expenses.extend(series(20, "Coffee", 450, 3, 3));
        expenses.push(expense(30, "Coffee", 900, date(2024, 1, 20)));
        let config = DetectionConfig {
            min_confidence: 0.0,
            ..Default::default()
        };
        for s in detect_patterns(&expenses, &config) {
            assert!((0.0..=1.0).contains(&s.confidence), "{:?}", s);
        }
    }

    #[test]
    fn test_detect_is_deterministic() {
        let mut expenses = series(1, "Rent", 150_000, 4, 30);
        expenses.extend(series(10, "Netflix", 1599, 3, 30));
        expenses.extend(series(20, "Gym", 4000, 5, 30));
        let config = DetectionConfig::default();
        let first = detect_patterns(&expenses, &config);
        for _ in 0..5 {
            assert_eq!(detect_patterns(&expenses, &config), first);
        }
    }

    #[test]
    fn test_empty_history_yields_nothing() {
        assert!(detect_patterns(&[], &DetectionConfig::default()).is_empty());
    }
}
