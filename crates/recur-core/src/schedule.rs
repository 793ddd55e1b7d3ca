//! Template scheduling
//!
//! A template is pinned to an anchor day of the month: its explicit
//! `day_of_month` when set, otherwise the local calendar day it was created.
//! The anchor is clamped to the real length of each month, so an anchor of 31
//! falls on the 30th in April and on the 28th or 29th in February.

use chrono::{Datelike, Local, NaiveDate, TimeZone};

use crate::models::RecurringTemplate;

/// The day of the month a template's schedule is pinned to.
///
/// The creation fallback is read in local time, the same zone
/// [`Clock::System`](crate::engine::Clock::System) takes "today" from.
pub fn anchor_day(template: &RecurringTemplate) -> u32 {
    anchor_day_in(template, &Local)
}

/// [`anchor_day`] with the creation day read in an explicit time zone
pub fn anchor_day_in<Tz: TimeZone>(template: &RecurringTemplate, tz: &Tz) -> u32 {
    template
        .day_of_month
        .unwrap_or_else(|| template.created_at.with_timezone(tz).day())
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// The anchor day resolved against a specific month
pub fn clamped_date(year: i32, month: u32, anchor: u32) -> Option<NaiveDate> {
    let day = anchor.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Next date the template should generate, or `None` for inactive templates.
///
/// When today is already on or past the anchor day, the next occurrence is
/// in the following month.
pub fn next_due_date(template: &RecurringTemplate, today: NaiveDate) -> Option<NaiveDate> {
    if !template.is_active {
        return None;
    }

    let anchor = anchor_day(template);
    if today.day() < anchor {
        return clamped_date(today.year(), today.month(), anchor);
    }

    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    clamped_date(year, month, anchor)
}

/// Whether the template should generate today.
///
/// Requires the template to be active, not already generated today, and
/// today to be the anchor day clamped to the current month.
pub fn is_due_on(template: &RecurringTemplate, today: NaiveDate) -> bool {
    if !template.is_active || template.last_generated_date == Some(today) {
        return false;
    }

    clamped_date(today.year(), today.month(), anchor_day(template)) == Some(today)
}

/// Filter templates down to the ones due on `today`, preserving order
pub fn due_templates(
    templates: Vec<RecurringTemplate>,
    today: NaiveDate,
) -> Vec<RecurringTemplate> {
    templates
        .into_iter()
        .filter(|t| is_due_on(t, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, Frequency};
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(day_of_month: Option<u32>, created_day: u32) -> RecurringTemplate {
        let created_at = Utc.with_ymd_and_hms(2024, 1, created_day, 12, 0, 0).unwrap();
        RecurringTemplate {
            id: 1,
            plan_id: 1,
            name: "Rent".to_string(),
            amount: 150_000,
            frequency: Frequency::Monthly,
            category: ExpenseCategory::Housing,
            bucket_id: 1,
            currency: None,
            day_of_month,
            is_active: true,
            last_generated_date: None,
            notes: None,
            is_fixed: true,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 1), 31);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_anchor_prefers_explicit_day() {
        assert_eq!(anchor_day(&template(Some(5), 20)), 5);
        assert_eq!(anchor_day(&template(None, 20)), 20);
    }

    #[test]
    fn test_anchor_uses_local_creation_day() {
        // 02:00 UTC on Jan 31 is still 21:00 on Jan 30 at UTC-5
        let mut t = template(None, 1);
        t.created_at = Utc.with_ymd_and_hms(2024, 1, 31, 2, 0, 0).unwrap();

        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(anchor_day_in(&t, &new_york), 30);
        assert_eq!(anchor_day_in(&t, &Utc), 31);

        // 23:00 UTC on Jan 9 is already Jan 10 at UTC+9
        t.created_at = Utc.with_ymd_and_hms(2024, 1, 9, 23, 0, 0).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(anchor_day_in(&t, &tokyo), 10);
    }

    #[test]
    fn test_anchor_matches_local_date_of_creation() {
        let mut t = template(None, 1);
        t.created_at = Utc.with_ymd_and_hms(2024, 1, 31, 2, 0, 0).unwrap();
        let local_date = t.created_at.with_timezone(&Local).date_naive();
        assert_eq!(anchor_day(&t), local_date.day());
        assert!(is_due_on(&t, local_date));

        t.day_of_month = Some(12);
        assert_eq!(anchor_day_in(&t, &FixedOffset::east_opt(14 * 3600).unwrap()), 12);
    }

    #[test]
    fn test_next_due_later_this_month() {
        let t = template(Some(15), 1);
        assert_eq!(next_due_date(&t, date(2024, 3, 10)), Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_next_due_clamps_to_short_month() {
        // April has 30 days
        let t = template(Some(31), 1);
        assert_eq!(next_due_date(&t, date(2024, 4, 5)), Some(date(2024, 4, 30)));
    }

    #[test]
    fn test_next_due_clamps_february() {
        let t = template(Some(31), 1);
        assert_eq!(next_due_date(&t, date(2024, 1, 31)), Some(date(2024, 2, 29)));
        assert_eq!(next_due_date(&t, date(2023, 1, 31)), Some(date(2023, 2, 28)));
    }

    #[test]
    fn test_next_due_on_anchor_day_rolls_to_next_month() {
        let t = template(Some(15), 1);
        assert_eq!(next_due_date(&t, date(2024, 3, 15)), Some(date(2024, 4, 15)));
    }

    #[test]
    fn test_next_due_rolls_over_year() {
        let t = template(Some(10), 1);
        assert_eq!(next_due_date(&t, date(2024, 12, 20)), Some(date(2025, 1, 10)));
    }

    #[test]
    fn test_next_due_uses_creation_day_without_anchor() {
        let t = template(None, 25);
        assert_eq!(next_due_date(&t, date(2024, 6, 1)), Some(date(2024, 6, 25)));
    }

    #[test]
    fn test_next_due_none_when_inactive() {
        let mut t = template(Some(10), 1);
        t.is_active = false;
        assert_eq!(next_due_date(&t, date(2024, 6, 1)), None);
    }

    #[test]
    fn test_is_due_on_anchor_day() {
        let t = template(Some(15), 1);
        assert!(is_due_on(&t, date(2024, 3, 15)));
        assert!(!is_due_on(&t, date(2024, 3, 14)));
        assert!(!is_due_on(&t, date(2024, 3, 16)));
    }

    #[test]
    fn test_is_due_on_clamped_last_day() {
        let t = template(Some(31), 1);
        assert!(is_due_on(&t, date(2024, 4, 30)));
        assert!(is_due_on(&t, date(2024, 2, 29)));
        assert!(!is_due_on(&t, date(2024, 3, 30)));
        assert!(is_due_on(&t, date(2024, 3, 31)));
    }

    #[test]
    fn test_is_due_skips_already_generated_today() {
        let mut t = template(Some(15), 1);
        t.last_generated_date = Some(date(2024, 3, 15));
        assert!(!is_due_on(&t, date(2024, 3, 15)));

        t.last_generated_date = Some(date(2024, 2, 15));
        assert!(is_due_on(&t, date(2024, 3, 15)));
    }

    #[test]
    fn test_is_due_skips_inactive() {
        let mut t = template(Some(15), 1);
        t.is_active = false;
        assert!(!is_due_on(&t, date(2024, 3, 15)));
    }

    #[test]
    fn test_due_templates_filters() {
        let mut inactive = template(Some(15), 1);
        inactive.is_active = false;
        inactive.id = 2;
        let mut other_day = template(Some(3), 1);
        other_day.id = 3;
        let due = due_templates(
            vec![template(Some(15), 1), inactive, other_day],
            date(2024, 3, 15),
        );
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, 1);
    }
}
