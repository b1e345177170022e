use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::OrderId;

pub type SubscriptionId = i64;

/// Length of a subscription "month". Subscriptions do not follow the calendar.
pub const DAYS_PER_MONTH: u64 = 30;

/// Subscription length used when none is given.
pub const DEFAULT_SUBSCRIPTION_MONTHS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub order_id: OrderId,
    pub start_date: NaiveDate,
    /// Computed once from `start_date` when the subscription is created
    pub end_date: NaiveDate,
    /// False once cancelled. Reaching `end_date` does not clear it.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub order_id: OrderId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewSubscription {
    pub fn new(order_id: OrderId, start_date: NaiveDate, months: u32) -> Self {
        Self {
            order_id,
            start_date,
            end_date: subscription_end_date(start_date, months),
        }
    }
}

/// End date of a subscription starting on `start` and lasting `months` 30-day months.
pub fn subscription_end_date(start: NaiveDate, months: u32) -> NaiveDate {
    let days = DAYS_PER_MONTH * u64::from(months);
    start.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_one_month_is_thirty_days() {
        assert_eq!(
            subscription_end_date(date("2024-01-01"), 1),
            date("2024-01-31")
        );
    }

    #[test]
    fn test_three_months_is_ninety_days() {
        let start = date("2024-01-15");
        let end = subscription_end_date(start, 3);
        assert_eq!((end - start).num_days(), 90);
        assert_eq!(end, date("2024-04-14"));
    }

    #[test]
    fn test_months_ignore_calendar_length() {
        // February is not special
        assert_eq!(
            subscription_end_date(date("2023-02-01"), 1),
            date("2023-03-03")
        );
    }

    #[test]
    fn test_zero_months_ends_on_start() {
        let start = date("2024-06-01");
        assert_eq!(subscription_end_date(start, 0), start);
    }

    #[test]
    fn test_new_subscription_computes_end_date() {
        let sub = NewSubscription::new(7, date("2024-12-01"), 2);
        assert_eq!(sub.order_id, 7);
        assert_eq!(sub.end_date, date("2025-01-30"));
    }
}
