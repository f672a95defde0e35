//! Overdue fine policy
//!
//! Converts overdue duration into a monetary penalty using the library's
//! tier schedule: a flat amount for every full overdue day, a first-hour
//! charge when the partial day holds at least one full hour, and a
//! surcharge for each partial-day hour after the first, with the partial
//! day capped at the daily rate. The schedule is a monotonic step function
//! over whole hours; minutes past the hour never charge.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::FinesConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct FinePolicy {
    daily_rate: Decimal,
    first_hour_rate: Decimal,
    succeeding_hour_rate: Decimal,
}

impl FinePolicy {
    pub fn new(config: &FinesConfig) -> Self {
        Self {
            daily_rate: config.daily_rate,
            first_hour_rate: config.first_hour_rate,
            succeeding_hour_rate: config.succeeding_hour_rate,
        }
    }

    /// Reference schedule: 25.00 per full day, 10.00 for the first
    /// partial-day hour, 5.00 for each additional hour.
    pub fn standard() -> Self {
        Self::new(&FinesConfig::default())
    }

    /// Fine owed at `now` for a loan due at `due_at`. Zero when not overdue.
    ///
    /// Elapsed time is truncated to whole minutes, then whole hours; full
    /// days charge `daily_rate`, the remaining hours charge the hour tiers.
    /// The partial-day charge never exceeds `daily_rate`, so a partial day
    /// is never dearer than the full day it is about to become.
    pub fn compute(&self, due_at: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
        if now <= due_at {
            return Decimal::ZERO;
        }

        let total_hours = (now - due_at).num_minutes() / 60;
        let days = total_hours / 24;
        let remainder_hours = total_hours % 24;

        let mut amount = self.daily_rate * Decimal::from(days);
        if remainder_hours > 0 {
            let mut partial = self.first_hour_rate;
            if remainder_hours > 1 {
                partial += self.succeeding_hour_rate * Decimal::from(remainder_hours - 1);
            }
            amount += partial.min(self.daily_rate);
        }

        amount.round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 17, 0, 0).unwrap()
    }

    fn fine_after(overdue: Duration) -> Decimal {
        FinePolicy::standard().compute(due(), due() + overdue)
    }

    #[test]
    fn test_no_fine_at_or_before_due() {
        assert_eq!(fine_after(Duration::zero()), Decimal::ZERO);
        assert_eq!(fine_after(Duration::hours(-5)), Decimal::ZERO);
    }

    #[test]
    fn test_minutes_below_an_hour_are_free() {
        assert_eq!(fine_after(Duration::minutes(30)), Decimal::ZERO);
        assert_eq!(fine_after(Duration::minutes(59)), Decimal::ZERO);
    }

    #[test]
    fn test_first_hour_tier() {
        assert_eq!(fine_after(Duration::minutes(60)), Decimal::new(1000, 2));
        assert_eq!(fine_after(Duration::minutes(90)), Decimal::new(1000, 2));
    }

    #[test]
    fn test_succeeding_hours_tier() {
        // 10.00 + 2 * 5.00
        assert_eq!(fine_after(Duration::hours(3)), Decimal::new(2000, 2));
    }

    #[test]
    fn test_partial_day_capped_at_daily_rate() {
        // 10.00 + 3 * 5.00 = 25.00 hits the cap at four hours
        assert_eq!(fine_after(Duration::hours(4)), Decimal::new(2500, 2));
        // Later partial-day hours stay at the cap instead of outgrowing it
        assert_eq!(fine_after(Duration::hours(23)), Decimal::new(2500, 2));
        assert_eq!(fine_after(Duration::hours(24)), Decimal::new(2500, 2));
    }

    #[test]
    fn test_full_day_plus_one_hour() {
        // 25.00 + 10.00
        assert_eq!(fine_after(Duration::hours(25)), Decimal::new(3500, 2));
    }

    #[test]
    fn test_two_full_days_exact() {
        assert_eq!(fine_after(Duration::hours(48)), Decimal::new(5000, 2));
    }

    #[test]
    fn test_two_days_and_an_hour() {
        assert_eq!(fine_after(Duration::hours(49)), Decimal::new(6000, 2));
    }

    #[test]
    fn test_monotonic_over_increasing_now() {
        let policy = FinePolicy::standard();
        let mut previous = Decimal::ZERO;
        for minutes in (0..=72 * 60).step_by(17) {
            let amount = policy.compute(due(), due() + Duration::minutes(minutes as i64));
            assert!(amount >= previous, "fine decreased at {} minutes", minutes);
            previous = amount;
        }
    }

    #[test]
    fn test_custom_rates() {
        let policy = FinePolicy::new(&FinesConfig {
            daily_rate: Decimal::new(1000, 2),
            first_hour_rate: Decimal::new(200, 2),
            succeeding_hour_rate: Decimal::new(100, 2),
        });
        // one day + 3 hours: 10.00 + 2.00 + 2 * 1.00
        let amount = policy.compute(due(), due() + Duration::hours(27));
        assert_eq!(amount, Decimal::new(1400, 2));
    }
}
