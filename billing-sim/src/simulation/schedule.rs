//! Monthly advance targets for the simulated year.

use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, Utc};

/// Number of monthly periods the simulation walks through.
pub const SIMULATED_PERIODS: u32 = 12;

/// Period in which the plan upgrade happens.
pub const UPGRADE_PERIOD: u32 = 5;

/// Days after the period start the upgrade is applied (the 15th day).
pub const UPGRADE_DAY_OFFSET: u64 = 14;

/// Where the clock goes for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodTarget {
    pub period: u32,
    pub advance_to: NaiveDate,
    /// Second advance within the period after which the upgrade is applied.
    pub upgrade_at: Option<NaiveDate>,
}

/// `anchor` plus `months`, clamped to the last day of the resulting month
/// instead of spilling into the next one.
pub fn add_months_no_overflow(anchor: NaiveDate, months: u32) -> Option<NaiveDate> {
    anchor.checked_add_months(Months::new(months))
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Targets for periods `1..=SIMULATED_PERIODS` counted from `anchor`.
pub fn monthly_targets(anchor: NaiveDate) -> Vec<PeriodTarget> {
    (1..=SIMULATED_PERIODS)
        .filter_map(|period| {
            let advance_to = add_months_no_overflow(anchor, period)?;
            let upgrade_at = if period == UPGRADE_PERIOD {
                advance_to.checked_add_days(Days::new(UPGRADE_DAY_OFFSET))
            } else {
                None
            };
            Some(PeriodTarget {
                period,
                advance_to,
                upgrade_at,
            })
        })
        .collect()
}
