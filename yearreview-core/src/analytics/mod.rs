//! Analytics module for yearreview
//!
//! Derived temporal statistics over an aggregated timeline:
//! - Streaks (current / longest / distinct active days)
//! - Report periods (year or month)
//! - Per-day activity with weekly and monthly rollups

pub mod activity;
pub mod period;
pub mod streaks;

pub use activity::{ActivityCalendar, DayActivity, MonthBucket, WeekBucket, WEEKS_PER_YEAR};
pub use period::{month_name, ReportPeriod};
pub use streaks::{active_dates, calculate_streaks, streaks_from_dates};
