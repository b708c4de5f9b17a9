//! Streak calculation over active calendar dates.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

use crate::types::StreakInfo;

/// Distinct calendar dates of the given timestamps, ascending.
pub fn active_dates<I>(timestamps: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    timestamps
        .into_iter()
        .map(|ts| ts.date())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Compute streaks from timestamps, relative to `today`.
///
/// The current streak survives a one-day gap at the end, since today may
/// simply not have any activity yet.
pub fn calculate_streaks<I>(timestamps: I, today: NaiveDate) -> StreakInfo
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    streaks_from_dates(&active_dates(timestamps), today)
}

/// Compute streaks from sorted, distinct dates.
pub fn streaks_from_dates(dates: &[NaiveDate], today: NaiveDate) -> StreakInfo {
    let Some(&last) = dates.last() else {
        return StreakInfo::default();
    };

    let mut longest = 1u64;
    let mut run = 1u64;
    for pair in dates.windows(2) {
        if is_next_day(pair[0], pair[1]) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    let current = if last >= today - chrono::Duration::days(1) {
        1 + dates
            .windows(2)
            .rev()
            .take_while(|pair| is_next_day(pair[0], pair[1]))
            .count() as u64
    } else {
        0
    };

    StreakInfo {
        current_streak: current,
        longest_streak: longest,
        total_days: dates.len() as u64,
    }
}

fn is_next_day(earlier: NaiveDate, later: NaiveDate) -> bool {
    (later - earlier).num_days() == 1
}
