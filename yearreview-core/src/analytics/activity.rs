//! Per-day activity and weekly/monthly rollups for a report year.
//!
//! Weeks are counted from January 1st of the report year (week 1 is days
//! 0-6), not ISO weeks. Only weeks 1-52 are reported; the trailing one or
//! two days of a year fall outside every bucket.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::period::ReportPeriod;
use crate::types::Event;

/// Weeks shown in a yearly rollup
pub const WEEKS_PER_YEAR: u32 = 52;

/// Activity observed on one calendar date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayActivity {
    pub events: u64,
    pub sources: BTreeSet<String>,
}

/// One week of a yearly rollup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    /// 1-based week number
    pub week: u32,
    pub events: u64,
    pub sources: BTreeSet<String>,
    /// Tokens attributed to the week by its share of events
    pub estimated_tokens: u64,
}

/// One month of a yearly rollup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// 1-12
    pub month: u32,
    pub active_days: u64,
    pub events: u64,
}

/// Events grouped by calendar date.
#[derive(Debug, Clone, Default)]
pub struct ActivityCalendar {
    days: BTreeMap<NaiveDate, DayActivity>,
}

impl ActivityCalendar {
    /// Build a calendar from (already relabeled) events.
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut days: BTreeMap<NaiveDate, DayActivity> = BTreeMap::new();
        for event in events {
            let day = days.entry(event.date()).or_default();
            day.events += 1;
            if !day.sources.contains(&event.source) {
                day.sources.insert(event.source.clone());
            }
        }
        Self { days }
    }

    /// Activity on a date, if any.
    pub fn day(&self, date: NaiveDate) -> Option<&DayActivity> {
        self.days.get(&date)
    }

    /// Event count on a date.
    pub fn events_on(&self, date: NaiveDate) -> u64 {
        self.days.get(&date).map(|d| d.events).unwrap_or(0)
    }

    /// Busiest single day's event count (at least 1, for scaling).
    pub fn max_daily_events(&self) -> u64 {
        self.days.values().map(|d| d.events).max().unwrap_or(1).max(1)
    }

    /// Number of active dates.
    pub fn active_days(&self) -> usize {
        self.days.len()
    }

    /// Weekly rollup for `year`.
    ///
    /// Tokens are not tracked per event, so each week is credited with
    /// `events * total_tokens / total_events`.
    pub fn weekly_rollup(
        &self,
        year: i32,
        total_tokens: u64,
        total_events: u64,
    ) -> Vec<WeekBucket> {
        let year_start = ReportPeriod::Year(year).start();
        let mut weeks: Vec<WeekBucket> = (1..=WEEKS_PER_YEAR)
            .map(|week| WeekBucket {
                week,
                ..Default::default()
            })
            .collect();

        for (date, activity) in &self.days {
            let offset = (*date - year_start).num_days();
            if offset < 0 {
                continue;
            }
            let week = offset / 7 + 1;
            if week > WEEKS_PER_YEAR as i64 {
                continue;
            }
            let bucket = &mut weeks[(week - 1) as usize];
            bucket.events += activity.events;
            bucket.sources.extend(activity.sources.iter().cloned());
        }

        if total_events > 0 {
            let per_event = total_tokens as f64 / total_events as f64;
            for bucket in &mut weeks {
                bucket.estimated_tokens = (bucket.events as f64 * per_event) as u64;
            }
        }

        weeks
    }

    /// Monthly rollup for `year`, always twelve buckets.
    pub fn monthly_rollup(&self, year: i32) -> Vec<MonthBucket> {
        let mut months: Vec<MonthBucket> = (1..=12)
            .map(|month| MonthBucket {
                month,
                ..Default::default()
            })
            .collect();

        let period = ReportPeriod::Year(year);
        for (date, activity) in self.days.range(period.start()..period.end()) {
            let bucket = &mut months[date.month0() as usize];
            bucket.active_days += 1;
            bucket.events += activity.events;
        }

        months
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tool;

    fn event(date: &str, source: &str) -> Event {
        let ts = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Event::new(ts, source, Tool::ClaudeCode)
    }

    #[test]
    fn test_calendar_counts_and_sources() {
        let events = vec![
            event("2024-01-01", "a"),
            event("2024-01-01", "b"),
            event("2024-01-01", "a"),
            event("2024-01-05", "b"),
        ];
        let cal = ActivityCalendar::from_events(&events);
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        assert_eq!(cal.events_on(jan1), 3);
        assert_eq!(cal.day(jan1).unwrap().sources.len(), 2);
        assert_eq!(cal.active_days(), 2);
        assert_eq!(cal.max_daily_events(), 3);
        assert_eq!(ActivityCalendar::default().max_daily_events(), 1);
    }

    #[test]
    fn test_weekly_rollup() {
        let events = vec![
            event("2023-12-31", "a"), // previous year, ignored
            event("2024-01-01", "a"),
            event("2024-01-07", "b"),
            event("2024-01-08", "a"),
            event("2024-12-30", "a"), // day 364 -> week 53, ignored
        ];
        let cal = ActivityCalendar::from_events(&events);
        let weeks = cal.weekly_rollup(2024, 500, 5);

        assert_eq!(weeks.len(), 52);
        assert_eq!(weeks[0].week, 1);
        assert_eq!(weeks[0].events, 2);
        assert_eq!(weeks[0].sources.len(), 2);
        assert_eq!(weeks[0].estimated_tokens, 200);
        assert_eq!(weeks[1].events, 1);
        assert_eq!(weeks[1].estimated_tokens, 100);
        assert_eq!(weeks.iter().map(|w| w.events).sum::<u64>(), 3);
    }

    #[test]
    fn test_weekly_rollup_without_events() {
        let weeks = ActivityCalendar::default().weekly_rollup(2024, 1000, 0);
        assert!(weeks.iter().all(|w| w.estimated_tokens == 0));
    }

    #[test]
    fn test_monthly_rollup() {
        let events = vec![
            event("2024-01-01", "a"),
            event("2024-01-01", "a"),
            event("2024-01-31", "a"),
            event("2024-12-31", "b"),
            event("2025-01-01", "b"),
        ];
        let cal = ActivityCalendar::from_events(&events);
        let months = cal.monthly_rollup(2024);

        assert_eq!(months.len(), 12);
        assert_eq!(months[0].active_days, 2);
        assert_eq!(months[0].events, 3);
        assert_eq!(months[11].active_days, 1);
        assert_eq!(months[5].events, 0);
    }
}
