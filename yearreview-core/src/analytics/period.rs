//! Report periods.

use chrono::{Datelike, Local, NaiveDate};

/// Time period a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    /// Full year (e.g., 2024)
    Year(i32),
    /// Specific month (year, month 1-12)
    Month(i32, u32),
}

impl ReportPeriod {
    /// First day of this period.
    ///
    /// Falls back to January 1st for an out-of-range month.
    pub fn start(&self) -> NaiveDate {
        match self {
            ReportPeriod::Year(year) => first_of_month(*year, 1),
            ReportPeriod::Month(year, month) => first_of_month(*year, *month),
        }
    }

    /// First day after this period (exclusive end).
    pub fn end(&self) -> NaiveDate {
        match self {
            ReportPeriod::Year(year) => first_of_month(*year + 1, 1),
            ReportPeriod::Month(year, month) => {
                let (next_year, next_month) = if *month >= 12 {
                    (*year + 1, 1)
                } else {
                    (*year, *month + 1)
                };
                first_of_month(next_year, next_month)
            }
        }
    }

    /// Every date of the period, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end();
        self.start().iter_days().take_while(move |d| *d < end)
    }

    /// Calendar year the period belongs to.
    pub fn year(&self) -> i32 {
        match self {
            ReportPeriod::Year(year) | ReportPeriod::Month(year, _) => *year,
        }
    }

    /// Get display name for this period.
    pub fn display_name(&self) -> String {
        match self {
            ReportPeriod::Year(year) => format!("{}", year),
            ReportPeriod::Month(year, month) => {
                format!("{} {}", month_name(*month), year)
            }
        }
    }

    /// Create a period for the current year.
    pub fn current_year() -> Self {
        ReportPeriod::Year(Local::now().year())
    }
}

/// Full English month name (1-12).
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1)
        .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
        .unwrap_or(NaiveDate::MIN)
}
