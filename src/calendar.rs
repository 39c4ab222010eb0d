//! whole-month date arithmetic for monthly amortization periods

use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{AmortizationError, Result};

/// whole months between `start` and `end`, truncated, never negative.
///
/// A month counts once the day of month is reached again. When `start`
/// falls on a day the target month doesn't have (e.g. the 31st), the last
/// day of that month completes it.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() && !is_last_day_of_month(end) {
        months -= 1;
    }

    months.max(0) as u32
}

/// date `months` after `date`, clamped to the end of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| AmortizationError::InvalidDate {
            message: format!("{} plus {} months is out of range", date, months),
        })
}

pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map(|next| next.month() != date.month()).unwrap_or(true)
}
