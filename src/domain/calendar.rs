//! Calendar-month period keys.

use chrono::{Datelike, NaiveDate};

/// Months are keyed by `(year, month)`.
pub type MonthKey = (i32, u32);

pub fn month_key(date: NaiveDate) -> MonthKey {
    (date.year(), date.month())
}

pub fn previous_month((year, month): MonthKey) -> MonthKey {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = month_key(date);
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_end_regular_months() {
        assert_eq!(month_end(d(2024, 1, 1)), d(2024, 1, 31));
        assert_eq!(month_end(d(2024, 4, 15)), d(2024, 4, 30));
        assert_eq!(month_end(d(2024, 12, 31)), d(2024, 12, 31));
    }

    #[test]
    fn month_end_february() {
        assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 2, 10)), d(2023, 2, 28));
        assert_eq!(month_end(d(1900, 2, 1)), d(1900, 2, 28));
    }

    #[test]
    fn month_end_is_idempotent() {
        let end = month_end(d(2021, 7, 3));
        assert_eq!(month_end(end), end);
    }

    #[test]
    fn weekend_month_end_maps_from_last_trading_day() {
        // 2024-03-31 is a Sunday; the last trading day is Friday the 29th.
        assert_eq!(month_end(d(2024, 3, 29)), d(2024, 3, 31));
    }

    #[test]
    fn previous_month_wraps_year() {
        assert_eq!(previous_month((2024, 1)), (2023, 12));
        assert_eq!(previous_month((2024, 7)), (2024, 6));
    }
}
