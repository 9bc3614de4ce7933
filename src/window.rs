use chrono::{Datelike, Duration, NaiveDate};

/// Number of weeks the roster is kept populated for.
pub const DEFAULT_WINDOW_WEEKS: usize = 52;

/// Days from `today` to the next Friday, inclusive: 0 when `today` is a Friday.
///
/// Weekdays are counted from Monday (Mon=0 .. Sun=6, Friday=4), so the offset
/// is `(4 - weekday) mod 7`.
pub fn next_friday_offset(today: NaiveDate) -> i64 {
    (4 - today.weekday().num_days_from_monday() as i64).rem_euclid(7)
}

/// The rolling window of upcoming Fridays: `weeks` dates spaced exactly seven
/// days apart, starting at the first Friday on or after `today`.
pub fn upcoming_fridays(today: NaiveDate, weeks: usize) -> Vec<NaiveDate> {
    let first = today + Duration::days(next_friday_offset(today));
    (0..weeks)
        .map(|week| first + Duration::days(7 * week as i64))
        .collect()
}
