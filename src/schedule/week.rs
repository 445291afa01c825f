use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Computed parity of a teaching week. Distinct from
/// models::WeekParity, which is the selector stored on entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Odd,
    Even,
}

/// Day of week with Monday=1 .. Sunday=7.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = u64::from(day_of_week(date)) - 1;
    date - Days::new(back)
}

/// Parity relative to the Monday starting the first odd week. An even
/// number of whole weeks from the anchor keeps the anchor's parity.
pub fn week_parity(date: NaiveDate, odd_week_start: NaiveDate) -> Parity {
    let offset = (monday_of(date) - monday_of(odd_week_start)).num_days() / 7;
    if offset.rem_euclid(2) == 0 {
        Parity::Odd
    } else {
        Parity::Even
    }
}

/// 1-based teaching week number. Non-positive for dates before the
/// semester start; callers treat those as "not a teaching week".
pub fn week_number(date: NaiveDate, semester_start: NaiveDate) -> i64 {
    let days = (monday_of(date) - monday_of(semester_start)).num_days();
    days.div_euclid(7) + 1
}
