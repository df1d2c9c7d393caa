//! # Bath History
//!
//! Pure functions over a pet's bath history: finding the latest bath and
//! deriving the schedule snapshot shown next to the selected pet.
//!
//! ## Day Arithmetic
//!
//! Day counts are whole days, truncated toward zero (`Duration::num_days`).
//! When a pet has history, the days until the next bath carry an inclusive
//! one-day adjustment: a bath due exactly now reads as 1 day remaining.

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::pet::{BathRecord, Pet};

/// Derived schedule state for one pet at one point in time. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSnapshot {
    /// Whether the pet has at least one registered bath
    pub has_history: bool,
    /// Date of the latest bath
    pub last_bath_date: Option<DateTime<Utc>>,
    /// Whole days elapsed since the latest bath
    pub days_passed: Option<i64>,
    /// When the next bath is due
    pub next_bath_date: DateTime<Utc>,
    /// Days left until the next bath; negative when overdue
    pub days_until_next: i64,
}

impl ScheduleSnapshot {
    pub fn is_overdue(&self) -> bool {
        self.days_until_next < 0
    }

    /// Due within a day either side of now.
    ///
    /// With the inclusive adjustment a count of 1 covers that window, and 0
    /// already means one to two days late even though it is not negative.
    pub fn is_due_today(&self) -> bool {
        self.days_until_next == 1
    }
}

/// Find the bath with the greatest date.
///
/// Ties keep the first record that reached the maximum.
pub fn compute_latest(records: &[BathRecord]) -> Option<&BathRecord> {
    records.iter().fold(None, |latest, record| match latest {
        Some(best) if record.date <= best.date => Some(best),
        _ => Some(record),
    })
}

/// `date + days`, clamped to the latest representable date
fn add_days(date: DateTime<Utc>, days: Duration) -> DateTime<Utc> {
    date.checked_add_signed(days).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Compute the schedule snapshot for `pet` as seen at `now`.
pub fn compute_schedule(pet: &Pet, now: DateTime<Utc>) -> ScheduleSnapshot {
    let periodicity = Duration::days(i64::from(pet.bath_periodicity));

    match compute_latest(&pet.baths) {
        None => ScheduleSnapshot {
            has_history: false,
            last_bath_date: None,
            days_passed: None,
            next_bath_date: add_days(now, periodicity),
            days_until_next: periodicity.num_days(),
        },
        Some(latest) => {
            let last_bath_date = latest.date;
            let next_bath_date = add_days(last_bath_date, periodicity);
            ScheduleSnapshot {
                has_history: true,
                last_bath_date: Some(last_bath_date),
                days_passed: Some((now - last_bath_date).num_days()),
                next_bath_date,
                days_until_next: (next_bath_date - now).num_days() + 1,
            }
        }
    }
}
