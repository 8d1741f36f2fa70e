//! Tests for the clock abstraction

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use core_kernel::{Clock, FixedClock, SystemClock};

#[test]
fn test_fixed_clock_is_stable() {
    let instant = Utc.with_ymd_and_hms(2024, 6, 15, 13, 45, 0).unwrap();
    let clock = FixedClock::new(instant);

    assert_eq!(clock.now(), instant);
    assert_eq!(clock.now(), clock.now());
    assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
}

#[test]
fn test_fixed_clock_on_date_is_midnight() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let clock = FixedClock::on(date);

    assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
}

#[test]
fn test_system_clock_tracks_wall_time() {
    let before = Utc::now();
    let now = SystemClock.now();
    let after = Utc::now();

    assert!(now >= before - Duration::seconds(1));
    assert!(now <= after + Duration::seconds(1));
}

#[test]
fn test_clock_is_object_safe() {
    let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(date));
    assert_eq!(clock.today(), date);
}
