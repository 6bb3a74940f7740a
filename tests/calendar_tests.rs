use chrono::{Datelike, NaiveDate, Weekday};
use project_planner::calendar::{CalendarError, Holiday, WorkCalendar, WorkCalendarConfig};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn default_calendar_weekends_unavailable() {
    let cal = WorkCalendar::default();
    // 2025-01-04 is a Saturday, 2025-01-05 is a Sunday
    assert!(!cal.is_available(d(2025, 1, 4)));
    assert!(!cal.is_available(d(2025, 1, 5)));
    assert!(cal.is_available(d(2025, 1, 2)));
}

#[test]
fn federal_holidays_are_named() {
    let cal = WorkCalendar::with_year_range(2025, 2026);
    assert_eq!(cal.holiday_name(d(2025, 5, 26)), Some("Memorial Day"));
    assert_eq!(cal.holiday_name(d(2025, 11, 27)), Some("Thanksgiving Day"));
    assert_eq!(cal.holiday_name(d(2026, 9, 7)), Some("Labor Day"));
    assert_eq!(cal.holiday_name(d(2026, 1, 19)), Some("Martin Luther King Jr. Day"));
    assert!(!cal.is_available(d(2025, 7, 4)));
}

#[test]
fn next_available_skips_weekend() {
    let cal = WorkCalendar::default();
    let next = cal.next_available(d(2025, 1, 3)).unwrap();
    assert_eq!(next.weekday(), Weekday::Mon);
    assert_eq!(next, d(2025, 1, 6));
}

#[test]
fn find_next_available_counts_only_workdays() {
    let cal = WorkCalendar::default();
    let four_ahead = cal.find_next_available(d(2025, 1, 6), 4).unwrap();
    assert_eq!(four_ahead, d(2025, 1, 10));
    assert_eq!(cal.find_next_available(d(2025, 1, 6), 0), Ok(d(2025, 1, 6)));
}

#[test]
fn find_next_available_past_the_last_date_is_an_error() {
    let cal = WorkCalendar::continuous();
    let from = d(2025, 1, 6);
    assert_eq!(
        cal.find_next_available(from, 125_000_000_000),
        Err(CalendarError::DateOutOfRange {
            from,
            days: 125_000_000_000
        })
    );
    let near_end = NaiveDate::MAX.pred_opt().unwrap();
    assert!(cal.find_next_available(near_end, 1).is_ok());
    assert!(cal.find_next_available(near_end, 2).is_err());
    assert_eq!(cal.next_available(NaiveDate::MAX), None);
}

#[test]
fn find_prev_available_walks_back_over_holidays() {
    let cal = WorkCalendar::default();
    // Back from Monday 2025-01-06: Fri 3rd, Thu 2nd, then 1st is New Year's Day
    assert_eq!(cal.find_prev_available(d(2025, 1, 6), 2), Ok(d(2025, 1, 2)));
    assert_eq!(cal.find_prev_available(d(2025, 1, 6), 3), Ok(d(2024, 12, 31)));
    assert_eq!(cal.prev_available(d(2025, 1, 6)), Some(d(2025, 1, 3)));
    assert!(cal.find_prev_available(NaiveDate::MIN, 1).is_err());
}

#[test]
fn count_available_days_is_inclusive() {
    let cal = WorkCalendar::default();
    assert_eq!(cal.count_available_days(d(2025, 1, 6), d(2025, 1, 10)), 5);
    assert_eq!(cal.count_available_days(d(2025, 1, 10), d(2025, 1, 6)), 0);
}

#[test]
fn custom_calendar_round_trips_through_config() {
    let cal = WorkCalendar::custom(
        [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu],
        [Holiday::new(d(2025, 3, 4), "Site shutdown")],
    )
    .unwrap();
    assert!(!cal.is_available(d(2025, 3, 7)));
    assert!(!cal.is_available(d(2025, 3, 4)));

    let config = cal.to_config();
    assert_eq!(config.working_days().len(), 4);
    assert_eq!(config.holidays(), &[Holiday::new(d(2025, 3, 4), "Site shutdown")]);
    assert_eq!(WorkCalendar::from_config(&config).unwrap(), cal);
}

#[test]
fn calendar_needs_a_working_day() {
    assert_eq!(
        WorkCalendarConfig::new([], []).unwrap_err(),
        CalendarError::NoWorkingDays
    );
    let mut cal = WorkCalendar::continuous();
    assert_eq!(cal.set_working_days(&[]), Err(CalendarError::NoWorkingDays));
}

#[test]
fn recurring_and_removed_holidays() {
    let mut cal = WorkCalendar::continuous();
    cal.add_recurring_holiday(12, 24, "Christmas Eve", 2025, 2027);
    assert_eq!(cal.holidays_in_range(d(2025, 1, 1), d(2027, 12, 31)).len(), 3);
    assert!(cal.remove_holiday(d(2026, 12, 24)));
    assert!(cal.is_available(d(2026, 12, 24)));
    assert!(!cal.remove_holiday(d(2026, 12, 24)));
}

#[test]
fn six_day_week() {
    let mut cal = WorkCalendar::continuous();
    cal.set_working_days(&[
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ])
    .unwrap();
    assert!(cal.is_available(d(2025, 1, 4)));
    assert!(!cal.is_available(d(2025, 1, 5)));
}

#[test]
fn calendar_config_serializes_as_json() {
    let config = WorkCalendar::continuous().to_config();
    let json = serde_json::to_string(&config).unwrap();
    let back: WorkCalendarConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
