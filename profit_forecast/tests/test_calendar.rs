use chrono::{NaiveDate, Weekday};
use profit_forecast::calendar::{HolidayCalendar, SpecialDayMarker, YearMonth};
use rstest::rstest;

#[rstest]
#[case(2023, 1, 1, true, true)] // Sunday, New Year's Day
#[case(2023, 7, 4, false, true)] // Tuesday, Independence Day
#[case(2023, 7, 9, true, false)] // Sunday
#[case(2023, 7, 8, false, false)] // Saturday is a working day by default
fn test_default_marker(
    #[case] y: i32,
    #[case] m: u32,
    #[case] d: u32,
    #[case] weekend: bool,
    #[case] holiday: bool,
) {
    let marker = SpecialDayMarker::default();
    let flags = marker.mark(NaiveDate::from_ymd_opt(y, m, d).unwrap());
    assert_eq!(flags.is_weekend, weekend);
    assert_eq!(flags.is_holiday, holiday);
}

#[test]
fn test_marking_is_deterministic() {
    let marker = SpecialDayMarker::default();
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let first: Vec<_> = start.iter_days().take(800).map(|d| marker.mark(d)).collect();
    let second: Vec<_> = start.iter_days().take(800).map(|d| marker.mark(d)).collect();
    assert_eq!(first, second);
}

#[test]
fn test_working_days_with_custom_weekend() {
    let marker = SpecialDayMarker::new(vec![Weekday::Sat, Weekday::Sun], HolidayCalendar::official());
    // July 2023: 31 days, 10 weekend days, July 4th
    let july = YearMonth::new(2023, 7).unwrap();
    assert_eq!(marker.working_days(july).len(), 20);
}

#[test]
fn test_control_labels() {
    let marker = SpecialDayMarker::default();
    let label = |y, m, d| marker.mark(NaiveDate::from_ymd_opt(y, m, d).unwrap()).control_label();
    assert_eq!(label(2023, 1, 1), "Official Holiday");
    assert_eq!(label(2023, 1, 8), "Sunday");
    assert_eq!(label(2023, 1, 9), "");
}
