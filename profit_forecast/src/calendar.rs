//! Calendar helpers: months, weekends, holidays and working days
//!
//! [`SpecialDayMarker`] is the single source of the weekend and holiday
//! indicators. The dataset generator, the model's exogenous columns and the
//! forecast service all ask it, so a date is classified the same way in
//! history and in the future.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month of a specific year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// Create a year-month, validating the month number (1-12)
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| {
                ForecastError::ValidationError(format!("Invalid month {}-{:02}", year, month))
            })
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date - Duration::days(i64::from(date.day0())),
        }
    }

    /// Next occurrence of calendar month `month` strictly after the month
    /// containing `reference`
    pub fn next_occurrence(month: u32, reference: NaiveDate) -> Result<Self> {
        let current = Self::containing(reference);
        let candidate = Self::new(current.year(), month)?;
        if candidate > current {
            Ok(candidate)
        } else {
            Self::new(current.year() + 1, month)
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// English name of the month
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.first_day.month0() as usize]
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        // Only the last month chrono can represent has no successor
        self.next()
            .map(|next| next.first_day - Duration::days(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Every date of the month in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.first_day
            .iter_days()
            .take(self.days_in_month() as usize)
            .collect()
    }

    /// The following month, `None` past the end of the supported calendar
    pub fn next(&self) -> Option<Self> {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|first_day| Self { first_day })
    }

    /// Signed number of months from `self` to `other`
    pub fn months_until(&self, other: &YearMonth) -> i32 {
        (other.year() - self.year()) * 12 + other.month() as i32 - self.month() as i32
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = ForecastError;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            ForecastError::ValidationError(format!("Invalid month '{}', expected YYYY-MM", s))
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Month number (1-12) for an English month name or its three-letter
/// abbreviation, case-insensitive
pub fn parse_month_name(name: &str) -> Result<u32> {
    let needle = name.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|m| {
            let m = m.to_lowercase();
            m == needle || (needle.len() == 3 && m.starts_with(&needle))
        })
        .map(|i| i as u32 + 1)
        .ok_or_else(|| ForecastError::ValidationError(format!("Unknown month name '{}'", name)))
}

/// Official holidays, either recurring every year or on fixed dates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    recurring: BTreeSet<(u32, u32)>,
    fixed: BTreeSet<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct HolidayRow {
    date: String,
}

impl HolidayCalendar {
    /// Calendar without any holiday
    pub fn empty() -> Self {
        Self::default()
    }

    /// New Year's Day and the Fourth of July, every year
    pub fn official() -> Self {
        Self {
            recurring: BTreeSet::from([(1, 1), (7, 4)]),
            fixed: BTreeSet::new(),
        }
    }

    /// Add a holiday that repeats every year on `month`/`day`
    pub fn with_recurring(mut self, month: u32, day: u32) -> Result<Self> {
        // 2000 is a leap year, so February 29 is accepted
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(ForecastError::InvalidParameter(format!(
                "Invalid recurring holiday {:02}-{:02}",
                month, day
            )));
        }
        self.recurring.insert((month, day));
        Ok(self)
    }

    /// Add a one-off holiday
    pub fn with_fixed(mut self, date: NaiveDate) -> Self {
        self.fixed.insert(date);
        self
    }

    /// Load holidays from a CSV file with a `date` column holding either
    /// `MM-DD` (recurring) or `YYYY-MM-DD` (one-off) values
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut calendar = Self::empty();

        for row in reader.deserialize() {
            let row: HolidayRow = row?;
            let raw = row.date.trim();
            calendar = match raw.len() {
                5 => {
                    let (month, day) = raw.split_once('-').ok_or_else(|| {
                        ForecastError::DataError(format!("Invalid holiday date '{}'", raw))
                    })?;
                    let month = month.parse().map_err(|_| {
                        ForecastError::DataError(format!("Invalid holiday month in '{}'", raw))
                    })?;
                    let day = day.parse().map_err(|_| {
                        ForecastError::DataError(format!("Invalid holiday day in '{}'", raw))
                    })?;
                    calendar.with_recurring(month, day)?
                }
                _ => {
                    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                        ForecastError::DataError(format!("Invalid holiday date '{}': {}", raw, e))
                    })?;
                    calendar.with_fixed(date)
                }
            };
        }

        Ok(calendar)
    }

    /// Whether `date` is a holiday
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.fixed.contains(&date) || self.recurring.contains(&(date.month(), date.day()))
    }

    pub fn is_empty(&self) -> bool {
        self.recurring.is_empty() && self.fixed.is_empty()
    }
}

/// Weekend and holiday indicators for one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFlags {
    pub is_weekend: bool,
    pub is_holiday: bool,
}

impl DayFlags {
    /// Neither weekend nor holiday
    pub fn is_working_day(&self) -> bool {
        !self.is_weekend && !self.is_holiday
    }

    /// Label used in the dataset's `control` column
    pub fn control_label(&self) -> &'static str {
        if self.is_holiday {
            "Official Holiday"
        } else if self.is_weekend {
            "Sunday"
        } else {
            ""
        }
    }
}

/// Labels dates as weekend days and official holidays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDayMarker {
    weekend_days: Vec<Weekday>,
    holidays: HolidayCalendar,
}

impl Default for SpecialDayMarker {
    /// Sundays and the official holidays
    fn default() -> Self {
        Self {
            weekend_days: vec![Weekday::Sun],
            holidays: HolidayCalendar::official(),
        }
    }
}

impl SpecialDayMarker {
    pub fn new(weekend_days: Vec<Weekday>, holidays: HolidayCalendar) -> Self {
        Self {
            weekend_days,
            holidays,
        }
    }

    pub fn weekend_days(&self) -> &[Weekday] {
        &self.weekend_days
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend_days.contains(&date.weekday())
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(date)
    }

    /// Both indicators for `date`
    pub fn mark(&self, date: NaiveDate) -> DayFlags {
        DayFlags {
            is_weekend: self.is_weekend(date),
            is_holiday: self.is_holiday(date),
        }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.mark(date).is_working_day()
    }

    /// Working days of `month`, in date order
    pub fn working_days(&self, month: YearMonth) -> Vec<NaiveDate> {
        month
            .dates()
            .into_iter()
            .filter(|d| self.is_working_day(*d))
            .collect()
    }
}
