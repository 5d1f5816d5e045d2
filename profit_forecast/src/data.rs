//! Daily profit history and its CSV representation

use crate::calendar::{SpecialDayMarker, YearMonth};
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One day of profit with its special-day indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub profit: f64,
    pub is_weekend: bool,
    pub is_holiday: bool,
}

/// Gap-free daily profit history, one record per calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    records: Vec<DailyRecord>,
}

/// Total profit of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub profit: f64,
    pub days: usize,
}

impl HistoricalSeries {
    /// Build a series, checking that dates are consecutive days and that
    /// every profit value is finite
    pub fn new(records: Vec<DailyRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(ForecastError::DataError(
                "Historical series must contain at least one day".to_string(),
            ));
        }

        for pair in records.windows(2) {
            if pair[1].date != pair[0].date + Duration::days(1) {
                return Err(ForecastError::DataError(format!(
                    "Dates must be consecutive days: {} is followed by {}",
                    pair[0].date, pair[1].date
                )));
            }
        }

        if let Some(bad) = records.iter().find(|r| !r.profit.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Profit on {} is not a finite number",
                bad.date
            )));
        }

        Ok(Self { records })
    }

    /// Build a series from consecutive daily values starting at `start`,
    /// flagging each day with `marker`
    pub fn from_values(start: NaiveDate, profits: &[f64], marker: &SpecialDayMarker) -> Result<Self> {
        let records = start
            .iter_days()
            .zip(profits.iter())
            .map(|(date, profit)| {
                let flags = marker.mark(date);
                DailyRecord {
                    date,
                    profit: *profit,
                    is_weekend: flags.is_weekend,
                    is_holiday: flags.is_holiday,
                }
            })
            .collect();

        Self::new(records)
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.records[0].date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    /// Profit values in date order
    pub fn profits(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.profit).collect()
    }

    /// Dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// Sub-series of records `start..end` (end defaults to the full length)
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.records.len());
        if start >= end || end > self.records.len() {
            return Err(ForecastError::DataError(format!(
                "Invalid slice {}..{} of a series with {} days",
                start,
                end,
                self.records.len()
            )));
        }

        Self::new(self.records[start..end].to_vec())
    }

    /// Mean daily profit
    pub fn mean(&self) -> Result<f64> {
        Ok(profit_math::stats::mean(&self.profits())?)
    }

    /// Standard deviation of daily profit
    pub fn std_dev(&self) -> Result<f64> {
        Ok(profit_math::stats::std_dev(&self.profits())?)
    }

    /// Profit summed per calendar month, oldest first. Partial months at
    /// either end are included with their actual day count.
    pub fn monthly_totals(&self) -> Vec<MonthlyTotal> {
        let mut totals: Vec<MonthlyTotal> = Vec::new();
        for record in &self.records {
            let month = YearMonth::containing(record.date);
            match totals.last_mut() {
                Some(last) if last.month == month => {
                    last.profit += record.profit;
                    last.days += 1;
                }
                _ => totals.push(MonthlyTotal {
                    month,
                    profit: record.profit,
                    days: 1,
                }),
            }
        }
        totals
    }

    /// Data frame with `date`, `profit`, `is_weekend`, `is_holiday` and
    /// `control` columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self
            .records
            .iter()
            .map(|r| r.date.format(DATE_FORMAT).to_string())
            .collect();
        let control: Vec<&str> = self
            .records
            .iter()
            .map(|r| {
                crate::calendar::DayFlags {
                    is_weekend: r.is_weekend,
                    is_holiday: r.is_holiday,
                }
                .control_label()
            })
            .collect();

        let df = DataFrame::new(vec![
            Series::new("date", dates),
            Series::new("profit", self.profits()),
            Series::new(
                "is_weekend",
                self.records.iter().map(|r| r.is_weekend).collect::<Vec<bool>>(),
            ),
            Series::new(
                "is_holiday",
                self.records.iter().map(|r| r.is_holiday).collect::<Vec<bool>>(),
            ),
            Series::new("control", control),
        ])?;

        Ok(df)
    }
}

/// Reads and writes daily profit history as CSV
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a series from a CSV file.
    ///
    /// Needs a date column (name containing "date") and a profit column
    /// (name containing "profit"). Missing `is_weekend`/`is_holiday`
    /// columns are derived with `marker`.
    pub fn from_csv<P: AsRef<Path>>(path: P, marker: &SpecialDayMarker) -> Result<HistoricalSeries> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df, marker)
    }

    /// Build a series from a data frame with the columns described in
    /// [`DataLoader::from_csv`]
    pub fn from_dataframe(df: &DataFrame, marker: &SpecialDayMarker) -> Result<HistoricalSeries> {
        let date_column = Self::detect_column(df, "date")?;
        let profit_column = Self::detect_column(df, "profit")?;

        let dates = df
            .column(&date_column)?
            .utf8()?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let raw = value.ok_or_else(|| {
                    ForecastError::DataError(format!("Missing date in row {}", i + 1))
                })?;
                NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
                    ForecastError::DataError(format!("Invalid date '{}' in row {}: {}", raw, i + 1, e))
                })
            })
            .collect::<Result<Vec<NaiveDate>>>()?;

        let profit_series = df.column(&profit_column)?.cast(&DataType::Float64)?;
        let profits = profit_series
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                value.ok_or_else(|| {
                    ForecastError::DataError(format!("Missing profit in row {}", i + 1))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let weekend = Self::optional_flags(df, "is_weekend")?;
        let holiday = Self::optional_flags(df, "is_holiday")?;

        let records = dates
            .iter()
            .zip(profits.iter())
            .enumerate()
            .map(|(i, (date, profit))| {
                let flags = marker.mark(*date);
                DailyRecord {
                    date: *date,
                    profit: *profit,
                    is_weekend: weekend.as_ref().map_or(flags.is_weekend, |w| w[i]),
                    is_holiday: holiday.as_ref().map_or(flags.is_holiday, |h| h[i]),
                }
            })
            .collect();

        HistoricalSeries::new(records)
    }

    /// Write a series to CSV with the columns of
    /// [`HistoricalSeries::to_dataframe`]
    pub fn to_csv<P: AsRef<Path>>(series: &HistoricalSeries, path: P) -> Result<()> {
        let mut df = series.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;
        Ok(())
    }

    /// First column whose lower-cased name contains `needle`
    fn detect_column(df: &DataFrame, needle: &str) -> Result<String> {
        df.get_column_names()
            .iter()
            .find(|name| name.to_lowercase().contains(needle))
            .map(|name| name.to_string())
            .ok_or_else(|| ForecastError::DataError(format!("No {} column found in data", needle)))
    }

    /// Boolean indicator column, if present. Accepts boolean or 0/1 values.
    fn optional_flags(df: &DataFrame, name: &str) -> Result<Option<Vec<bool>>> {
        let column = match df.column(name) {
            Ok(column) => column,
            Err(_) => return Ok(None),
        };

        let flags = column.cast(&DataType::Boolean)?;
        let values = flags
            .bool()?
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect();

        Ok(Some(values))
    }
}
