//! Exogenous regressors: weekend and holiday indicators plus month dummies

use crate::calendar::{DayFlags, SpecialDayMarker};
use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which regressors enter the model and how special days are recognised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExogenousSchema {
    pub weekend: bool,
    pub holiday: bool,
    /// Indicator per month February..December (January is the baseline)
    pub month_dummies: bool,
    marker: SpecialDayMarker,
}

impl Default for ExogenousSchema {
    fn default() -> Self {
        Self::new(SpecialDayMarker::default())
    }
}

impl ExogenousSchema {
    /// All regressors enabled, with `marker` labelling future days
    pub fn new(marker: SpecialDayMarker) -> Self {
        Self {
            weekend: true,
            holiday: true,
            month_dummies: true,
            marker,
        }
    }

    pub fn with_month_dummies(mut self, enabled: bool) -> Self {
        self.month_dummies = enabled;
        self
    }

    pub fn marker(&self) -> &SpecialDayMarker {
        &self.marker
    }

    /// Column names in matrix order
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.weekend {
            names.push("weekend".to_string());
        }
        if self.holiday {
            names.push("holiday".to_string());
        }
        if self.month_dummies {
            names.extend((2..=12).map(|m| format!("month_{}", m)));
        }
        names
    }

    /// Regressor values for one day
    pub fn row(&self, date: NaiveDate, flags: DayFlags) -> Vec<f64> {
        let indicator = |on: bool| if on { 1.0 } else { 0.0 };

        let mut row = Vec::with_capacity(13);
        if self.weekend {
            row.push(indicator(flags.is_weekend));
        }
        if self.holiday {
            row.push(indicator(flags.is_holiday));
        }
        if self.month_dummies {
            row.extend((2..=12).map(|m| indicator(date.month() == m)));
        }
        row
    }

    /// Regressors for the training history, using the flags stored with
    /// each record
    pub fn training_matrix(&self, series: &HistoricalSeries) -> Result<ExogenousMatrix> {
        let rows: Vec<Vec<f64>> = series
            .records()
            .iter()
            .map(|r| {
                self.row(
                    r.date,
                    DayFlags {
                        is_weekend: r.is_weekend,
                        is_holiday: r.is_holiday,
                    },
                )
            })
            .collect();

        ExogenousMatrix::from_rows(self.column_names(), &rows)
    }

    /// Regressors for future dates, labelled with the schema's marker
    pub fn future_matrix(&self, dates: &[NaiveDate]) -> ExogenousMatrix {
        let names = self.column_names();
        let mut columns = vec![Vec::with_capacity(dates.len()); names.len()];
        for date in dates {
            let row = self.row(*date, self.marker.mark(*date));
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        ExogenousMatrix {
            names,
            columns,
            rows: dates.len(),
        }
    }
}

/// Column-major regressor matrix
#[derive(Debug, Clone, PartialEq)]
pub struct ExogenousMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl ExogenousMatrix {
    /// Build from named columns of equal length `rows`
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>, rows: usize) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(ForecastError::ValidationError(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        if let Some((name, column)) = names.iter().zip(columns.iter()).find(|(_, c)| c.len() != rows) {
            return Err(ForecastError::ValidationError(format!(
                "Column '{}' has {} values, expected {}",
                name,
                column.len(),
                rows
            )));
        }

        Ok(Self {
            names,
            columns,
            rows,
        })
    }

    /// Build from row vectors
    pub fn from_rows(names: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let mut columns = vec![Vec::with_capacity(rows.len()); names.len()];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(ForecastError::ValidationError(format!(
                    "Row {} has {} values, expected {}",
                    i,
                    row.len(),
                    names.len()
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(*value);
            }
        }

        Self::new(names, columns, rows.len())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Number of days covered
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Last `n` values of every column
    pub fn tail(&self, n: usize) -> Vec<Vec<f64>> {
        let start = self.rows.saturating_sub(n);
        self.columns.iter().map(|c| c[start..].to_vec()).collect()
    }
}
