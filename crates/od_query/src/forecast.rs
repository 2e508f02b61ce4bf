//! Sales forecast seam.
//!
//! The model itself is an external linear-regression routine (the `linreg`
//! crate); this module only maps date series to day offsets and back. No
//! original curve fitting lives here.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::QueryError;

/// Fitted line over `(day offset, value)` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearModel {
    /// Predicted values at the given x positions.
    #[must_use]
    pub fn predict(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|x| self.slope * x + self.intercept).collect()
    }
}

/// Fit a line to `(x, y)` points.
///
/// # Errors
///
/// Returns [`QueryError::NotEnoughData`] when the regression routine cannot
/// produce a fit (fewer than two points, or zero x variance).
pub fn fit(points: &[(f64, f64)]) -> Result<LinearModel, QueryError> {
    let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
    let ys: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
    let (slope, intercept) = linreg::linear_regression::<f64, f64, f64>(&xs, &ys)
        .map_err(|e| QueryError::NotEnoughData(format!("regression failed: {e}")))?;
    debug!(slope, intercept, points = points.len(), "Fitted forecast model");
    Ok(LinearModel { slope, intercept })
}

/// Forecast `horizon_days` values past the end of a date-sorted series.
///
/// The first date in the series is day 0; predictions land on consecutive
/// days after the last observed date.
///
/// # Errors
///
/// Returns [`QueryError::NotEnoughData`] for an empty series or a failed fit.
pub fn forecast_series(
    series: &[(NaiveDate, f64)],
    horizon_days: u32,
) -> Result<Vec<(NaiveDate, f64)>, QueryError> {
    let first = series
        .first()
        .map(|(date, _)| *date)
        .ok_or_else(|| QueryError::NotEnoughData("empty series".to_string()))?;
    let last = series[series.len() - 1].0;

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(date, value)| ((*date - first).num_days() as f64, *value))
        .collect();
    let model = fit(&points)?;

    let last_offset = (last - first).num_days();
    let future_offsets: Vec<f64> = (1..=i64::from(horizon_days))
        .map(|day| (last_offset + day) as f64)
        .collect();
    let predicted = model.predict(&future_offsets);

    Ok((1..=i64::from(horizon_days))
        .zip(predicted)
        .map(|(day, value)| (last + Duration::days(day), value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    #[test]
    fn test_fit_recovers_perfect_line() {
        let points = [(0.0, 5.0), (1.0, 7.0), (2.0, 9.0)];
        let model = fit(&points).unwrap();
        assert!((model.slope - 2.0).abs() < 1e-9);
        assert!((model.intercept - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict() {
        let model = LinearModel {
            slope: 2.0,
            intercept: 1.0,
        };
        assert_eq!(model.predict(&[0.0, 3.0]), vec![1.0, 7.0]);
    }

    #[test]
    fn test_fit_rejects_too_few_points() {
        assert!(matches!(
            fit(&[(0.0, 1.0)]),
            Err(QueryError::NotEnoughData(_))
        ));
    }

    #[test]
    fn test_forecast_series_extends_linear_trend() {
        let series = vec![(day(1), 10.0), (day(2), 20.0), (day(3), 30.0)];
        let forecast = forecast_series(&series, 2).unwrap();
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[0].0, day(4));
        assert!((forecast[0].1 - 40.0).abs() < 1e-6);
        assert_eq!(forecast[1].0, day(5));
        assert!((forecast[1].1 - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_forecast_series_empty_input() {
        assert!(matches!(
            forecast_series(&[], 7),
            Err(QueryError::NotEnoughData(_))
        ));
    }

    #[test]
    fn test_forecast_series_handles_date_gaps() {
        // Observations on days 0 and 10; the line still fits offsets, not indexes.
        let series = vec![(day(1), 0.0), (day(11), 100.0)];
        let forecast = forecast_series(&series, 1).unwrap();
        assert_eq!(forecast[0].0, day(12));
        assert!((forecast[0].1 - 110.0).abs() < 1e-6);
    }
}
