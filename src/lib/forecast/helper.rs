/*
 * Project::Oracle, forecasting and risk prediction for construction projects
 * Copyright (C) 2025 Athaariq A. Ramadhani <foss@athaariq.my.id>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use statrs::{
	distribution::{ContinuousCDF, Normal},
	statistics::Statistics,
};
use std::{
	collections::BTreeMap,
	panic::{catch_unwind, AssertUnwindSafe},
};

use super::typedef::CostPrediction;
use crate::error::{ForecastError, Result};
use crate::feature::helper::ratio;
use crate::source::typedef::{Expense, ProjectRecord};
use crate::typedef::{ForecastWarning, Severity, TimeSeriesPoint, WarningCategory};

const ANOMALY_Z_SCORE: f64 = 3f64;

/// Two-sided standard normal quantile, 1.96 for a 0.95 level.
pub fn z_value(confidence_level: f64) -> f64 {
	match Normal::new(0f64, 1f64) {
		Ok(normal) => normal.inverse_cdf((1f64 + confidence_level) / 2f64),
		Err(_) => 1.96,
	}
}

/// Linear decay, so the last step keeps `1 - decay` of the base confidence.
pub fn step_confidence(base: f64, step: usize, horizon: usize, decay: f64) -> f64 {
	let distance = ratio(step as f64, horizon as f64);
	(base * (1f64 - decay * distance)).clamp(0f64, 1f64)
}

pub fn history_stdev(values: &[f64]) -> f64 {
	if values.len() < 2 {
		return 0f64;
	}

	let stdev = values.iter().std_dev();
	if stdev.is_finite() {
		stdev
	} else {
		0f64
	}
}

pub fn daily_cost_series(expenses: &[Expense]) -> Vec<TimeSeriesPoint> {
	let mut daily = BTreeMap::<NaiveDate, f64>::new();
	for each in expenses {
		*daily.entry(each.date).or_default() += each.amount;
	}

	let (first, last) = match (daily.keys().next(), daily.keys().next_back()) {
		(Some(first), Some(last)) => (*first, *last),
		_ => return Vec::new(),
	};

	let values = first
		.iter_days()
		.take_while(|day| *day <= last)
		.map(|day| (day, daily.get(&day).copied().unwrap_or_default()))
		.collect::<Vec<_>>();

	let amounts = values.iter().map(|(_, value)| *value).collect::<Vec<_>>();
	let mean = if amounts.is_empty() {
		0f64
	} else {
		amounts.iter().mean()
	};
	let stdev = history_stdev(&amounts);

	values
		.into_iter()
		.map(|(day, value)| TimeSeriesPoint {
			timestamp: day.and_time(NaiveTime::MIN).and_utc(),
			value,
			is_anomaly: stdev > 0f64 && ((value - mean) / stdev).abs() > ANOMALY_Z_SCORE,
		})
		.collect()
}

/// Least-squares `(slope, intercept)` over `x = 0, 1, ...`. Needs two points.
pub fn linear_trend(values: &[f64]) -> Option<(f64, f64)> {
	if values.len() < 2 {
		return None;
	}

	let count = values.len() as f64;
	let mean_x = (count - 1f64) / 2f64;
	let mean_y = values.iter().sum::<f64>() / count;

	let (covariance, spread) = values.iter().enumerate().fold(
		(0f64, 0f64),
		|(covariance, spread), (index, value)| {
			let dx = index as f64 - mean_x;
			(covariance + dx * (value - mean_y), spread + dx * dx)
		},
	);

	let slope = ratio(covariance, spread);
	Some((slope, mean_y - slope * mean_x))
}

/// Extends the trend of the trailing `points` values by `horizon` steps, floored at zero.
pub fn trend_projection(history: &[f64], points: usize, horizon: usize) -> Option<Vec<f64>> {
	let recent = &history[history.len().saturating_sub(points)..];
	let (slope, intercept) = linear_trend(recent)?;

	Some(
		(0..horizon)
			.map(|step| (intercept + slope * (recent.len() + step) as f64).max(0f64))
			.collect(),
	)
}

pub fn planned_burn_rate(project: &ProjectRecord, now: DateTime<Utc>) -> f64 {
	let remaining_budget = (project.planned_total() - project.spent_to_date()).max(0f64);
	let remaining_days = (project.planned_end_date - now.date_naive()).num_days().max(0);

	ratio(remaining_budget, remaining_days as f64)
}

pub fn cost_predictions(
	predicted: &[f64],
	base_confidence: f64,
	history_stdev: f64,
	confidence_level: f64,
	decay: f64,
	now: DateTime<Utc>,
) -> Vec<CostPrediction> {
	let margin = z_value(confidence_level) * history_stdev;
	let horizon = predicted.len();
	let today = now.date_naive();

	predicted
		.iter()
		.enumerate()
		.map(|(index, value)| {
			let step = index + 1;
			let value = value.max(0f64);

			CostPrediction {
				step,
				date: today + Duration::days(step as i64),
				predicted: value,
				lower_bound: (value - margin).max(0f64),
				upper_bound: value + margin,
				confidence: step_confidence(base_confidence, step, horizon, decay),
			}
		})
		.collect()
}

pub fn severity_impact(severity: Severity) -> f64 {
	match severity {
		Severity::Low => 25f64,
		Severity::Medium => 50f64,
		Severity::High => 75f64,
		Severity::Critical => 95f64,
	}
}

/// Runs a training closure, turning a panic inside the numeric backend into an error.
pub fn guard_training<T, F>(train: F) -> Result<T>
where
	F: FnOnce() -> Result<T>,
{
	match catch_unwind(AssertUnwindSafe(train)) {
		Ok(result) => result,
		Err(payload) => {
			let message = payload
				.downcast_ref::<&str>()
				.map(|found| found.to_string())
				.or_else(|| payload.downcast_ref::<String>().cloned())
				.unwrap_or_else(|| String::from("training panicked"));
			Err(ForecastError::ModelTrainingFailure(message))
		}
	}
}

pub fn insufficient_data_warning(detail: &str) -> ForecastWarning {
	ForecastWarning::new(
		Severity::Medium,
		WarningCategory::DataQuality,
		format!("Not enough history for the model ensemble ({})", detail),
		&["history"],
		"Record more historical data before relying on this forecast",
	)
}

pub fn model_failure_warning(detail: &str) -> ForecastWarning {
	ForecastWarning::new(
		Severity::Medium,
		WarningCategory::Model,
		format!("Model training failed, a fallback estimate was used ({})", detail),
		&["model"],
		"Review the input data and model settings",
	)
}
