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

use statrs::statistics::Statistics;

use super::typedef::*;
use crate::typedef::TimeSeriesPoint;

impl NormalParam {
	/// A constant or too-short series gets a unit deviation, so normalising is a shift.
	pub fn fit(values: &[f64]) -> Self {
		if values.is_empty() {
			return Self {
				mean: 0f64,
				stdev: 1f64,
			};
		}

		let mean = values.iter().mean();
		let stdev = values.iter().std_dev();
		let stdev = if stdev.is_finite() && stdev > f64::EPSILON {
			stdev
		} else {
			1f64
		};

		Self { mean, stdev }
	}

	pub fn normalize(&self, value: f64) -> f64 {
		(value - self.mean) / self.stdev
	}

	pub fn denormalize(&self, value: f64) -> f64 {
		(value * self.stdev) + self.mean
	}
}

/// Stride-1 sliding window: every `window` consecutive steps paired with the label of the
/// step right after them. Returns nothing when there is no complete (window, next) pair,
/// which callers must treat as insufficient data.
pub fn build_labelled_sequences<T: Clone>(
	steps: &[Vec<f64>],
	labels: &[T],
	window: usize,
) -> Vec<TrainingExample<T>> {
	let length = steps.len().min(labels.len());
	if window == 0 || length < window + 1 {
		return Vec::new();
	}

	(0..length - window)
		.map(|offset| TrainingExample {
			window: steps[offset..offset + window].to_vec(),
			target: labels[offset + window].clone(),
		})
		.collect()
}

pub fn build_sequences(series: &[TimeSeriesPoint], window: usize) -> Vec<TrainingExample<f64>> {
	let steps = series
		.iter()
		.map(|each| vec![each.value])
		.collect::<Vec<_>>();
	let labels = series.iter().map(|each| each.value).collect::<Vec<_>>();

	build_labelled_sequences(&steps, &labels, window)
}

pub fn latest_window(steps: &[Vec<f64>], window: usize) -> Option<Vec<Vec<f64>>> {
	if window == 0 || steps.len() < window {
		return None;
	}

	Some(steps[steps.len() - window..].to_vec())
}
