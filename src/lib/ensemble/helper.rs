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

use super::typedef::WeightStrategy;
use crate::model::typedef::TrainingReport;

const LOSS_EPSILON: f64 = 1e-6;

pub fn member_weight(report: &TrainingReport, strategy: WeightStrategy) -> f64 {
	match strategy {
		WeightStrategy::Uniform => 1f64,
		WeightStrategy::InverseValidationLoss => match report.valid_loss {
			Some(loss) if loss.is_finite() && loss >= 0f64 => 1f64 / (loss + LOSS_EPSILON),
			_ => 1f64,
		},
	}
}

/// Weight-normalised average. Falls back to the plain mean when the weights sum to zero.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
	if values.is_empty() {
		return 0f64;
	}

	let total_weight = weights.iter().take(values.len()).sum::<f64>();
	if total_weight <= 0f64 || !total_weight.is_finite() {
		return values.iter().sum::<f64>() / values.len() as f64;
	}

	values
		.iter()
		.zip(weights.iter())
		.map(|(value, weight)| value * weight)
		.sum::<f64>()
		/ total_weight
}

/// `1 / (1 + sqrt(variance))` of the member predictions around the combined one. Measures
/// agreement between members only.
pub fn disagreement_confidence(values: &[f64], combined: f64) -> f64 {
	if values.is_empty() {
		return 0f64;
	}

	let variance = values
		.iter()
		.map(|each| (each - combined).powi(2))
		.sum::<f64>()
		/ values.len() as f64;

	1f64 / (1f64 + variance.sqrt())
}

pub fn combine_distributions(distributions: &[Vec<f64>], weights: &[f64]) -> Vec<f64> {
	let classes = distributions.first().map(|each| each.len()).unwrap_or_default();

	let combined = (0..classes)
		.map(|class| {
			let column = distributions
				.iter()
				.map(|each| each.get(class).copied().unwrap_or_default())
				.collect::<Vec<_>>();
			weighted_mean(&column, weights).max(0f64)
		})
		.collect::<Vec<_>>();

	let total = combined.iter().sum::<f64>();
	if total <= 0f64 {
		return vec![1f64 / classes.max(1) as f64; classes];
	}

	combined.iter().map(|each| each / total).collect()
}

pub fn distribution_confidence(distributions: &[Vec<f64>], combined: &[f64]) -> f64 {
	let deviations = distributions
		.iter()
		.flat_map(|each| {
			each.iter()
				.zip(combined.iter())
				.map(|(value, mean)| (value - mean).powi(2))
		})
		.collect::<Vec<_>>();

	if deviations.is_empty() {
		return 0f64;
	}

	let variance = deviations.iter().sum::<f64>() / deviations.len() as f64;
	1f64 / (1f64 + variance.sqrt())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::typedef::ModelFamily;
	use approx::assert_relative_eq;

	fn report(valid_loss: Option<f64>) -> TrainingReport {
		TrainingReport {
			family: ModelFamily::RecurrentAttention,
			epochs: 1,
			train_examples: 1,
			valid_examples: 0,
			train_loss: 0.5,
			valid_loss,
		}
	}

	#[test]
	fn uniform_weights_are_one() {
		assert_eq!(member_weight(&report(Some(0.2)), WeightStrategy::Uniform), 1f64);
	}

	#[test]
	fn inverse_loss_prefers_better_members() {
		let good = member_weight(&report(Some(0.1)), WeightStrategy::InverseValidationLoss);
		let bad = member_weight(&report(Some(0.4)), WeightStrategy::InverseValidationLoss);
		assert!(good > bad);
		assert_eq!(
			member_weight(&report(None), WeightStrategy::InverseValidationLoss),
			1f64
		);
	}

	#[test]
	fn weighted_mean_normalises_weights() {
		assert_relative_eq!(weighted_mean(&[1.0, 3.0], &[1.0, 1.0]), 2.0);
		assert_relative_eq!(weighted_mean(&[1.0, 3.0], &[3.0, 1.0]), 1.5);
		assert_relative_eq!(weighted_mean(&[1.0, 3.0], &[0.0, 0.0]), 2.0);
		assert_eq!(weighted_mean(&[], &[]), 0.0);
	}

	#[test]
	fn agreement_gives_full_confidence() {
		assert_eq!(disagreement_confidence(&[2.0, 2.0, 2.0], 2.0), 1.0);
	}

	#[test]
	fn confidence_falls_as_members_disagree() {
		let mut last = f64::INFINITY;
		for spread in [0.0, 0.1, 0.5, 1.0, 4.0] {
			let values = [5.0 - spread, 5.0 + spread];
			let combined = weighted_mean(&values, &[1.0, 1.0]);
			assert_relative_eq!(combined, 5.0);

			let confidence = disagreement_confidence(&values, combined);
			assert!(confidence < last);
			last = confidence;
		}
	}

	#[test]
	fn distributions_stay_on_the_simplex() {
		let combined = combine_distributions(
			&[vec![0.7, 0.2, 0.1], vec![0.1, 0.6, 0.3]],
			&[1.0, 1.0],
		);
		assert_relative_eq!(combined.iter().sum::<f64>(), 1.0);
		assert_relative_eq!(combined[0], 0.4);

		let same = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
		assert_eq!(distribution_confidence(&same, &[0.5, 0.5]), 1.0);
	}
}
