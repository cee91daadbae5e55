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

use tracing::{debug, info, warn};

use super::helper::*;
use super::typedef::*;
use crate::config::EngineConfig;
use crate::error::{ForecastError, Result};
use crate::model::command::TrainedModel;
use crate::model::typedef::{FamilyConfig, ModelFamily, TrainingReport};
use crate::sequence::typedef::TrainingExample;

#[derive(Clone, Debug)]
struct Member {
	model: TrainedModel,
	weight: f64,
}

#[derive(Clone, Debug, Default)]
struct Members(Vec<Member>);

impl Members {
	fn train_with<F>(
		families: &[ModelFamily],
		config: &EngineConfig,
		seed: u64,
		strategy: WeightStrategy,
		mut fit: F,
	) -> Result<(Self, Vec<TrainingReport>)>
	where
		F: FnMut(ModelFamily, &FamilyConfig, u64) -> Result<TrainedModel>,
	{
		let mut members = Vec::<Member>::new();
		let mut failures = Vec::<String>::new();

		for (index, family) in families.iter().copied().enumerate() {
			if members.iter().any(|each| each.model.family == family) {
				debug!("Skipping duplicate family {}", family);
				continue;
			}

			match fit(family, config.family_config(family), seed.wrapping_add(index as u64)) {
				Ok(model) => {
					let weight = member_weight(&model.report, strategy);
					info!(
						"Trained {} (train loss {:.6}, valid loss {:?}, weight {:.4})",
						family, model.report.train_loss, model.report.valid_loss, weight
					);
					members.push(Member { model, weight });
				}
				Err(error) => {
					warn!("Dropping {} from the ensemble: {}", family, error);
					failures.push(format!("{}: {}", family, error));
				}
			}
		}

		if members.is_empty() {
			return Err(ForecastError::ModelTrainingFailure(if failures.is_empty() {
				"no model family configured".to_string()
			} else {
				failures.join("; ")
			}));
		}

		let reports = members.iter().map(|each| each.model.report.clone()).collect();
		Ok((Members(members), reports))
	}

	fn ensure_ready(&self) -> Result<()> {
		if self.0.is_empty() {
			return Err(ForecastError::EnsembleNotReady);
		}
		Ok(())
	}

	fn weights(&self) -> Vec<f64> {
		self.0.iter().map(|each| each.weight).collect()
	}

	fn families(&self) -> Vec<ModelFamily> {
		self.0.iter().map(|each| each.model.family).collect()
	}

	fn window_length(&self) -> Option<usize> {
		self.0.first().map(|each| each.model.window_length)
	}
}

#[derive(Clone, Debug, Default)]
pub struct RegressionEnsemble {
	strategy: WeightStrategy,
	members: Members,
}

impl RegressionEnsemble {
	pub fn new(strategy: WeightStrategy) -> Self {
		Self {
			strategy,
			members: Members::default(),
		}
	}

	/// Fits one member per family. Members that fail are left out; fails only when none
	/// survive.
	pub fn train(
		&mut self,
		examples: &[TrainingExample<f64>],
		families: &[ModelFamily],
		config: &EngineConfig,
		seed: u64,
	) -> Result<Vec<TrainingReport>> {
		let (members, reports) =
			Members::train_with(families, config, seed, self.strategy, |family, settings, seed| {
				family.fit_regressor(examples, settings, seed)
			})?;
		self.members = members;
		Ok(reports)
	}

	pub fn predict(&self, window: &[Vec<f64>]) -> Result<EnsemblePrediction> {
		self.members.ensure_ready()?;

		let mut values = Vec::<f64>::with_capacity(self.members.0.len());
		for member in self.members.0.iter() {
			let output = member.model.predict(window)?;
			values.push(output.first().copied().unwrap_or_default());
		}

		let prediction = weighted_mean(&values, &self.members.weights());
		let confidence = disagreement_confidence(&values, prediction);

		Ok(EnsemblePrediction {
			prediction,
			confidence,
			members: self.members.families().into_iter().zip(values).collect(),
		})
	}

	pub fn is_trained(&self) -> bool {
		!self.members.0.is_empty()
	}

	pub fn families(&self) -> Vec<ModelFamily> {
		self.members.families()
	}

	pub fn window_length(&self) -> Option<usize> {
		self.members.window_length()
	}

	pub fn strategy(&self) -> WeightStrategy {
		self.strategy
	}
}

#[derive(Clone, Debug)]
pub struct ClassificationEnsemble {
	strategy: WeightStrategy,
	classes: usize,
	members: Members,
}

impl ClassificationEnsemble {
	pub fn new(classes: usize, strategy: WeightStrategy) -> Self {
		Self {
			strategy,
			classes,
			members: Members::default(),
		}
	}

	pub fn train(
		&mut self,
		examples: &[TrainingExample<usize>],
		families: &[ModelFamily],
		config: &EngineConfig,
		seed: u64,
	) -> Result<Vec<TrainingReport>> {
		if self.classes == 0 {
			return Err(ForecastError::InvalidInput(
				"a classifier needs at least one class".to_string(),
			));
		}

		let classes = self.classes;
		let (members, reports) =
			Members::train_with(families, config, seed, self.strategy, |family, settings, seed| {
				family.fit_classifier(examples, classes, settings, seed)
			})?;
		self.members = members;
		Ok(reports)
	}

	pub fn predict(&self, window: &[Vec<f64>]) -> Result<DistributionPrediction> {
		self.members.ensure_ready()?;

		let mut distributions = Vec::<Vec<f64>>::with_capacity(self.members.0.len());
		for member in self.members.0.iter() {
			distributions.push(member.model.predict(window)?);
		}

		let probabilities = combine_distributions(&distributions, &self.members.weights());
		let confidence = distribution_confidence(&distributions, &probabilities);

		Ok(DistributionPrediction {
			probabilities,
			confidence,
			members: self.members.families().into_iter().zip(distributions).collect(),
		})
	}

	pub fn classes(&self) -> usize {
		self.classes
	}

	pub fn is_trained(&self) -> bool {
		!self.members.0.is_empty()
	}

	pub fn families(&self) -> Vec<ModelFamily> {
		self.members.families()
	}

	pub fn window_length(&self) -> Option<usize> {
		self.members.window_length()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::typedef::FamilyConfig;

	fn tiny_config() -> EngineConfig {
		let tiny = FamilyConfig::new()
			.with_depth(1)
			.with_hidden_size(8)
			.with_num_heads(2)
			.with_epochs(3);
		EngineConfig {
			recurrent: tiny.clone(),
			self_attention: tiny,
			..EngineConfig::default()
		}
	}

	fn wave(count: usize, window: usize) -> Vec<TrainingExample<f64>> {
		let value = |index: usize| (index as f64 * 0.4).sin();
		(0..count)
			.map(|offset| TrainingExample {
				window: (0..window).map(|step| vec![value(offset + step)]).collect(),
				target: value(offset + window),
			})
			.collect()
	}

	#[test]
	fn untrained_ensembles_refuse_to_predict() {
		let regression = RegressionEnsemble::new(WeightStrategy::Uniform);
		assert!(!regression.is_trained());
		assert!(matches!(
			regression.predict(&[vec![0.0]]),
			Err(ForecastError::EnsembleNotReady)
		));

		let classification = ClassificationEnsemble::new(3, WeightStrategy::Uniform);
		assert!(matches!(
			classification.predict(&[vec![0.0]]),
			Err(ForecastError::EnsembleNotReady)
		));
	}

	#[test]
	fn regression_combines_every_family() {
		let config = tiny_config();
		let examples = wave(16, 4);

		let mut ensemble = RegressionEnsemble::new(WeightStrategy::InverseValidationLoss);
		let reports = ensemble
			.train(&examples, &config.regression_families, &config, 7)
			.unwrap();
		assert_eq!(reports.len(), 2);
		assert_eq!(ensemble.families(), config.regression_families);
		assert_eq!(ensemble.window_length(), Some(4));

		let prediction = ensemble.predict(&examples[3].window).unwrap();
		assert_eq!(prediction.members.len(), 2);
		assert!(prediction.prediction.is_finite());
		assert!(prediction.confidence > 0.0 && prediction.confidence <= 1.0);

		let (low, high) = prediction
			.members
			.iter()
			.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), (_, value)| {
				(low.min(*value), high.max(*value))
			});
		assert!(prediction.prediction >= low - 1e-9 && prediction.prediction <= high + 1e-9);
	}

	#[test]
	fn duplicate_families_train_once() {
		let config = tiny_config();
		let mut ensemble = RegressionEnsemble::new(WeightStrategy::Uniform);
		let reports = ensemble
			.train(
				&wave(10, 3),
				&[ModelFamily::RecurrentAttention, ModelFamily::RecurrentAttention],
				&config,
				1,
			)
			.unwrap();
		assert_eq!(reports.len(), 1);
	}

	#[test]
	fn training_without_data_fails() {
		let config = tiny_config();
		let mut ensemble = RegressionEnsemble::new(WeightStrategy::Uniform);
		assert!(matches!(
			ensemble.train(&[], &config.regression_families, &config, 1),
			Err(ForecastError::ModelTrainingFailure(_))
		));
		assert!(!ensemble.is_trained());

		assert!(matches!(
			ensemble.train(&wave(10, 3), &[], &config, 1),
			Err(ForecastError::ModelTrainingFailure(_))
		));
	}

	#[test]
	fn classification_yields_a_distribution() {
		let config = tiny_config();
		let examples = (0..12)
			.map(|offset| TrainingExample {
				window: (0..3).map(|step| vec![((offset + step) % 4) as f64 / 4.0]).collect(),
				target: (offset + 3) % 4,
			})
			.collect::<Vec<_>>();

		let mut ensemble = ClassificationEnsemble::new(4, WeightStrategy::Uniform);
		ensemble
			.train(&examples, &config.classification_families, &config, 11)
			.unwrap();

		let prediction = ensemble.predict(&examples[0].window).unwrap();
		assert_eq!(prediction.probabilities.len(), 4);
		approx::assert_relative_eq!(
			prediction.probabilities.iter().sum::<f64>(),
			1.0,
			epsilon = 1e-6
		);
		assert!(prediction.confidence > 0.0 && prediction.confidence <= 1.0);
	}
}
