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

use burn::{
	backend::ndarray::NdArrayDevice,
	tensor::{activation::softmax, backend::Backend},
};

use super::attention::SelfAttentionNet;
use super::helper::*;
use super::recurrent::RecurrentAttentionNet;
use super::typedef::*;
use crate::error::{ForecastError, Result};
use crate::sequence::typedef::TrainingExample;

#[derive(Clone, Debug)]
pub enum TrainedNetwork {
	Recurrent(RecurrentAttentionNet<InferenceBackend>),
	SelfAttention(SelfAttentionNet<InferenceBackend>),
}

#[derive(Clone, Debug)]
pub struct TrainedModel {
	pub family: ModelFamily,
	pub task: ModelTask,
	pub window_length: usize,
	pub input_size: usize,
	pub report: TrainingReport,
	network: TrainedNetwork,
}

impl ModelFamily {
	pub fn fit_regressor(
		self,
		examples: &[TrainingExample<f64>],
		config: &FamilyConfig,
		seed: u64,
	) -> Result<TrainedModel> {
		self.fit_examples(examples, ModelTask::Regression, config, seed)
	}

	pub fn fit_classifier(
		self,
		examples: &[TrainingExample<usize>],
		classes: usize,
		config: &FamilyConfig,
		seed: u64,
	) -> Result<TrainedModel> {
		if let Some(found) = examples.iter().find(|each| each.target >= classes) {
			return Err(ForecastError::ModelTrainingFailure(format!(
				"label {} is outside of {} classes",
				found.target, classes
			)));
		}

		self.fit_examples(examples, ModelTask::Classification { classes }, config, seed)
	}

	fn fit_examples<T: ExampleTarget>(
		self,
		examples: &[TrainingExample<T>],
		task: ModelTask,
		config: &FamilyConfig,
		seed: u64,
	) -> Result<TrainedModel> {
		let (window_length, input_size) = match examples.first() {
			Some(found) => (found.window_length(), found.input_size()),
			None => {
				return Err(ForecastError::ModelTrainingFailure(format!(
					"{} received no training examples",
					self
				)))
			}
		};

		let consistent = examples.iter().all(|each| {
			each.window.len() == window_length
				&& each.window.iter().all(|step| step.len() == input_size)
		});
		if window_length == 0 || input_size == 0 || !consistent {
			return Err(ForecastError::ModelTrainingFailure(format!(
				"{} received windows of inconsistent shape",
				self
			)));
		}

		let device = NdArrayDevice::Cpu;
		TrainBackend::seed(seed);

		let input = prepare_input::<TrainBackend, T>(examples, config.validation_split, seed, &device);
		let output_size = task.output_size();

		let (network, report) = match self {
			ModelFamily::RecurrentAttention => {
				let model = RecurrentAttentionNet::<TrainBackend>::new(
					config,
					input_size,
					output_size,
					&device,
				);
				let (trained, report) = fit(model, input, self, config)?;
				(TrainedNetwork::Recurrent(trained), report)
			}
			ModelFamily::StackedSelfAttention => {
				let model = SelfAttentionNet::<TrainBackend>::new(
					config,
					input_size,
					window_length,
					output_size,
					&device,
				);
				let (trained, report) = fit(model, input, self, config)?;
				(TrainedNetwork::SelfAttention(trained), report)
			}
		};

		Ok(TrainedModel {
			family: self,
			task,
			window_length,
			input_size,
			report,
			network,
		})
	}
}

impl TrainedModel {
	pub fn predict(&self, window: &[Vec<f64>]) -> Result<Vec<f64>> {
		if window.len() != self.window_length
			|| window.iter().any(|step| step.len() != self.input_size)
		{
			return Err(ForecastError::InvalidInput(format!(
				"{} expects {} steps of {} inputs",
				self.family, self.window_length, self.input_size
			)));
		}

		let device = NdArrayDevice::Cpu;
		let tensor = window_tensor::<InferenceBackend>(&[window], &device);

		let output = match &self.network {
			TrainedNetwork::Recurrent(network) => network.forward(tensor),
			TrainedNetwork::SelfAttention(network) => network.forward(tensor),
		};
		let output = match self.task {
			ModelTask::Regression => output,
			ModelTask::Classification { .. } => softmax(output, 1),
		};

		let data = output.into_data();
		let values = data.iter::<f32>().map(|each| each as f64).collect::<Vec<_>>();

		if values.iter().any(|each| !each.is_finite()) {
			return Err(ForecastError::ModelTrainingFailure(format!(
				"{} produced a non-finite prediction",
				self.family
			)));
		}

		Ok(values)
	}
}
