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
	backend::{Autodiff, NdArray},
	grad_clipping::GradientClippingConfig,
	module::AutodiffModule,
	nn::loss::{CrossEntropyLossConfig, MseLoss, Reduction::Mean},
	optim::{AdamConfig, GradientsParams, Optimizer},
	tensor::{
		backend::{AutodiffBackend, Backend},
		ElementConversion, Int, Tensor, TensorData,
	},
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::typedef::*;
use crate::error::{ForecastError, Result};
use crate::sequence::typedef::TrainingExample;

pub type TrainBackend = Autodiff<NdArray>;
pub type InferenceBackend = NdArray;

pub trait SequenceNetwork<B: Backend> {
	fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2>;
}

pub(super) enum Targets<B: Backend> {
	Continuous(Tensor<B, 2>),
	Categorical(Tensor<B, 1, Int>),
}

pub(super) trait ExampleTarget: Clone {
	fn targets<B: Backend>(examples: &[&TrainingExample<Self>], device: &B::Device) -> Targets<B>;
}

impl ExampleTarget for f64 {
	fn targets<B: Backend>(examples: &[&TrainingExample<Self>], device: &B::Device) -> Targets<B> {
		let values = examples
			.iter()
			.map(|each| each.target as f32)
			.collect::<Vec<_>>();
		let data = TensorData::new(values, [examples.len(), 1]);

		Targets::Continuous(Tensor::<B, 2>::from_data(data, device))
	}
}

impl ExampleTarget for usize {
	fn targets<B: Backend>(examples: &[&TrainingExample<Self>], device: &B::Device) -> Targets<B> {
		let labels = examples
			.iter()
			.map(|each| each.target as i64)
			.collect::<Vec<_>>();
		let data = TensorData::new(labels, [examples.len()]);

		Targets::Categorical(Tensor::<B, 1, Int>::from_data(data, device))
	}
}

pub(super) fn window_tensor<B: Backend>(windows: &[&[Vec<f64>]], device: &B::Device) -> Tensor<B, 3> {
	let steps = windows.first().map(|each| each.len()).unwrap_or_default();
	let inputs = windows
		.first()
		.and_then(|each| each.first())
		.map(|step| step.len())
		.unwrap_or_default();

	let flattened = windows
		.iter()
		.flat_map(|window| window.iter().flatten().map(|value| *value as f32))
		.collect::<Vec<_>>();

	Tensor::<B, 3>::from_data(TensorData::new(flattened, [windows.len(), steps, inputs]), device)
}

fn task_loss<B: Backend>(output: Tensor<B, 2>, targets: &Targets<B>) -> Tensor<B, 1> {
	match targets {
		Targets::Continuous(expected) => MseLoss::new().forward(output, expected.clone(), Mean),
		Targets::Categorical(expected) => CrossEntropyLossConfig::new()
			.init(&output.device())
			.forward(output, expected.clone()),
	}
}

/// Randomised hold-out across windows. Each side keeps chronological order, and at least
/// one window always stays in training.
pub(super) fn split_examples<T>(
	examples: &[TrainingExample<T>],
	validation_split: f64,
	seed: u64,
) -> (Vec<&TrainingExample<T>>, Vec<&TrainingExample<T>>) {
	let total = examples.len();
	let valid_count = ((total as f64) * validation_split).floor() as usize;
	let valid_count = valid_count.min(total.saturating_sub(1));

	let mut indices = (0..total).collect::<Vec<_>>();
	indices.shuffle(&mut StdRng::seed_from_u64(seed));

	let mut valid_indices = indices[..valid_count].to_vec();
	let mut train_indices = indices[valid_count..].to_vec();
	valid_indices.sort_unstable();
	train_indices.sort_unstable();

	(
		train_indices.iter().map(|index| &examples[*index]).collect(),
		valid_indices.iter().map(|index| &examples[*index]).collect(),
	)
}

pub(super) struct FitInput<B: AutodiffBackend> {
	pub train_tensor: Tensor<B, 3>,
	pub train_targets: Targets<B>,
	pub valid: Option<(Tensor<B::InnerBackend, 3>, Targets<B::InnerBackend>)>,
	pub train_count: usize,
	pub valid_count: usize,
}

pub(super) fn prepare_input<B: AutodiffBackend, T: ExampleTarget>(
	examples: &[TrainingExample<T>],
	validation_split: f64,
	seed: u64,
	device: &B::Device,
) -> FitInput<B> {
	let (train, valid) = split_examples(examples, validation_split, seed);

	let train_windows = train
		.iter()
		.map(|each| each.window.as_slice())
		.collect::<Vec<_>>();
	let valid_windows = valid
		.iter()
		.map(|each| each.window.as_slice())
		.collect::<Vec<_>>();

	let valid_input = if valid.is_empty() {
		None
	} else {
		Some((
			window_tensor::<B::InnerBackend>(&valid_windows, device),
			T::targets::<B::InnerBackend>(&valid, device),
		))
	};

	FitInput {
		train_tensor: window_tensor::<B>(&train_windows, device),
		train_targets: T::targets::<B>(&train, device),
		valid: valid_input,
		train_count: train.len(),
		valid_count: valid.len(),
	}
}

/// Full-batch training for a fixed number of epochs. The validation loss is recorded for
/// monitoring and weighting only.
pub(super) fn fit<B, M>(
	mut model: M,
	input: FitInput<B>,
	family: ModelFamily,
	config: &FamilyConfig,
) -> Result<(M::InnerModule, TrainingReport)>
where
	B: AutodiffBackend,
	M: AutodiffModule<B> + SequenceNetwork<B>,
	M::InnerModule: SequenceNetwork<B::InnerBackend>,
{
	let mut optim = AdamConfig::new()
		.with_grad_clipping(Some(GradientClippingConfig::Norm(1.0)))
		.init::<B, M>();

	let mut train_loss = f64::NAN;
	let mut valid_loss = Option::<f64>::None;

	for epoch in 1..=config.epochs {
		// Training phase
		{
			let output = model.forward(input.train_tensor.clone());
			let loss = task_loss(output, &input.train_targets);
			train_loss = loss.clone().into_scalar().elem::<f64>();

			if !train_loss.is_finite() {
				return Err(ForecastError::ModelTrainingFailure(format!(
					"{} diverged at epoch {} (loss {})",
					family, epoch, train_loss
				)));
			}

			let grads = loss.backward();
			let grads = GradientsParams::from_grads(grads, &model);
			model = optim.step(config.learning_rate, model, grads);
		}

		// Validation phase
		if let Some((valid_tensor, valid_targets)) = &input.valid {
			let model = model.valid();
			let output = model.forward(valid_tensor.clone());
			let loss = task_loss(output, valid_targets);
			valid_loss = Some(loss.into_scalar().elem::<f64>());
		}

		tracing::trace!(%family, epoch, train_loss, ?valid_loss, "epoch finished");
	}

	let report = TrainingReport {
		family,
		epochs: config.epochs,
		train_examples: input.train_count,
		valid_examples: input.valid_count,
		train_loss,
		valid_loss,
	};

	tracing::debug!(
		%family,
		train_loss,
		?valid_loss,
		train_examples = input.train_count,
		valid_examples = input.valid_count,
		"family trained"
	);

	Ok((model.valid(), report))
}
