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
	module::Module,
	nn::{Dropout, DropoutConfig, Linear, LinearConfig, Lstm, LstmConfig},
	tensor::{
		activation::{softmax, tanh},
		backend::Backend,
		Tensor,
	},
};

use super::helper::SequenceNetwork;
use super::typedef::FamilyConfig;

/// Stacked LSTM encoder, additive attention over every encoder output, dense head.
#[derive(Module, Debug)]
pub struct RecurrentAttentionNet<B: Backend> {
	encoders: Vec<Lstm<B>>,
	dropout: Dropout,
	attention_projection: Linear<B>,
	attention_score: Linear<B>,
	head: Linear<B>,
}

impl<B: Backend> RecurrentAttentionNet<B> {
	pub fn new(
		config: &FamilyConfig,
		input_size: usize,
		output_size: usize,
		device: &B::Device,
	) -> Self {
		let encoders = (0..config.depth.max(1))
			.map(|layer| {
				let d_input = if layer == 0 {
					input_size
				} else {
					config.hidden_size
				};
				LstmConfig::new(d_input, config.hidden_size, true).init(device)
			})
			.collect::<Vec<_>>();

		Self {
			encoders,
			dropout: DropoutConfig::new(config.dropout).init(),
			attention_projection: LinearConfig::new(config.hidden_size, config.hidden_size)
				.init(device),
			attention_score: LinearConfig::new(config.hidden_size, 1).init(device),
			head: LinearConfig::new(config.hidden_size, output_size).init(device),
		}
	}
}

impl<B: Backend> SequenceNetwork<B> for RecurrentAttentionNet<B> {
	fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
		let last_layer = self.encoders.len().saturating_sub(1);

		// Dropout only between encoder layers, never after the last one
		let mut encoded = input;
		for (layer, encoder) in self.encoders.iter().enumerate() {
			let (output, _) = encoder.forward(encoded, None);
			encoded = if layer < last_layer {
				self.dropout.forward(output)
			} else {
				output
			};
		}

		let [batch, _, hidden] = encoded.dims();

		// [batch, steps, 1] scores, normalised across the steps
		let scores = self
			.attention_score
			.forward(tanh(self.attention_projection.forward(encoded.clone())));
		let weights = softmax(scores, 1);

		// [batch, 1, steps] x [batch, steps, hidden] -> [batch, hidden]
		let context = weights
			.swap_dims(1, 2)
			.matmul(encoded)
			.reshape([batch, hidden]);

		self.head.forward(self.dropout.forward(context))
	}
}
