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
	module::{Module, Param},
	nn::{
		attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
		Dropout, DropoutConfig, LayerNorm, LayerNormConfig, Linear, LinearConfig,
	},
	tensor::{activation::relu, backend::Backend, Distribution, Tensor},
};

use super::helper::SequenceNetwork;
use super::typedef::FamilyConfig;

#[derive(Module, Debug)]
pub struct AttentionBlock<B: Backend> {
	attention: MultiHeadAttention<B>,
	attention_norm: LayerNorm<B>,
	expand: Linear<B>,
	contract: Linear<B>,
	feed_forward_norm: LayerNorm<B>,
	dropout: Dropout,
}

impl<B: Backend> AttentionBlock<B> {
	fn new(config: &FamilyConfig, device: &B::Device) -> Self {
		let width = config.hidden_size;

		Self {
			attention: MultiHeadAttentionConfig::new(width, config.num_heads.max(1))
				.with_dropout(config.dropout)
				.init(device),
			attention_norm: LayerNormConfig::new(width).init(device),
			expand: LinearConfig::new(width, width * 2).init(device),
			contract: LinearConfig::new(width * 2, width).init(device),
			feed_forward_norm: LayerNormConfig::new(width).init(device),
			dropout: DropoutConfig::new(config.dropout).init(),
		}
	}

	fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
		let mixed = self
			.attention
			.forward(MhaInput::self_attn(input.clone()))
			.context;
		let attended = self
			.attention_norm
			.forward(input + self.dropout.forward(mixed));

		let expanded = relu(self.expand.forward(attended.clone()));
		let contracted = self.contract.forward(self.dropout.forward(expanded));

		self.feed_forward_norm
			.forward(attended + self.dropout.forward(contracted))
	}
}

/// Input projection with a learned positional embedding, stacked attention blocks, mean
/// pooling over the window, dense head.
#[derive(Module, Debug)]
pub struct SelfAttentionNet<B: Backend> {
	embedding: Linear<B>,
	positions: Param<Tensor<B, 2>>,
	blocks: Vec<AttentionBlock<B>>,
	head: Linear<B>,
}

impl<B: Backend> SelfAttentionNet<B> {
	pub fn new(
		config: &FamilyConfig,
		input_size: usize,
		window_length: usize,
		output_size: usize,
		device: &B::Device,
	) -> Self {
		let positions = Tensor::<B, 2>::random(
			[window_length.max(1), config.hidden_size],
			Distribution::Normal(0f64, 0.02),
			device,
		);

		Self {
			embedding: LinearConfig::new(input_size, config.hidden_size).init(device),
			positions: Param::from_tensor(positions),
			blocks: (0..config.depth.max(1))
				.map(|_| AttentionBlock::new(config, device))
				.collect(),
			head: LinearConfig::new(config.hidden_size, output_size).init(device),
		}
	}
}

impl<B: Backend> SequenceNetwork<B> for SelfAttentionNet<B> {
	fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
		let [batch, steps, _] = input.dims();
		let positions = self.positions.val();
		let [_, width] = positions.dims();

		let positions = positions
			.slice([0..steps, 0..width])
			.unsqueeze::<3>()
			.repeat_dim(0, batch);

		let mut hidden = self.embedding.forward(input) + positions;
		for block in self.blocks.iter() {
			hidden = block.forward(hidden);
		}

		let pooled = hidden.mean_dim(1).reshape([batch, width]);
		self.head.forward(pooled)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use burn::backend::{ndarray::NdArrayDevice, NdArray};

	#[test]
	fn maps_windows_to_outputs() {
		let device = NdArrayDevice::Cpu;
		let config = FamilyConfig::new()
			.with_depth(2)
			.with_hidden_size(8)
			.with_num_heads(2);
		let net = SelfAttentionNet::<NdArray>::new(&config, 3, 6, 8, &device);

		let input = Tensor::<NdArray, 3>::ones([4, 6, 3], &device);
		assert_eq!(net.forward(input).dims(), [4, 8]);
	}
}
