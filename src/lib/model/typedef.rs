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

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

#[derive(PartialEq, Eq, Hash, EnumIter, Deserialize, Serialize, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
	RecurrentAttention,
	StackedSelfAttention,
}

impl std::fmt::Display for ModelFamily {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ModelFamily::RecurrentAttention => write!(f, "recurrent_attention"),
			ModelFamily::StackedSelfAttention => write!(f, "stacked_self_attention"),
		}
	}
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ModelTask {
	Regression,
	Classification { classes: usize },
}

impl ModelTask {
	pub fn output_size(self) -> usize {
		match self {
			ModelTask::Regression => 1,
			ModelTask::Classification { classes } => classes,
		}
	}
}

/// Hyperparameters shared by both families. `num_heads` is only read by the
/// self-attention family and must divide `hidden_size`.
#[derive(burn::config::Config, Debug)]
pub struct FamilyConfig {
	#[config(default = 2)]
	pub depth: usize,

	#[config(default = 64)]
	pub hidden_size: usize,

	#[config(default = 4)]
	pub num_heads: usize,

	#[config(default = 0.2)]
	pub dropout: f64,

	#[config(default = 1e-3)]
	pub learning_rate: f64,

	#[config(default = 50)]
	pub epochs: usize,

	// Share of windows held out to monitor validation loss. Never used to stop early.
	#[config(default = 0.2)]
	pub validation_split: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
	pub family: ModelFamily,
	pub epochs: usize,
	pub train_examples: usize,
	pub valid_examples: usize,
	pub train_loss: f64,
	pub valid_loss: Option<f64>,
}
