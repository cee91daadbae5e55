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

use crate::model::typedef::ModelFamily;

#[derive(Default, PartialEq, Eq, Hash, Deserialize, Serialize, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum WeightStrategy {
	#[default]
	Uniform,
	/// 1 / (validation loss + epsilon); members without a validation loss weigh 1.0.
	InverseValidationLoss,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnsemblePrediction {
	pub prediction: f64,
	// Disagreement proxy in `(0, 1]`, not a calibrated accuracy.
	pub confidence: f64,
	pub members: Vec<(ModelFamily, f64)>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPrediction {
	pub probabilities: Vec<f64>,
	pub confidence: f64,
	pub members: Vec<(ModelFamily, Vec<f64>)>,
}
