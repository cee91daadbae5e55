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

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainingExample<T> {
	/// `window[step][input]`, oldest step first.
	pub window: Vec<Vec<f64>>,
	pub target: T,
}

impl<T> TrainingExample<T> {
	pub fn window_length(&self) -> usize {
		self.window.len()
	}

	pub fn input_size(&self) -> usize {
		self.window.first().map(|step| step.len()).unwrap_or_default()
	}
}

#[derive(Default, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct NormalParam {
	pub mean: f64,
	pub stdev: f64,
}
