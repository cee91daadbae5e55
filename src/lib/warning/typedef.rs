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

use crate::typedef::RiskCategory;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WarningThresholds {
	pub budget_utilization: f64,
	pub schedule_variance: f64,
	pub cost_variance: f64,
	// Projected spend at the horizon / planned total.
	pub projected_budget_ratio: f64,
	pub critical_risk_score: f64,
	pub risk_trend: f64,
	pub quality_score: f64,
	pub weather_risk: f64,
}

impl Default for WarningThresholds {
	fn default() -> Self {
		Self {
			budget_utilization: 0.9,
			schedule_variance: -0.2,
			cost_variance: 0.15,
			projected_budget_ratio: 1.0,
			critical_risk_score: 75.0,
			risk_trend: 0.3,
			quality_score: 60.0,
			weather_risk: 0.7,
		}
	}
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct ForecastSignals {
	pub category_scores: Vec<(RiskCategory, f64)>,
	pub projected_budget_ratio: Option<f64>,
}
