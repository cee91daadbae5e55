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

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::typedef::Severity;

#[derive(PartialEq, Eq, Deserialize, Serialize, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
	Baseline,
	Optimistic,
	Pessimistic,
}

impl std::fmt::Display for ScenarioKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ScenarioKind::Baseline => write!(f, "baseline"),
			ScenarioKind::Optimistic => write!(f, "optimistic"),
			ScenarioKind::Pessimistic => write!(f, "pessimistic"),
		}
	}
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDelta {
	pub probability: f64,
	pub cost_multiplier: f64,
	pub schedule_days: i64,
	pub risk_delta: f64,
	pub quality_delta: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioSettings {
	pub baseline_probability: f64,
	pub optimistic: ScenarioDelta,
	pub pessimistic: ScenarioDelta,
}

impl Default for ScenarioSettings {
	fn default() -> Self {
		Self {
			baseline_probability: 0.6,
			optimistic: ScenarioDelta {
				probability: 0.2,
				cost_multiplier: 0.9,
				schedule_days: -15,
				risk_delta: -20.0,
				quality_delta: 10.0,
			},
			pessimistic: ScenarioDelta {
				probability: 0.2,
				cost_multiplier: 1.3,
				schedule_days: 30,
				risk_delta: 20.0,
				quality_delta: -15.0,
			},
		}
	}
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
	pub total_cost: f64,
	pub completion_date: NaiveDate,
	pub overall_risk: f64,
	pub quality_score: f64,
	pub risk_level: Severity,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
	pub scenario_id: Uuid,
	pub kind: ScenarioKind,
	pub name: String,
	pub assumptions: Vec<String>,
	pub probability: f64,
	pub outcomes: ScenarioOutcome,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
	pub best_case: Uuid,
	pub worst_case: Uuid,
	pub most_likely: Uuid,
	/// Probability-weighted total cost over every scenario.
	pub expected_cost: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityFactor {
	pub factor: String,
	pub impact_weight: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAnalysis {
	pub analysis_id: Uuid,
	pub project_id: String,
	pub baseline: Scenario,
	pub alternatives: Vec<Scenario>,
	pub comparison: ScenarioComparison,
	pub sensitivity: Vec<SensitivityFactor>,
	pub recommendations: Vec<String>,
	pub generated_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl ScenarioAnalysis {
	pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
		std::iter::once(&self.baseline).chain(self.alternatives.iter())
	}

	pub fn total_probability(&self) -> f64 {
		self.scenarios().map(|each| each.probability).sum()
	}
}
