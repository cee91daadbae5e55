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

use crate::model::typedef::ModelFamily;
use crate::typedef::{ForecastWarning, RiskCategory, Severity};

#[derive(PartialEq, Eq, Hash, Deserialize, Serialize, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ForecastKind {
	Cost,
	Risk,
	Scenario,
}

impl std::fmt::Display for ForecastKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ForecastKind::Cost => write!(f, "cost"),
			ForecastKind::Risk => write!(f, "risk"),
			ForecastKind::Scenario => write!(f, "scenario"),
		}
	}
}

#[derive(PartialEq, Eq, Deserialize, Serialize, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
	Ensemble,
	TrendFallback,
	FrequencyFallback,
}

impl ForecastMethod {
	pub fn is_fallback(self) -> bool {
		!matches!(self, ForecastMethod::Ensemble)
	}
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostPrediction {
	pub step: usize,
	pub date: NaiveDate,
	pub predicted: f64,
	pub lower_bound: f64,
	pub upper_bound: f64,
	pub confidence: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictedRisk {
	pub category: RiskCategory,
	// Chance of at least one materialising risk in the category within the horizon.
	pub probability: f64,
	pub impact: f64,
	pub risk_score: f64,
	pub severity: Severity,
	pub trigger_indicators: Vec<String>,
	pub mitigation_strategies: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Forecast<P> {
	pub forecast_id: Uuid,
	pub project_id: String,
	pub kind: ForecastKind,
	// Last day covered by the horizon.
	pub forecast_date: NaiveDate,
	pub horizon: usize,
	pub predictions: Vec<P>,
	pub total_value: f64,
	pub current_value: f64,
	pub variance: f64,
	pub confidence_score: f64,
	pub risk_level: Severity,
	pub method: ForecastMethod,
	pub low_confidence: bool,
	pub model_families: Vec<ModelFamily>,
	pub assumptions: Vec<String>,
	pub warnings: Vec<ForecastWarning>,
	pub generated_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl<P> Forecast<P> {
	pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}
}

pub type CostForecast = Forecast<CostPrediction>;
pub type RiskForecast = Forecast<PredictedRisk>;
