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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forecast::typedef::{CostForecast, ForecastKind, RiskForecast};
use crate::scenario::typedef::ScenarioAnalysis;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "forecast", rename_all = "lowercase")]
pub enum StoredForecast {
	Cost(CostForecast),
	Risk(RiskForecast),
	Scenario(ScenarioAnalysis),
}

impl StoredForecast {
	pub fn kind(&self) -> ForecastKind {
		match self {
			StoredForecast::Cost(_) => ForecastKind::Cost,
			StoredForecast::Risk(_) => ForecastKind::Risk,
			StoredForecast::Scenario(_) => ForecastKind::Scenario,
		}
	}

	pub fn project_id(&self) -> &str {
		match self {
			StoredForecast::Cost(found) => &found.project_id,
			StoredForecast::Risk(found) => &found.project_id,
			StoredForecast::Scenario(found) => &found.project_id,
		}
	}

	pub fn generated_at(&self) -> DateTime<Utc> {
		match self {
			StoredForecast::Cost(found) => found.generated_at,
			StoredForecast::Risk(found) => found.generated_at,
			StoredForecast::Scenario(found) => found.generated_at,
		}
	}

	pub fn expires_at(&self) -> DateTime<Utc> {
		match self {
			StoredForecast::Cost(found) => found.expires_at,
			StoredForecast::Risk(found) => found.expires_at,
			StoredForecast::Scenario(found) => found.expires_at,
		}
	}

	pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at()
	}
}

impl From<CostForecast> for StoredForecast {
	fn from(value: CostForecast) -> Self {
		StoredForecast::Cost(value)
	}
}

impl From<RiskForecast> for StoredForecast {
	fn from(value: RiskForecast) -> Self {
		StoredForecast::Risk(value)
	}
}

impl From<ScenarioAnalysis> for StoredForecast {
	fn from(value: ScenarioAnalysis) -> Self {
		StoredForecast::Scenario(value)
	}
}
