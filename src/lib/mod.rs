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

pub mod config;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod feature;
pub mod forecast;
pub mod logging;
pub mod model;
pub mod scenario;
pub mod sequence;
pub mod source;
pub mod store;
pub mod typedef;
pub mod warning;

pub use config::EngineConfig;
pub use engine::ForecastEngine;
pub use error::{ForecastError, Result};
pub use forecast::typedef::{CostForecast, RiskForecast};
pub use scenario::typedef::ScenarioAnalysis;
pub use source::command::{MemoryDataSource, ProjectDataSource};
pub use store::command::{
	export_cost_predictions, ForecastStore, JsonLinesForecastStore, MemoryForecastStore,
};
