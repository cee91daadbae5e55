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
use tracing::info;

use crate::config::EngineConfig;
use crate::ensemble::cache::ModelCache;
use crate::error::Result;
use crate::feature::command::extract_features;
use crate::forecast::{
	cost::generate_cost_forecast,
	risk::generate_risk_forecast,
	typedef::{CostForecast, ForecastKind, RiskForecast},
};
use crate::scenario::{command::generate_scenarios, typedef::ScenarioAnalysis};
use crate::source::command::ProjectDataSource;
use crate::store::{command::ForecastStore, typedef::StoredForecast};

/// Wires the input collaborator, the pipelines and the output store together.
///
/// Each `generate_*` fetches a fresh snapshot, runs its pipeline, stores the result and
/// returns it. Only a missing project or a failing store surfaces as an error.
pub struct ForecastEngine<S: ProjectDataSource, F: ForecastStore> {
	config: EngineConfig,
	source: S,
	store: F,
	cache: ModelCache,
}

impl<S: ProjectDataSource, F: ForecastStore> ForecastEngine<S, F> {
	pub fn new(config: EngineConfig, source: S, store: F) -> Result<Self> {
		config.validate()?;
		let cache = ModelCache::new(config.model_cache_ttl_minutes);

		Ok(Self {
			config,
			source,
			store,
			cache,
		})
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	pub fn store(&self) -> &F {
		&self.store
	}

	pub fn generate_cost_forecast(
		&self,
		project_id: &str,
		now: DateTime<Utc>,
	) -> Result<CostForecast> {
		let snapshot = self.source.snapshot(project_id)?;
		let forecast = generate_cost_forecast(&snapshot, &self.config, &self.cache, now)?;
		info!(
			"Cost forecast {} for {}: total {:.2}, {} ({:?})",
			forecast.forecast_id,
			project_id,
			forecast.total_value,
			forecast.risk_level,
			forecast.method
		);

		self.store.save(forecast.clone().into())?;
		Ok(forecast)
	}

	pub fn generate_risk_forecast(
		&self,
		project_id: &str,
		now: DateTime<Utc>,
	) -> Result<RiskForecast> {
		let snapshot = self.source.snapshot(project_id)?;
		let forecast = generate_risk_forecast(&snapshot, &self.config, &self.cache, now)?;
		info!(
			"Risk forecast {} for {}: mean score {:.1}, {} ({:?})",
			forecast.forecast_id,
			project_id,
			forecast.total_value,
			forecast.risk_level,
			forecast.method
		);

		self.store.save(forecast.clone().into())?;
		Ok(forecast)
	}

	pub fn generate_scenario_analysis(
		&self,
		project_id: &str,
		now: DateTime<Utc>,
	) -> Result<ScenarioAnalysis> {
		let snapshot = self.source.snapshot(project_id)?;
		let features = extract_features(
			&snapshot.project,
			&snapshot.risks,
			&snapshot.factors,
			&snapshot.reports,
			now,
		);
		let analysis = generate_scenarios(
			&snapshot.project,
			&features,
			&snapshot.factors,
			&self.config,
			now,
		);

		self.store.save(analysis.clone().into())?;
		Ok(analysis)
	}

	pub fn latest_cost_forecast(
		&self,
		project_id: &str,
		now: DateTime<Utc>,
	) -> Result<Option<CostForecast>> {
		Ok(match self.latest_valid(project_id, ForecastKind::Cost, now)? {
			Some(StoredForecast::Cost(found)) => Some(found),
			_ => None,
		})
	}

	pub fn latest_risk_forecast(
		&self,
		project_id: &str,
		now: DateTime<Utc>,
	) -> Result<Option<RiskForecast>> {
		Ok(match self.latest_valid(project_id, ForecastKind::Risk, now)? {
			Some(StoredForecast::Risk(found)) => Some(found),
			_ => None,
		})
	}

	pub fn latest_scenario_analysis(
		&self,
		project_id: &str,
		now: DateTime<Utc>,
	) -> Result<Option<ScenarioAnalysis>> {
		Ok(match self.latest_valid(project_id, ForecastKind::Scenario, now)? {
			Some(StoredForecast::Scenario(found)) => Some(found),
			_ => None,
		})
	}

	pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
		self.store.purge_expired(now)
	}

	fn latest_valid(
		&self,
		project_id: &str,
		kind: ForecastKind,
		now: DateTime<Utc>,
	) -> Result<Option<StoredForecast>> {
		Ok(self
			.store
			.latest(project_id, kind)?
			.filter(|found| !found.is_expired(now)))
	}
}
