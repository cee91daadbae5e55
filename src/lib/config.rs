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

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::ensemble::typedef::WeightStrategy;
use crate::error::{ForecastError, Result};
use crate::model::typedef::{FamilyConfig, ModelFamily};
use crate::scenario::typedef::ScenarioSettings;
use crate::warning::typedef::WarningThresholds;

// Ten years caps every configurable span of days so date arithmetic stays in range.
pub const MAX_SPAN_DAYS: i64 = 3_650;
pub const MAX_CACHE_TTL_MINUTES: i64 = 525_600;

/// Deployment-tunable settings. Every field has a default, so a partial JSON document is
/// enough to override a handful of values.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
	pub horizon: usize,
	pub max_horizon: usize,
	pub confidence_level: f64,
	pub confidence_decay: f64,
	pub regression_families: Vec<ModelFamily>,
	pub classification_families: Vec<ModelFamily>,
	pub cost_window: usize,
	pub risk_window: usize,
	pub fallback_points: usize,
	pub fallback_confidence: f64,
	pub expiry_days: i64,
	pub weight_strategy: WeightStrategy,
	pub recurrent: FamilyConfig,
	pub self_attention: FamilyConfig,
	pub seed: u64,
	// 0 disables the trained-ensemble cache and trains on every request.
	pub model_cache_ttl_minutes: i64,
	pub thresholds: WarningThresholds,
	pub scenarios: ScenarioSettings,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			horizon: 30,
			max_horizon: 365,
			confidence_level: 0.95,
			confidence_decay: 0.5,
			regression_families: vec![
				ModelFamily::RecurrentAttention,
				ModelFamily::StackedSelfAttention,
			],
			classification_families: vec![
				ModelFamily::StackedSelfAttention,
				ModelFamily::RecurrentAttention,
			],
			cost_window: 90,
			risk_window: 60,
			fallback_points: 30,
			fallback_confidence: 0.3,
			expiry_days: 7,
			weight_strategy: WeightStrategy::Uniform,
			recurrent: FamilyConfig::new(),
			self_attention: FamilyConfig::new().with_dropout(0.1),
			seed: 42,
			model_cache_ttl_minutes: 0,
			thresholds: WarningThresholds::default(),
			scenarios: ScenarioSettings::default(),
		}
	}
}

impl EngineConfig {
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
		let contents = fs::read_to_string(path)?;
		Self::from_json_str(&contents)
	}

	pub fn from_json_str(contents: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(contents)?;
		config.validate()?;
		Ok(config)
	}

	/// How long a generated forecast stays valid. Out-of-range values clamp to the bounds
	/// [`EngineConfig::validate`] enforces.
	pub fn expiry(&self) -> Duration {
		Duration::try_days(self.expiry_days.clamp(0, MAX_SPAN_DAYS)).unwrap_or_else(Duration::zero)
	}

	pub fn family_config(&self, family: ModelFamily) -> &FamilyConfig {
		match family {
			ModelFamily::RecurrentAttention => &self.recurrent,
			ModelFamily::StackedSelfAttention => &self.self_attention,
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.max_horizon == 0 || self.max_horizon > MAX_SPAN_DAYS as usize {
			return Err(ForecastError::InvalidConfig(format!(
				"max horizon must be within 1..={} days, got {}",
				MAX_SPAN_DAYS, self.max_horizon
			)));
		}

		if self.horizon == 0 || self.horizon > self.max_horizon {
			return Err(ForecastError::InvalidConfig(format!(
				"horizon must be within 1..={}, got {}",
				self.max_horizon, self.horizon
			)));
		}

		if !(self.confidence_level > 0f64 && self.confidence_level < 1f64) {
			return Err(ForecastError::InvalidConfig(format!(
				"confidence level must be within (0, 1), got {}",
				self.confidence_level
			)));
		}

		if !(0f64..=1f64).contains(&self.confidence_decay) {
			return Err(ForecastError::InvalidConfig(String::from(
				"confidence decay must be within [0, 1]",
			)));
		}

		if !(0f64..=1f64).contains(&self.fallback_confidence) {
			return Err(ForecastError::InvalidConfig(String::from(
				"fallback confidence must be within [0, 1]",
			)));
		}

		if self.regression_families.is_empty() || self.classification_families.is_empty() {
			return Err(ForecastError::InvalidConfig(String::from(
				"at least one model family is required per ensemble",
			)));
		}

		if self.cost_window < 2 || self.risk_window < 2 {
			return Err(ForecastError::InvalidConfig(String::from(
				"sequence windows need at least two points",
			)));
		}

		if self.fallback_points < 2 {
			return Err(ForecastError::InvalidConfig(String::from(
				"the trend fallback needs at least two points",
			)));
		}

		if !(0..=MAX_SPAN_DAYS).contains(&self.expiry_days) {
			return Err(ForecastError::InvalidConfig(format!(
				"expiry must be within 0..={} days, got {}",
				MAX_SPAN_DAYS, self.expiry_days
			)));
		}

		if !(0..=MAX_CACHE_TTL_MINUTES).contains(&self.model_cache_ttl_minutes) {
			return Err(ForecastError::InvalidConfig(format!(
				"model cache TTL must be within 0..={} minutes, got {}",
				MAX_CACHE_TTL_MINUTES, self.model_cache_ttl_minutes
			)));
		}

		for delta in [&self.scenarios.optimistic, &self.scenarios.pessimistic] {
			if !(-MAX_SPAN_DAYS..=MAX_SPAN_DAYS).contains(&delta.schedule_days) {
				return Err(ForecastError::InvalidConfig(format!(
					"scenario schedule shift must be within {} days, got {}",
					MAX_SPAN_DAYS, delta.schedule_days
				)));
			}
		}

		for (name, family) in [
			("recurrent", &self.recurrent),
			("selfAttention", &self.self_attention),
		] {
			if family.depth == 0 || family.hidden_size == 0 || family.epochs == 0 {
				return Err(ForecastError::InvalidConfig(format!(
					"{} depth, hidden size and epochs must be positive",
					name
				)));
			}

			if !(0f64..1f64).contains(&family.dropout)
				|| !(0f64..1f64).contains(&family.validation_split)
			{
				return Err(ForecastError::InvalidConfig(format!(
					"{} dropout and validation split must be within [0, 1)",
					name
				)));
			}

			if !(family.learning_rate > 0f64) {
				return Err(ForecastError::InvalidConfig(format!(
					"{} learning rate must be positive",
					name
				)));
			}
		}

		let heads = self.self_attention.num_heads;
		if heads == 0 || self.self_attention.hidden_size % heads != 0 {
			return Err(ForecastError::InvalidConfig(format!(
				"self-attention hidden size {} is not divisible by {} heads",
				self.self_attention.hidden_size, heads
			)));
		}

		let probabilities = [
			self.scenarios.baseline_probability,
			self.scenarios.optimistic.probability,
			self.scenarios.pessimistic.probability,
		];
		if probabilities.iter().any(|each| *each < 0f64)
			|| probabilities.iter().sum::<f64>() <= 0f64
		{
			return Err(ForecastError::InvalidConfig(String::from(
				"scenario probabilities must be non-negative with a positive sum",
			)));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_is_valid() {
		assert!(EngineConfig::default().validate().is_ok());
	}

	#[test]
	fn partial_json_keeps_defaults() {
		let config = EngineConfig::from_json_str(
			r#"{ "horizon": 14, "thresholds": { "budgetUtilization": 0.8 } }"#,
		)
		.unwrap();
		assert_eq!(config.horizon, 14);
		assert_eq!(config.thresholds.budget_utilization, 0.8);
		assert_eq!(config.thresholds.schedule_variance, -0.2);
		assert_eq!(config.cost_window, 90);
		assert_eq!(config.recurrent.hidden_size, 64);
	}

	#[test]
	fn rejects_horizon_above_cap() {
		let config = EngineConfig {
			horizon: 400,
			..Default::default()
		};
		assert!(matches!(
			config.validate(),
			Err(ForecastError::InvalidConfig(_))
		));
	}

	#[test]
	fn rejects_indivisible_heads() {
		let mut config = EngineConfig::default();
		config.self_attention = FamilyConfig::new().with_hidden_size(30).with_num_heads(4);
		assert!(config.validate().is_err());
	}

	#[test]
	fn rejects_unbounded_spans() {
		for json in [
			r#"{ "expiryDays": 9000000000000000 }"#,
			r#"{ "modelCacheTtlMinutes": 9000000000000000 }"#,
			r#"{ "maxHorizon": 9000000000000000 }"#,
			r#"{ "scenarios": { "pessimistic": {
				"probability": 0.2, "costMultiplier": 1.3, "scheduleDays": 9000000000000000,
				"riskDelta": 20.0, "qualityDelta": -15.0
			} } }"#,
		] {
			assert!(
				matches!(
					EngineConfig::from_json_str(json),
					Err(ForecastError::InvalidConfig(_))
				),
				"{} should be rejected",
				json
			);
		}
	}

	#[test]
	fn expiry_clamps_out_of_range_days() {
		let config = EngineConfig {
			expiry_days: i64::MAX,
			..Default::default()
		};
		assert_eq!(config.expiry(), Duration::days(MAX_SPAN_DAYS));
		assert_eq!(EngineConfig::default().expiry(), Duration::days(7));
	}

	#[test]
	fn rejects_empty_families() {
		let config = EngineConfig {
			regression_families: Vec::new(),
			..Default::default()
		};
		assert!(config.validate().is_err());
	}
}
