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

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::helper::*;
use super::typedef::*;
use crate::config::EngineConfig;
use crate::ensemble::{cache::fingerprint, cache::ModelCache, command::RegressionEnsemble};
use crate::error::{ForecastError, Result};
use crate::feature::{command::extract_features, helper::ratio};
use crate::model::typedef::ModelFamily;
use crate::sequence::{
	command::{build_sequences, latest_window},
	typedef::NormalParam,
};
use crate::source::typedef::ProjectSnapshot;
use crate::typedef::{ForecastWarning, Severity, TimeSeriesPoint};
use crate::warning::{command::detect_warnings, typedef::ForecastSignals};

struct Projection {
	predicted: Vec<f64>,
	confidence: f64,
	method: ForecastMethod,
	families: Vec<ModelFamily>,
	warnings: Vec<ForecastWarning>,
}

/// Daily spending forecast for the configured horizon.
///
/// Falls back to a trend estimate whenever the ensemble cannot be trained, so once the
/// snapshot is in hand this only fails on an invalid configuration.
pub fn generate_cost_forecast(
	snapshot: &ProjectSnapshot,
	config: &EngineConfig,
	cache: &ModelCache,
	now: DateTime<Utc>,
) -> Result<CostForecast> {
	config.validate()?;

	let project = &snapshot.project;
	let horizon = config.horizon;
	let features = extract_features(
		project,
		&snapshot.risks,
		&snapshot.factors,
		&snapshot.reports,
		now,
	);

	let history = daily_cost_series(&project.expenses);
	let values = history.iter().map(|each| each.value).collect::<Vec<_>>();
	info!(
		"Cost forecast for {}: {} days of history, horizon {}",
		project.id,
		values.len(),
		horizon
	);

	let projection = match ensemble_projection(&project.id, &history, config, cache, now) {
		Ok(found) => found,
		Err(error) => {
			let warning = match &error {
				ForecastError::InsufficientHistory {
					required,
					available,
				} => insufficient_data_warning(&format!(
					"{} daily points required, {} available",
					required, available
				)),
				other => model_failure_warning(&other.to_string()),
			};
			warn!("Cost forecast for {} degraded: {}", project.id, error);

			let predicted = trend_projection(&values, config.fallback_points, horizon)
				.unwrap_or_else(|| vec![planned_burn_rate(project, now); horizon]);

			Projection {
				predicted,
				confidence: config.fallback_confidence,
				method: ForecastMethod::TrendFallback,
				families: Vec::new(),
				warnings: vec![warning],
			}
		}
	};

	let predictions = cost_predictions(
		&projection.predicted,
		projection.confidence,
		history_stdev(&values),
		config.confidence_level,
		config.confidence_decay,
		now,
	);

	let spent = project.spent_to_date();
	let planned_total = project.planned_total();
	let horizon_end = now + Duration::days(horizon as i64);
	let planned_at_horizon = planned_total * project.planned_progress(horizon_end);

	let total = spent + predictions.iter().map(|each| each.predicted).sum::<f64>();
	let overrun = ratio(total, planned_at_horizon);
	let risk_score = if overrun > 0f64 {
		((overrun - 0.9) * 250f64).clamp(0f64, 100f64)
	} else {
		0f64
	};

	let mut warnings = projection.warnings;
	warnings.extend(detect_warnings(
		&features,
		&ForecastSignals {
			category_scores: Vec::new(),
			projected_budget_ratio: (planned_total > 0f64).then(|| total / planned_total),
		},
		&config.thresholds,
	));

	let mut assumptions = vec![
		String::from("Daily spending follows the recorded expense history"),
		String::from("No change orders or scope changes within the horizon"),
		format!(
			"Intervals cover {:.0}% of historical daily variation",
			config.confidence_level * 100f64
		),
	];
	if projection.method.is_fallback() {
		assumptions.push(String::from(
			"Recent spending trend continues, or the remaining budget is spent evenly",
		));
	}

	Ok(Forecast {
		forecast_id: Uuid::new_v4(),
		project_id: project.id.clone(),
		kind: ForecastKind::Cost,
		forecast_date: horizon_end.date_naive(),
		horizon,
		predictions,
		total_value: total,
		current_value: spent,
		variance: total - planned_at_horizon,
		confidence_score: projection.confidence,
		risk_level: Severity::from_score(risk_score),
		method: projection.method,
		low_confidence: projection.method.is_fallback(),
		model_families: projection.families,
		assumptions,
		warnings,
		generated_at: now,
		expires_at: now + config.expiry(),
	})
}

fn ensemble_projection(
	project_id: &str,
	history: &[TimeSeriesPoint],
	config: &EngineConfig,
	cache: &ModelCache,
	now: DateTime<Utc>,
) -> Result<Projection> {
	let window = config.cost_window;
	let values = history.iter().map(|each| each.value).collect::<Vec<_>>();
	let param = NormalParam::fit(&values);

	let normalized = history
		.iter()
		.map(|each| TimeSeriesPoint {
			value: param.normalize(each.value),
			..*each
		})
		.collect::<Vec<_>>();
	let examples = build_sequences(&normalized, window);
	if examples.is_empty() {
		return Err(ForecastError::InsufficientHistory {
			required: window + 1,
			available: history.len(),
		});
	}

	let steps = normalized
		.iter()
		.map(|each| vec![each.value])
		.collect::<Vec<_>>();
	let mut window_steps = latest_window(&steps, window).ok_or(
		ForecastError::InsufficientHistory {
			required: window,
			available: steps.len(),
		},
	)?;

	guard_training(|| {
		let key = format!("{}:cost", project_id);
		let print = fingerprint(
			&examples,
			&config.regression_families,
			config,
			|target| target.to_bits(),
		);

		let ensemble = cache.regressor(&key, print, now, || {
			let mut ensemble = RegressionEnsemble::new(config.weight_strategy);
			ensemble.train(&examples, &config.regression_families, config, config.seed)?;
			Ok(ensemble)
		})?;

		let mut predicted = Vec::<f64>::with_capacity(config.horizon);
		let mut confidences = Vec::<f64>::with_capacity(config.horizon);
		for _ in 0..config.horizon {
			let output = ensemble.predict(&window_steps)?;
			predicted.push(param.denormalize(output.prediction).max(0f64));
			confidences.push(output.confidence);

			window_steps.remove(0);
			window_steps.push(vec![output.prediction]);
		}

		Ok(Projection {
			predicted,
			confidence: ratio(confidences.iter().sum(), confidences.len() as f64),
			method: ForecastMethod::Ensemble,
			families: ensemble.families(),
			warnings: Vec::new(),
		})
	})
}
