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
use strum::IntoEnumIterator;
use tracing::{info, warn};
use uuid::Uuid;

use super::helper::*;
use super::typedef::*;
use crate::config::EngineConfig;
use crate::ensemble::{cache::fingerprint, cache::ModelCache, command::ClassificationEnsemble};
use crate::error::{ForecastError, Result};
use crate::feature::{command::extract_features, helper::ratio, typedef::*};
use crate::model::typedef::ModelFamily;
use crate::sequence::command::{build_labelled_sequences, latest_window};
use crate::source::typedef::{ProjectSnapshot, RiskRecord};
use crate::typedef::{FeatureVector, ForecastWarning, RiskCategory, Severity};
use crate::warning::{command::detect_warnings, typedef::ForecastSignals, typedef::WarningThresholds};

/// Impact of a category that has never been logged.
const DEFAULT_IMPACT: f64 = 25f64;

struct Distribution {
	probabilities: Vec<f64>,
	confidence: f64,
	method: ForecastMethod,
	families: Vec<ModelFamily>,
	warnings: Vec<ForecastWarning>,
}

pub fn generate_risk_forecast(
	snapshot: &ProjectSnapshot,
	config: &EngineConfig,
	cache: &ModelCache,
	now: DateTime<Utc>,
) -> Result<RiskForecast> {
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

	let mut ordered = snapshot.risks.iter().collect::<Vec<_>>();
	ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
	info!(
		"Risk forecast for {}: {} logged risks, horizon {}",
		project.id,
		ordered.len(),
		horizon
	);

	let distribution = match ensemble_distribution(&project.id, &ordered, config, cache, now) {
		Ok(found) => found,
		Err(error) => {
			let warning = match &error {
				ForecastError::InsufficientHistory {
					required,
					available,
				} => insufficient_data_warning(&format!(
					"{} logged risks required, {} available",
					required, available
				)),
				other => model_failure_warning(&other.to_string()),
			};
			warn!("Risk forecast for {} degraded: {}", project.id, error);

			Distribution {
				probabilities: category_frequencies(&ordered),
				confidence: config.fallback_confidence,
				method: ForecastMethod::FrequencyFallback,
				families: Vec::new(),
				warnings: vec![warning],
			}
		}
	};

	let predictions = predict_category_risks(
		&distribution.probabilities,
		&ordered,
		&features,
		&config.thresholds,
		horizon,
		now,
	);
	let (total, risk_level) = summarize_predicted_risks(&predictions);

	let open_scores = ordered
		.iter()
		.filter(|each| each.status.is_open())
		.map(|each| each.risk_score)
		.collect::<Vec<_>>();
	let current = ratio(open_scores.iter().sum(), open_scores.len() as f64);

	let mut warnings = distribution.warnings;
	warnings.extend(detect_warnings(
		&features,
		&ForecastSignals {
			category_scores: predictions
				.iter()
				.map(|each| (each.category, each.risk_score))
				.collect(),
			projected_budget_ratio: None,
		},
		&config.thresholds,
	));

	let mut assumptions = vec![
		String::from("Risks keep arriving at the historical rate"),
		String::from("Open risks stay open unless mitigated"),
	];
	if distribution.method.is_fallback() {
		assumptions.push(String::from(
			"Category mix of new risks follows the logged history",
		));
	}

	let horizon_end = now + Duration::days(horizon as i64);
	Ok(Forecast {
		forecast_id: Uuid::new_v4(),
		project_id: project.id.clone(),
		kind: ForecastKind::Risk,
		forecast_date: horizon_end.date_naive(),
		horizon,
		predictions,
		total_value: total,
		current_value: current,
		variance: total - current,
		confidence_score: distribution.confidence,
		risk_level,
		method: distribution.method,
		low_confidence: distribution.method.is_fallback(),
		model_families: distribution.families,
		assumptions,
		warnings,
		generated_at: now,
		expires_at: now + config.expiry(),
	})
}

pub fn summarize_predicted_risks(predictions: &[PredictedRisk]) -> (f64, Severity) {
	let mean = ratio(
		predictions.iter().map(|each| each.risk_score).sum(),
		predictions.len() as f64,
	);
	(mean, Severity::from_score(mean))
}

/// One-hot category, probability, severity level and score of a logged risk.
pub fn encode_risk(risk: &RiskRecord) -> Vec<f64> {
	let mut step = vec![0f64; RiskCategory::COUNT];
	step[risk.category.index()] = 1f64;
	step.push(risk.probability.clamp(0f64, 1f64));
	step.push(risk.severity as usize as f64 / 3f64);
	step.push((risk.risk_score / 100f64).clamp(0f64, 1f64));
	step
}

pub fn category_frequencies(risks: &[&RiskRecord]) -> Vec<f64> {
	let total = risks.len() as f64 + RiskCategory::COUNT as f64;
	RiskCategory::iter()
		.map(|category| {
			let count = risks.iter().filter(|each| each.category == category).count();
			(count as f64 + 1f64) / total
		})
		.collect()
}

fn ensemble_distribution(
	project_id: &str,
	ordered: &[&RiskRecord],
	config: &EngineConfig,
	cache: &ModelCache,
	now: DateTime<Utc>,
) -> Result<Distribution> {
	let window = config.risk_window;
	let steps = ordered.iter().map(|each| encode_risk(each)).collect::<Vec<_>>();
	let labels = ordered
		.iter()
		.map(|each| each.category.index())
		.collect::<Vec<_>>();

	let examples = build_labelled_sequences(&steps, &labels, window);
	let latest = latest_window(&steps, window);
	let latest = match latest {
		Some(found) if !examples.is_empty() => found,
		_ => {
			return Err(ForecastError::InsufficientHistory {
				required: window + 1,
				available: steps.len(),
			})
		}
	};

	guard_training(|| {
		let key = format!("{}:risk", project_id);
		let print = fingerprint(
			&examples,
			&config.classification_families,
			config,
			|target| *target as u64,
		);

		let ensemble = cache.classifier(&key, print, now, || {
			let mut ensemble = ClassificationEnsemble::new(RiskCategory::COUNT, config.weight_strategy);
			ensemble.train(
				&examples,
				&config.classification_families,
				config,
				config.seed,
			)?;
			Ok(ensemble)
		})?;

		let output = ensemble.predict(&latest)?;
		Ok(Distribution {
			probabilities: output.probabilities,
			confidence: output.confidence,
			method: ForecastMethod::Ensemble,
			families: ensemble.families(),
			warnings: Vec::new(),
		})
	})
}

/// Combines the next-risk category distribution with arrival rate, open risks and
/// historical impact into one prediction per category.
pub fn predict_category_risks(
	distribution: &[f64],
	ordered: &[&RiskRecord],
	features: &FeatureVector,
	thresholds: &WarningThresholds,
	horizon: usize,
	now: DateTime<Utc>,
) -> Vec<PredictedRisk> {
	let arrival_rate = match ordered.first() {
		Some(first) => {
			let span_days = (now - first.created_at).num_days().max(1);
			ordered.len() as f64 / span_days as f64
		}
		None => 0f64,
	};
	let expected_arrivals = arrival_rate * horizon as f64;

	RiskCategory::iter()
		.map(|category| {
			let share = distribution
				.get(category.index())
				.copied()
				.unwrap_or_default()
				.clamp(0f64, 1f64);
			let records = ordered
				.iter()
				.copied()
				.filter(|each| each.category == category)
				.collect::<Vec<_>>();

			let new_probability = 1f64 - (1f64 - share).powf(expected_arrivals);
			let open_probability = records
				.iter()
				.filter(|each| each.status.is_open())
				.map(|each| each.probability.clamp(0f64, 1f64))
				.fold(0f64, f64::max);
			let probability =
				(1f64 - (1f64 - new_probability) * (1f64 - open_probability)).clamp(0f64, 1f64);

			let impact = if records.is_empty() {
				DEFAULT_IMPACT
			} else {
				let impacts = records
					.iter()
					.map(|each| {
						if each.probability > 0f64 {
							(each.risk_score / each.probability).clamp(0f64, 100f64)
						} else {
							severity_impact(each.severity)
						}
					})
					.sum::<f64>();
				impacts / records.len() as f64
			};

			let risk_score = probability * impact;
			PredictedRisk {
				category,
				probability,
				impact,
				risk_score,
				severity: Severity::from_score(risk_score),
				trigger_indicators: trigger_indicators(category, &records, features, thresholds),
				mitigation_strategies: mitigation_strategies(category, &records),
			}
		})
		.collect()
}

fn trigger_indicators(
	category: RiskCategory,
	records: &[&RiskRecord],
	features: &FeatureVector,
	thresholds: &WarningThresholds,
) -> Vec<String> {
	let mut indicators = Vec::<String>::new();

	let open = records.iter().filter(|each| each.status.is_open()).count();
	if open > 0 {
		indicators.push(format!("{} open {} risk(s)", open, category));
	}

	match category {
		RiskCategory::Financial => {
			if let Some(found) = features.get(BUDGET_UTILIZATION) {
				if found > thresholds.budget_utilization {
					indicators.push(format!("Budget utilization at {:.0}%", found * 100f64));
				}
			}
			if let Some(found) = features.get(COST_VARIANCE) {
				if found > thresholds.cost_variance {
					indicators.push(format!("Cost variance at {:+.0}%", found * 100f64));
				}
			}
			if features.value(MARKET_VOLATILITY) > 0.5 {
				indicators.push(String::from("Volatile material market"));
			}
		}
		RiskCategory::Schedule => {
			if let Some(found) = features.get(SCHEDULE_VARIANCE) {
				if found < thresholds.schedule_variance {
					indicators.push(format!("Schedule variance at {:+.0}%", found * 100f64));
				}
			}
			if features.value(HOLIDAY_SEASON) > 0f64 {
				indicators.push(String::from("Holiday season reduces available crews"));
			}
		}
		RiskCategory::Environmental => {
			if let Some(found) = features.get(WEATHER_RISK) {
				if found > thresholds.weather_risk {
					indicators.push(format!("Weather risk index at {:.2}", found));
				}
			}
		}
		RiskCategory::Quality => {
			if let Some(found) = features.get(QUALITY_SCORE) {
				if found < thresholds.quality_score {
					indicators.push(format!("Site quality score at {:.0}", found));
				}
			}
		}
		RiskCategory::Resource => {
			let team = features.value(TEAM_SIZE);
			let workers = features.value(AVERAGE_WORKERS);
			if team > 0f64 && features.value(REPORT_COUNT) > 0f64 && workers < team * 0.5 {
				indicators.push(format!(
					"Average site headcount {:.0} against a team of {:.0}",
					workers, team
				));
			}
			if features.value(PEAK_SEASON) > 0f64 {
				indicators.push(String::from("Peak season demand for labour and equipment"));
			}
		}
		RiskCategory::Safety | RiskCategory::Technical | RiskCategory::Regulatory => {}
	}

	if features.value(RISK_TREND) > thresholds.risk_trend {
		indicators.push(String::from("Risk scores trending upward"));
	}

	indicators
}

fn mitigation_strategies(category: RiskCategory, records: &[&RiskRecord]) -> Vec<String> {
	let mut strategies = Vec::<String>::new();
	for plan in records
		.iter()
		.filter_map(|each| each.mitigation_plan.as_deref())
		.map(str::trim)
		.filter(|each| !each.is_empty())
	{
		if !strategies.iter().any(|each| each == plan) {
			strategies.push(plan.to_string());
		}
	}

	if strategies.is_empty() {
		strategies.extend(default_strategies(category).iter().map(|each| each.to_string()));
	}

	strategies
}

fn default_strategies(category: RiskCategory) -> [&'static str; 2] {
	match category {
		RiskCategory::Technical => [
			"Run design reviews before each construction phase",
			"Engage specialist consultants for complex works",
		],
		RiskCategory::Financial => [
			"Tighten cost tracking against the budget baseline",
			"Negotiate fixed-price contracts for major materials",
		],
		RiskCategory::Safety => [
			"Hold daily toolbox safety briefings",
			"Audit protective equipment and site access",
		],
		RiskCategory::Schedule => [
			"Re-sequence critical path activities",
			"Add shifts or crews to delayed work fronts",
		],
		RiskCategory::Quality => [
			"Increase inspection frequency",
			"Enforce hold points before covering work",
		],
		RiskCategory::Resource => [
			"Secure standby subcontractors",
			"Order long-lead materials early",
		],
		RiskCategory::Environmental => [
			"Plan weather-sensitive work around forecasts",
			"Protect exposed works and materials",
		],
		RiskCategory::Regulatory => [
			"Track permit renewals and inspections",
			"Review compliance with current codes",
		],
	}
}
