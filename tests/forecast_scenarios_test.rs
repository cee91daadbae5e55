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

mod common;

use approx::assert_relative_eq;
use common::*;
use project_oracle_lib::feature::command::extract_features;
use project_oracle_lib::forecast::risk::summarize_predicted_risks;
use project_oracle_lib::forecast::typedef::{ForecastMethod, PredictedRisk};
use project_oracle_lib::source::typedef::Expense;
use project_oracle_lib::typedef::{RiskCategory, Severity, WarningCategory};
use project_oracle_lib::warning::{command::detect_warnings, typedef::ForecastSignals};
use project_oracle_lib::{
	EngineConfig, ForecastEngine, ForecastStore, JsonLinesForecastStore, MemoryDataSource,
	MemoryForecastStore,
};
use tempfile::tempdir;

fn engine_with(
	snapshots: Vec<project_oracle_lib::source::typedef::ProjectSnapshot>,
) -> ForecastEngine<MemoryDataSource, MemoryForecastStore> {
	let mut source = MemoryDataSource::new();
	snapshots.into_iter().for_each(|each| source.insert(each));
	ForecastEngine::new(EngineConfig::default(), source, MemoryForecastStore::new()).unwrap()
}

#[test]
fn project_without_costs_gets_a_flagged_fallback() {
	let engine = engine_with(vec![snapshot(project("empty", 365_000.0, 0.2), Vec::new())]);
	let now = at(100);

	let forecast = engine.generate_cost_forecast("empty", now).unwrap();

	assert_eq!(forecast.method, ForecastMethod::TrendFallback);
	assert!(forecast.low_confidence);
	assert!(forecast.confidence_score <= 0.5);
	assert!(forecast.model_families.is_empty());
	assert!(forecast
		.warnings
		.iter()
		.any(|each| each.category == WarningCategory::DataQuality));

	assert_eq!(forecast.predictions.len(), 30);
	let remaining_days = (project("empty", 0.0, 0.0).planned_end_date - now.date_naive()).num_days();
	for each in forecast.predictions.iter() {
		assert_relative_eq!(each.predicted, 365_000.0 / remaining_days as f64, epsilon = 1e-6);
		assert!(each.confidence <= 0.3 + 1e-12);
		assert!(each.lower_bound <= each.predicted && each.predicted <= each.upper_bound);
	}
	assert_eq!(forecast.expires_at, now + chrono::Duration::days(7));
}

#[test]
fn short_history_extends_the_recent_trend() {
	let mut record = project("short", 365_000.0, 0.1);
	record.expenses = daily_expenses(0, 10, |day| 100.0 + 10.0 * day as f64);
	let engine = engine_with(vec![snapshot(record, Vec::new())]);

	let forecast = engine.generate_cost_forecast("short", at(20)).unwrap();

	assert_eq!(forecast.method, ForecastMethod::TrendFallback);
	assert_relative_eq!(forecast.confidence_score, 0.3);
	assert_relative_eq!(forecast.predictions[0].predicted, 200.0, epsilon = 1e-6);
	assert_relative_eq!(forecast.predictions[29].predicted, 490.0, epsilon = 1e-6);

	let spent = (0..10).map(|day| 100.0 + 10.0 * day as f64).sum::<f64>();
	let predicted = forecast.predictions.iter().map(|each| each.predicted).sum::<f64>();
	assert_relative_eq!(forecast.current_value, spent);
	assert_relative_eq!(forecast.total_value, spent + predicted, epsilon = 1e-6);

	let confidences = forecast
		.predictions
		.iter()
		.map(|each| each.confidence)
		.collect::<Vec<_>>();
	assert!(confidences.windows(2).all(|pair| pair[1] <= pair[0]));
}

#[test]
fn single_expense_falls_back_to_burn_rate() {
	let mut record = project("single", 100_000.0, 0.1);
	record.expenses = vec![Expense {
		date: start_date(),
		amount: 10_000.0,
		description: String::from("mobilisation"),
	}];
	let engine = engine_with(vec![snapshot(record.clone(), Vec::new())]);
	let now = at(30);

	let forecast = engine.generate_cost_forecast("single", now).unwrap();
	let remaining_days = (record.planned_end_date - now.date_naive()).num_days() as f64;
	assert_relative_eq!(
		forecast.predictions[0].predicted,
		90_000.0 / remaining_days,
		epsilon = 1e-6
	);
	assert!(forecast.low_confidence);
}

#[test]
fn high_utilization_raises_exactly_one_budget_warning() {
	let mut record = project("hot", 100_000.0, 0.95);
	record.expenses = vec![Expense {
		date: start_date(),
		amount: 95_000.0,
		description: String::from("structure"),
	}];
	let now = at(346);

	let features = extract_features(&record, &[], &[], &[], now);
	assert_relative_eq!(features.value("budget_utilization"), 0.95);

	let warnings = detect_warnings(
		&features,
		&ForecastSignals::default(),
		&EngineConfig::default().thresholds,
	);
	let budget_high = warnings
		.iter()
		.filter(|each| each.category == WarningCategory::Budget && each.severity == Severity::High)
		.count();
	assert_eq!(budget_high, 1);
	assert_eq!(warnings.len(), 1);
}

#[test]
fn overall_risk_level_bands_the_mean_score() {
	let predictions = [80.0, 60.0, 10.0]
		.into_iter()
		.zip([
			RiskCategory::Safety,
			RiskCategory::Schedule,
			RiskCategory::Regulatory,
		])
		.map(|(score, category)| PredictedRisk {
			category,
			probability: score / 100.0,
			impact: 100.0,
			risk_score: score,
			severity: Severity::from_score(score),
			trigger_indicators: Vec::new(),
			mitigation_strategies: Vec::new(),
		})
		.collect::<Vec<_>>();

	let severities = predictions.iter().map(|each| each.severity).collect::<Vec<_>>();
	assert_eq!(severities, vec![Severity::Critical, Severity::High, Severity::Low]);

	let (mean, level) = summarize_predicted_risks(&predictions);
	assert_relative_eq!(mean, 50.0);
	assert_eq!(level, Severity::from_score(mean));
}

#[test]
fn sparse_risk_history_uses_category_frequencies() {
	let risks = vec![
		risk(1, RiskCategory::Safety, 0.6, 45.0),
		risk(2, RiskCategory::Safety, 0.5, 40.0),
		risk(3, RiskCategory::Financial, 0.4, 20.0),
	];
	let engine = engine_with(vec![snapshot(project("risky", 200_000.0, 0.3), risks)]);

	let forecast = engine.generate_risk_forecast("risky", at(60)).unwrap();

	assert_eq!(forecast.method, ForecastMethod::FrequencyFallback);
	assert!(forecast.low_confidence);
	assert_eq!(forecast.predictions.len(), RiskCategory::COUNT);
	for each in forecast.predictions.iter() {
		assert!((0.0..=1.0).contains(&each.probability));
		assert!((0.0..=100.0).contains(&each.impact));
		assert_relative_eq!(each.risk_score, each.probability * each.impact);
		assert_eq!(each.severity, Severity::from_score(each.risk_score));
		assert!(!each.mitigation_strategies.is_empty());
	}

	let (mean, level) = summarize_predicted_risks(&forecast.predictions);
	assert_relative_eq!(forecast.total_value, mean);
	assert_eq!(forecast.risk_level, level);
	assert_relative_eq!(forecast.current_value, 42.5);
}

#[test]
fn scenario_probabilities_always_sum_to_one() {
	let mut record = project("scenario", 250_000.0, 0.4);
	record.expenses = daily_expenses(0, 40, |_| 1_000.0);
	let engine = engine_with(vec![snapshot(record, Vec::new())]);

	let analysis = engine.generate_scenario_analysis("scenario", at(120)).unwrap();
	assert!((analysis.total_probability() - 1.0).abs() < 1e-9);
	assert_eq!(analysis.scenarios().count(), 3);
	assert!(analysis
		.scenarios()
		.all(|each| each.outcomes.risk_level == Severity::from_score(each.outcomes.overall_risk)));
}

#[test]
fn file_store_serves_the_latest_forecast() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("forecasts.jsonl");

	let mut source = MemoryDataSource::new();
	source.insert(snapshot(project("stored", 120_000.0, 0.5), Vec::new()));
	let engine =
		ForecastEngine::new(EngineConfig::default(), source, JsonLinesForecastStore::new(&path))
			.unwrap();

	let first = engine.generate_cost_forecast("stored", at(10)).unwrap();
	let second = engine.generate_cost_forecast("stored", at(11)).unwrap();
	assert_ne!(first.forecast_id, second.forecast_id);

	let latest = engine.latest_cost_forecast("stored", at(12)).unwrap().unwrap();
	assert_eq!(latest.forecast_id, second.forecast_id);
	assert!(engine.latest_risk_forecast("stored", at(12)).unwrap().is_none());

	assert_eq!(engine.purge_expired(at(17)).unwrap(), 1);
	assert_eq!(engine.store().purge_expired(at(40)).unwrap(), 1);
	assert!(engine.latest_cost_forecast("stored", at(12)).unwrap().is_none());
}
