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

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use super::typedef::*;
use crate::config::EngineConfig;
use crate::feature::{helper::ratio, typedef::*};
use crate::source::typedef::{ExternalFactor, ProjectRecord};
use crate::typedef::{FeatureVector, Severity};

/// Relative weight of each driver on the total outcome. Sums to 1.
const SENSITIVITY: [(&str, f64); 5] = [
	("material_costs", 0.35),
	("labor_productivity", 0.25),
	("weather_conditions", 0.15),
	("schedule_delays", 0.15),
	("regulatory_changes", 0.10),
];

const PRESSURE_POINTS: f64 = 10f64;

/// Baseline, optimistic and pessimistic outlooks for one project.
///
/// Works from the feature vector only, so it never waits on model training.
pub fn generate_scenarios(
	project: &ProjectRecord,
	features: &FeatureVector,
	factors: &[ExternalFactor],
	config: &EngineConfig,
	now: DateTime<Utc>,
) -> ScenarioAnalysis {
	let settings = &config.scenarios;
	let baseline_outcome = baseline_outcome(project, features, factors);

	let probabilities = normalize_probabilities([
		settings.baseline_probability,
		settings.optimistic.probability,
		settings.pessimistic.probability,
	]);

	let baseline = Scenario {
		scenario_id: Uuid::new_v4(),
		kind: ScenarioKind::Baseline,
		name: String::from("Baseline"),
		assumptions: vec![
			String::from("Current cost performance continues to completion"),
			String::from("Current progress rate continues to completion"),
			String::from("Risk exposure stays at the logged level"),
		],
		probability: probabilities[0],
		outcomes: baseline_outcome.clone(),
	};

	let optimistic = alternative(
		ScenarioKind::Optimistic,
		"Optimistic",
		&baseline_outcome,
		&settings.optimistic,
		probabilities[1],
	);
	let pessimistic = alternative(
		ScenarioKind::Pessimistic,
		"Pessimistic",
		&baseline_outcome,
		&settings.pessimistic,
		probabilities[2],
	);
	let alternatives = vec![optimistic, pessimistic];

	let comparison = compare(&baseline, &alternatives);
	let recommendations = recommendations(project, features, &baseline, &alternatives, config);

	info!(
		"Scenario analysis for {}: expected cost {:.2}, baseline risk {:.1}",
		project.id, comparison.expected_cost, baseline.outcomes.overall_risk
	);

	ScenarioAnalysis {
		analysis_id: Uuid::new_v4(),
		project_id: project.id.clone(),
		baseline,
		alternatives,
		comparison,
		sensitivity: SENSITIVITY
			.iter()
			.map(|(factor, impact_weight)| SensitivityFactor {
				factor: factor.to_string(),
				impact_weight: *impact_weight,
			})
			.collect(),
		recommendations,
		generated_at: now,
		expires_at: now + config.expiry(),
	}
}

pub fn baseline_outcome(
	project: &ProjectRecord,
	features: &FeatureVector,
	factors: &[ExternalFactor],
) -> ScenarioOutcome {
	let planned_total = project.planned_total();
	let estimate_at_completion = if features.value(PLANNED_PROGRESS) > 0f64 {
		planned_total * (1f64 + features.value(COST_VARIANCE))
	} else {
		planned_total
	};
	let total_cost = estimate_at_completion.max(project.spent_to_date());

	let elapsed = features.value(ELAPSED_DAYS);
	let completion_date = if project.progress > 0f64 && elapsed > 0f64 {
		let projected_days = (elapsed / project.progress.min(1f64)).round() as i64;
		shift_date(project.start_date, projected_days).unwrap_or(project.planned_end_date)
	} else {
		project.planned_end_date
	};

	let overall_risk =
		(features.value(AVERAGE_RISK_SCORE) + external_pressure(features, factors)).clamp(0f64, 100f64);

	ScenarioOutcome {
		total_cost,
		completion_date,
		overall_risk,
		quality_score: features.value(QUALITY_SCORE),
		risk_level: Severity::from_score(overall_risk),
	}
}

// None when the shift leaves the representable calendar.
fn shift_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
	Duration::try_days(days).and_then(|shift| date.checked_add_signed(shift))
}

fn external_pressure(features: &FeatureVector, factors: &[ExternalFactor]) -> f64 {
	let rising = ratio(
		factors
			.iter()
			.map(|each| each.trend.clamp(0f64, 1f64))
			.sum(),
		factors.len() as f64,
	);

	PRESSURE_POINTS
		* (features.value(WEATHER_RISK).clamp(0f64, 1f64)
			+ features.value(MARKET_VOLATILITY).clamp(0f64, 1f64)
			+ rising)
}

fn alternative(
	kind: ScenarioKind,
	name: &str,
	baseline: &ScenarioOutcome,
	delta: &ScenarioDelta,
	probability: f64,
) -> Scenario {
	let overall_risk = (baseline.overall_risk + delta.risk_delta).clamp(0f64, 100f64);

	Scenario {
		scenario_id: Uuid::new_v4(),
		kind,
		name: name.to_string(),
		assumptions: vec![
			format!("Costs scale by {:.2} against the baseline", delta.cost_multiplier),
			format!("Completion moves by {:+} days", delta.schedule_days),
			format!("Risk shifts by {:+.0} points", delta.risk_delta),
			format!("Quality shifts by {:+.0} points", delta.quality_delta),
		],
		probability,
		outcomes: ScenarioOutcome {
			total_cost: (baseline.total_cost * delta.cost_multiplier).max(0f64),
			completion_date: shift_date(baseline.completion_date, delta.schedule_days)
				.unwrap_or(baseline.completion_date),
			overall_risk,
			quality_score: (baseline.quality_score + delta.quality_delta).clamp(0f64, 100f64),
			risk_level: Severity::from_score(overall_risk),
		},
	}
}

pub fn normalize_probabilities<const N: usize>(weights: [f64; N]) -> [f64; N] {
	let weights = weights.map(|each| if each.is_finite() { each.max(0f64) } else { 0f64 });
	let total = weights.iter().sum::<f64>();
	if total <= 0f64 {
		return [1f64 / N as f64; N];
	}

	weights.map(|each| each / total)
}

fn compare(baseline: &Scenario, alternatives: &[Scenario]) -> ScenarioComparison {
	let scenarios = std::iter::once(baseline)
		.chain(alternatives.iter())
		.collect::<Vec<_>>();

	let pick = |better: &dyn Fn(&Scenario, &Scenario) -> bool| {
		scenarios
			.iter()
			.copied()
			.skip(1)
			.fold(baseline, |chosen, each| {
				if better(each, chosen) {
					each
				} else {
					chosen
				}
			})
			.scenario_id
	};

	ScenarioComparison {
		best_case: pick(&|a, b| a.outcomes.overall_risk < b.outcomes.overall_risk),
		worst_case: pick(&|a, b| a.outcomes.overall_risk > b.outcomes.overall_risk),
		most_likely: pick(&|a, b| a.probability > b.probability),
		expected_cost: scenarios
			.iter()
			.map(|each| each.probability * each.outcomes.total_cost)
			.sum(),
	}
}

fn recommendations(
	project: &ProjectRecord,
	features: &FeatureVector,
	baseline: &Scenario,
	alternatives: &[Scenario],
	config: &EngineConfig,
) -> Vec<String> {
	let thresholds = &config.thresholds;
	let mut recommendations = Vec::<String>::new();

	let cost_variance = features.value(COST_VARIANCE);
	if cost_variance > thresholds.cost_variance {
		recommendations.push(format!(
			"Spending runs {:.0}% above planned value; review cost drivers and approvals",
			cost_variance * 100f64
		));
	}

	let schedule_variance = features.value(SCHEDULE_VARIANCE);
	if schedule_variance < thresholds.schedule_variance {
		recommendations.push(format!(
			"Progress trails the plan by {:.0}%; re-sequence the critical path",
			-schedule_variance * 100f64
		));
	}

	let planned_total = project.planned_total();
	let worst_cost = alternatives
		.iter()
		.map(|each| each.outcomes.total_cost)
		.fold(baseline.outcomes.total_cost, f64::max);
	if planned_total > 0f64 && worst_cost > planned_total {
		recommendations.push(format!(
			"Hold a contingency reserve of {:.2} for the downside scenario",
			worst_cost - planned_total
		));
	}

	if baseline.outcomes.risk_level >= Severity::High {
		recommendations.push(String::from(
			"Baseline risk is high; prioritise mitigation of open risks",
		));
	}

	if features.value(WEATHER_RISK) > thresholds.weather_risk {
		recommendations.push(String::from(
			"Weather exposure is elevated; schedule outdoor work with buffers",
		));
	}

	if baseline.outcomes.quality_score < thresholds.quality_score {
		recommendations.push(String::from(
			"Quality signals are weak; add inspections before handover",
		));
	}

	if recommendations.is_empty() {
		recommendations.push(String::from(
			"Project tracks within tolerances; keep the current monitoring cadence",
		));
	}

	recommendations
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use chrono::{NaiveDate, TimeZone};

	fn project(progress: f64) -> ProjectRecord {
		ProjectRecord {
			id: String::from("p-1"),
			name: String::from("Depot"),
			start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
			planned_end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
			planned_budget: 1_000_000.0,
			team_size: 10,
			progress,
			items: Vec::new(),
			expenses: Vec::new(),
		}
	}

	fn now() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 4, 11, 0, 0, 0).unwrap()
	}

	fn features() -> FeatureVector {
		[
			(PLANNED_PROGRESS, 0.25),
			(COST_VARIANCE, 0.1),
			(ELAPSED_DAYS, 100.0),
			(AVERAGE_RISK_SCORE, 40.0),
			(QUALITY_SCORE, 80.0),
		]
		.into_iter()
		.collect()
	}

	#[test]
	fn probabilities_sum_to_one() {
		let analysis = generate_scenarios(
			&project(0.25),
			&features(),
			&[],
			&EngineConfig::default(),
			now(),
		);
		assert!((analysis.total_probability() - 1.0).abs() < 1e-9);
		assert_eq!(analysis.alternatives.len(), 2);

		let mut config = EngineConfig::default();
		config.scenarios.baseline_probability = 0.5;
		config.scenarios.optimistic.probability = 0.5;
		config.scenarios.pessimistic.probability = 0.5;
		let analysis = generate_scenarios(&project(0.25), &features(), &[], &config, now());
		assert!((analysis.total_probability() - 1.0).abs() < 1e-9);
	}

	#[test]
	fn degenerate_weights_split_evenly() {
		let split = normalize_probabilities([0.0, -1.0, f64::NAN]);
		assert_relative_eq!(split[0], 1.0 / 3.0);
		assert_relative_eq!(split.iter().sum::<f64>(), 1.0);
	}

	#[test]
	fn baseline_projects_current_performance() {
		let outcome = baseline_outcome(&project(0.25), &features(), &[]);
		assert_relative_eq!(outcome.total_cost, 1_100_000.0, epsilon = 1e-6);
		assert_eq!(
			outcome.completion_date,
			NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(400)
		);
		assert_relative_eq!(outcome.overall_risk, 40.0);
		assert_eq!(outcome.risk_level, Severity::Medium);
	}

	#[test]
	fn baseline_without_progress_keeps_the_plan() {
		let outcome = baseline_outcome(&project(0.0), &FeatureVector::new(), &[]);
		assert_relative_eq!(outcome.total_cost, 1_000_000.0);
		assert_eq!(
			outcome.completion_date,
			NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
		);
	}

	#[test]
	fn crawling_progress_keeps_the_planned_end() {
		let mut inputs = features();
		inputs.set(ELAPSED_DAYS, 100.0);
		let outcome = baseline_outcome(&project(1e-6), &inputs, &[]);
		assert_eq!(
			outcome.completion_date,
			NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
		);

		let analysis = generate_scenarios(
			&project(1e-6),
			&inputs,
			&[],
			&EngineConfig::default(),
			now(),
		);
		assert_eq!(analysis.baseline.outcomes.completion_date, outcome.completion_date);
		assert!((analysis.total_probability() - 1.0).abs() < 1e-9);
	}

	#[test]
	fn oversized_schedule_shift_keeps_the_baseline_date() {
		let mut config = EngineConfig::default();
		config.scenarios.pessimistic.schedule_days = i64::MAX;
		let analysis = generate_scenarios(&project(0.25), &features(), &[], &config, now());
		assert_eq!(
			analysis.alternatives[1].outcomes.completion_date,
			analysis.baseline.outcomes.completion_date
		);
	}

	#[test]
	fn external_pressure_raises_risk() {
		let mut inputs = features();
		inputs.set(WEATHER_RISK, 0.5);
		let factors = [ExternalFactor {
			category: String::from("steel price"),
			current_value: 1.2,
			trend: 0.5,
		}];

		let outcome = baseline_outcome(&project(0.25), &inputs, &factors);
		assert_relative_eq!(outcome.overall_risk, 50.0);
		assert_eq!(outcome.risk_level, Severity::High);
	}

	#[test]
	fn alternatives_shift_the_baseline() {
		let mut inputs = features();
		inputs.set(AVERAGE_RISK_SCORE, 55.0);
		let analysis =
			generate_scenarios(&project(0.25), &inputs, &[], &EngineConfig::default(), now());

		let optimistic = &analysis.alternatives[0];
		let pessimistic = &analysis.alternatives[1];
		assert_eq!(optimistic.kind, ScenarioKind::Optimistic);
		assert_relative_eq!(optimistic.outcomes.total_cost, 990_000.0, epsilon = 1e-6);
		assert_relative_eq!(pessimistic.outcomes.overall_risk, 75.0);
		assert_eq!(pessimistic.outcomes.risk_level, Severity::Critical);
		assert_eq!(
			pessimistic.outcomes.completion_date,
			analysis.baseline.outcomes.completion_date + Duration::days(30)
		);

		assert_eq!(analysis.comparison.best_case, optimistic.scenario_id);
		assert_eq!(analysis.comparison.worst_case, pessimistic.scenario_id);
		assert_eq!(analysis.comparison.most_likely, analysis.baseline.scenario_id);
		assert_relative_eq!(
			analysis.comparison.expected_cost,
			0.6 * 1_100_000.0 + 0.2 * 990_000.0 + 0.2 * 1_430_000.0,
			epsilon = 1e-6
		);
	}

	#[test]
	fn sensitivity_and_recommendations_are_filled() {
		let analysis = generate_scenarios(
			&project(0.25),
			&features(),
			&[],
			&EngineConfig::default(),
			now(),
		);
		let weights = analysis
			.sensitivity
			.iter()
			.map(|each| each.impact_weight)
			.sum::<f64>();
		assert_relative_eq!(weights, 1.0);
		assert!(analysis
			.recommendations
			.iter()
			.any(|each| each.contains("contingency")));
		assert_eq!(analysis.expires_at, now() + Duration::days(7));
	}
}
