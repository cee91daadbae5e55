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
use strum::IntoEnumIterator;

use super::helper::*;
use super::typedef::*;
use crate::source::typedef::{DailyReport, ExternalFactor, ProjectRecord, RiskRecord, RiskStatus};
use crate::typedef::{FeatureVector, RiskCategory};

/// Turns one project's records into the fixed feature schema.
///
/// Deterministic for identical inputs, `now` included. Never fails: anything missing
/// or degenerate produces zero-valued features.
pub fn extract_features(
	project: &ProjectRecord,
	risks: &[RiskRecord],
	factors: &[ExternalFactor],
	reports: &[DailyReport],
	now: DateTime<Utc>,
) -> FeatureVector {
	let mut features = FeatureVector::new();

	// Size and duration
	let total_days = project.total_duration_days();
	let elapsed_days = project.elapsed_days(now);
	let planned_total = project.planned_total();
	let spent = project.spent_to_date();
	let planned_progress = project.planned_progress(now);

	features.set(PROJECT_SIZE, planned_total);
	features.set(TEAM_SIZE, project.team_size as f64);
	features.set(TOTAL_DURATION_DAYS, total_days as f64);
	features.set(ELAPSED_DAYS, elapsed_days as f64);
	features.set(REMAINING_DAYS, (total_days - elapsed_days).max(0) as f64);
	features.set(PROGRESS, project.progress);
	features.set(PLANNED_PROGRESS, planned_progress);
	features.set(ITEM_COUNT, project.items.len() as f64);
	features.set(EXPENSE_COUNT, project.expenses.len() as f64);
	features.set(SPENT_TO_DATE, spent);

	// Budget and schedule
	let planned_value = planned_total * planned_progress;
	features.set(BUDGET_UTILIZATION, ratio(spent, planned_total));
	features.set(COST_VARIANCE, ratio(spent - planned_value, planned_value));
	features.set(
		SCHEDULE_VARIANCE,
		ratio(project.progress - planned_progress, planned_progress),
	);

	// Risks
	let mut ordered_risks = risks.iter().collect::<Vec<_>>();
	ordered_risks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

	let closed = risks
		.iter()
		.filter(|each| each.status == RiskStatus::Closed)
		.count();
	let open = risks.iter().filter(|each| each.status.is_open()).count();
	let total_score = risks.iter().map(|each| each.risk_score).sum::<f64>();
	let max_score = risks
		.iter()
		.map(|each| each.risk_score)
		.fold(0f64, f64::max);

	features.set(RISK_TREND, risk_trend(&ordered_risks));
	features.set(RISK_RESOLUTION_RATE, ratio(closed as f64, risks.len() as f64));
	features.set(RISK_COUNT_TOTAL, risks.len() as f64);
	features.set(OPEN_RISK_COUNT, open as f64);
	features.set(AVERAGE_RISK_SCORE, ratio(total_score, risks.len() as f64));
	features.set(MAX_RISK_SCORE, max_score);

	for category in RiskCategory::iter() {
		let count = risks.iter().filter(|each| each.category == category).count();
		features.set(risk_count(category), count as f64);
	}

	// Daily reports
	let (issues, positives) = count_report_signals(reports);
	let total_workers = reports.iter().map(|each| each.workers as f64).sum::<f64>();
	let reported_progress = reports
		.iter()
		.max_by_key(|each| each.date)
		.map(|each| each.progress)
		.unwrap_or_default();

	features.set(QUALITY_SCORE, quality_score(issues, positives));
	features.set(REPORT_COUNT, reports.len() as f64);
	features.set(AVERAGE_WORKERS, ratio(total_workers, reports.len() as f64));
	features.set(REPORTED_PROGRESS, reported_progress);

	// External factors, the three well-known ones always present
	features.set(ECONOMIC_INDEX, 0f64);
	features.set(WEATHER_RISK, 0f64);
	features.set(MARKET_VOLATILITY, 0f64);
	for each in factors {
		let name = normalize_factor_name(&each.category);
		if name.is_empty() {
			continue;
		}

		if [ECONOMIC_INDEX, WEATHER_RISK, MARKET_VOLATILITY].contains(&name.as_str()) {
			features.set(name.clone(), each.current_value);
		}
		features.set(factor(&name), each.current_value);
		features.set(factor_trend(&name), each.trend);
	}

	// Calendar
	features.set(PEAK_SEASON, if is_peak_season(now) { 1f64 } else { 0f64 });
	features.set(
		HOLIDAY_SEASON,
		if is_holiday_season(now) { 1f64 } else { 0f64 },
	);

	features
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::source::typedef::{BudgetItem, Expense};
	use crate::typedef::Severity;
	use approx::assert_relative_eq;
	use chrono::{NaiveDate, TimeZone};

	fn project() -> ProjectRecord {
		ProjectRecord {
			id: String::from("p-1"),
			name: String::from("Warehouse"),
			start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
			planned_end_date: NaiveDate::from_ymd_opt(2025, 5, 11).unwrap(),
			planned_budget: 10_000f64,
			team_size: 12,
			progress: 0.4,
			items: vec![BudgetItem {
				name: String::from("Concrete"),
				planned_amount: 4_000f64,
				actual_amount: 3_000f64,
			}],
			expenses: vec![
				Expense {
					date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
					amount: 2_000f64,
					description: String::new(),
				},
				Expense {
					date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
					amount: 3_000f64,
					description: String::new(),
				},
			],
		}
	}

	fn risks() -> Vec<RiskRecord> {
		[
			(RiskCategory::Safety, 40f64, RiskStatus::Open),
			(RiskCategory::Financial, 60f64, RiskStatus::Closed),
			(RiskCategory::Safety, 20f64, RiskStatus::Mitigated),
		]
		.into_iter()
		.enumerate()
		.map(|(index, (category, score, status))| RiskRecord {
			id: format!("r-{}", index),
			category,
			severity: Severity::Medium,
			probability: 0.5,
			risk_score: score,
			priority_level: 2,
			status,
			mitigation_plan: None,
			created_at: Utc
				.with_ymd_and_hms(2025, 1, 5 + index as u32, 0, 0, 0)
				.unwrap(),
		})
		.collect()
	}

	fn now() -> DateTime<Utc> {
		// 50 of 130 planned days have passed
		Utc.with_ymd_and_hms(2025, 2, 20, 9, 30, 0).unwrap()
	}

	#[test]
	fn computes_budget_and_schedule_ratios() {
		let features = extract_features(&project(), &[], &[], &[], now());
		assert_eq!(features.value(TOTAL_DURATION_DAYS), 130f64);
		assert_eq!(features.value(ELAPSED_DAYS), 50f64);
		assert_eq!(features.value(REMAINING_DAYS), 80f64);
		assert_relative_eq!(features.value(BUDGET_UTILIZATION), 0.5);

		let planned_progress = 50f64 / 130f64;
		assert_relative_eq!(features.value(PLANNED_PROGRESS), planned_progress);
		assert_relative_eq!(
			features.value(SCHEDULE_VARIANCE),
			(0.4 - planned_progress) / planned_progress
		);
		let planned_value = 10_000f64 * planned_progress;
		assert_relative_eq!(
			features.value(COST_VARIANCE),
			(5_000f64 - planned_value) / planned_value
		);
	}

	#[test]
	fn counts_risks_per_category() {
		let features = extract_features(&project(), &risks(), &[], &[], now());
		assert_eq!(features.value(&risk_count(RiskCategory::Safety)), 2f64);
		assert_eq!(features.value(&risk_count(RiskCategory::Financial)), 1f64);
		assert_eq!(features.value(&risk_count(RiskCategory::Quality)), 0f64);
		assert_eq!(features.value(OPEN_RISK_COUNT), 1f64);
		assert_relative_eq!(features.value(RISK_RESOLUTION_RATE), 1f64 / 3f64);
		assert_relative_eq!(features.value(AVERAGE_RISK_SCORE), 40f64);
		assert_eq!(features.value(MAX_RISK_SCORE), 60f64);
	}

	#[test]
	fn reads_reports_and_factors() {
		let reports = vec![
			DailyReport {
				date: NaiveDate::from_ymd_opt(2025, 2, 18).unwrap(),
				comments: String::from("Pour delayed by a rebar shortage"),
				progress: 0.38,
				issues: vec![String::from("Crane inspection overdue")],
				workers: 10,
			},
			DailyReport {
				date: NaiveDate::from_ymd_opt(2025, 2, 19).unwrap(),
				comments: String::from("Slab inspection passed, level 2 completed"),
				progress: 0.4,
				issues: Vec::new(),
				workers: 14,
			},
		];
		let factors = vec![
			ExternalFactor {
				category: String::from("Weather Risk"),
				current_value: 0.8,
				trend: 0.1,
			},
			ExternalFactor {
				category: String::from("steel-price"),
				current_value: 1.2,
				trend: -0.05,
			},
		];

		let features = extract_features(&project(), &[], &factors, &reports, now());
		// 3 issues ("delay", "shortage", one listed), 2 positives
		assert_eq!(features.value(QUALITY_SCORE), 74f64);
		assert_eq!(features.value(AVERAGE_WORKERS), 12f64);
		assert_eq!(features.value(REPORTED_PROGRESS), 0.4);
		assert_eq!(features.value(WEATHER_RISK), 0.8);
		assert_eq!(features.value(ECONOMIC_INDEX), 0f64);
		assert_eq!(features.value(&factor("steel_price")), 1.2);
		assert_eq!(features.value(&factor_trend("steel_price")), -0.05);
	}

	#[test]
	fn empty_inputs_degrade_to_zero() {
		let mut empty = project();
		empty.planned_budget = 0f64;
		empty.items.clear();
		empty.expenses.clear();
		empty.planned_end_date = empty.start_date;

		let features = extract_features(&empty, &[], &[], &[], now());
		assert_eq!(features.value(BUDGET_UTILIZATION), 0f64);
		assert_eq!(features.value(COST_VARIANCE), 0f64);
		assert_eq!(features.value(SCHEDULE_VARIANCE), 0f64);
		assert_eq!(features.value(RISK_TREND), 0f64);
		assert_eq!(features.value(RISK_RESOLUTION_RATE), 0f64);
		assert_eq!(features.value(QUALITY_SCORE), 100f64);
		assert!(features.iter().all(|(_, value)| value.is_finite()));
	}

	#[test]
	fn seasonal_flags_follow_calendar() {
		let winter = Utc.with_ymd_and_hms(2025, 12, 15, 0, 0, 0).unwrap();
		let features = extract_features(&project(), &[], &[], &[], winter);
		assert_eq!(features.value(PEAK_SEASON), 0f64);
		assert_eq!(features.value(HOLIDAY_SEASON), 1f64);

		let summer = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
		let features = extract_features(&project(), &[], &[], &[], summer);
		assert_eq!(features.value(PEAK_SEASON), 1f64);
		assert_eq!(features.value(HOLIDAY_SEASON), 0f64);
	}

	#[test]
	fn extraction_is_bit_identical() {
		let first = extract_features(&project(), &risks(), &[], &[], now());
		let second = extract_features(&project(), &risks(), &[], &[], now());
		assert_eq!(first.len(), second.len());
		for ((name_a, a), (name_b, b)) in first.iter().zip(second.iter()) {
			assert_eq!(name_a, name_b);
			assert_eq!(a.to_bits(), b.to_bits());
		}
	}
}
