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

use chrono::{DateTime, Datelike, Utc};

use super::typedef::*;
use crate::source::typedef::{DailyReport, RiskRecord};

/// `numerator / denominator`, or 0 when the denominator is zero.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
	if denominator == 0f64 {
		0f64
	} else {
		numerator / denominator
	}
}

fn mean(values: &[f64]) -> f64 {
	ratio(values.iter().sum::<f64>(), values.len() as f64)
}

/// Relative change between the mean score of the latest risks and the earliest ones,
/// both windows `min(5, count)` wide. `risks` must be ordered by creation time.
pub(super) fn risk_trend(risks: &[&RiskRecord]) -> f64 {
	if risks.len() < 2 {
		return 0f64;
	}

	let window = risks.len().min(5);
	let scores = risks.iter().map(|each| each.risk_score).collect::<Vec<_>>();
	let prior = mean(&scores[..window]);
	let recent = mean(&scores[scores.len() - window..]);

	ratio(recent - prior, prior)
}

pub(super) fn count_report_signals(reports: &[DailyReport]) -> (usize, usize) {
	reports.iter().fold((0usize, 0usize), |(issues, positives), each| {
		let comments = each.comments.to_lowercase();
		let negative_hits = NEGATIVE_KEYWORDS
			.iter()
			.filter(|keyword| comments.contains(*keyword))
			.count();
		let positive_hits = POSITIVE_KEYWORDS
			.iter()
			.filter(|keyword| comments.contains(*keyword))
			.count();

		(
			issues + each.issues.len() + negative_hits,
			positives + positive_hits,
		)
	})
}

pub(super) fn quality_score(issues: usize, positives: usize) -> f64 {
	(100f64 - 10f64 * issues as f64 + 2f64 * positives as f64).clamp(0f64, 100f64)
}

pub(super) fn is_peak_season(now: DateTime<Utc>) -> bool {
	(4..=10).contains(&now.month())
}

pub(super) fn is_holiday_season(now: DateTime<Utc>) -> bool {
	matches!(now.month(), 12 | 1)
}

/// "Economic Index" and "economic-index" both become "economic_index".
pub(super) fn normalize_factor_name(name: &str) -> String {
	name.trim()
		.to_lowercase()
		.split(|c: char| !c.is_ascii_alphanumeric())
		.filter(|each| !each.is_empty())
		.collect::<Vec<_>>()
		.join("_")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::source::typedef::RiskStatus;
	use crate::typedef::{RiskCategory, Severity};
	use chrono::TimeZone;

	fn risk(score: f64, day: u32) -> RiskRecord {
		RiskRecord {
			id: format!("r-{}", day),
			category: RiskCategory::Technical,
			severity: Severity::Medium,
			probability: 0.5,
			risk_score: score,
			priority_level: 1,
			status: RiskStatus::Open,
			mitigation_plan: None,
			created_at: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
		}
	}

	#[test]
	fn trend_is_zero_for_short_history() {
		let only = risk(40f64, 1);
		assert_eq!(risk_trend(&[&only]), 0f64);
		assert_eq!(risk_trend(&[]), 0f64);
	}

	#[test]
	fn trend_compares_latest_to_earliest_window() {
		let risks = (1..=10)
			.map(|day| risk(if day <= 5 { 20f64 } else { 30f64 }, day))
			.collect::<Vec<_>>();
		let refs = risks.iter().collect::<Vec<_>>();
		approx::assert_relative_eq!(risk_trend(&refs), 0.5);
	}

	#[test]
	fn trend_is_zero_when_prior_mean_is_zero() {
		let risks = (1..=6)
			.map(|day| risk(if day == 6 { 50f64 } else { 0f64 }, day))
			.collect::<Vec<_>>();
		let refs = risks.iter().collect::<Vec<_>>();
		assert_eq!(risk_trend(&refs), 0f64);
	}

	#[test]
	fn quality_score_is_clamped() {
		assert_eq!(quality_score(0, 0), 100f64);
		assert_eq!(quality_score(0, 10), 100f64);
		assert_eq!(quality_score(3, 5), 80f64);
		assert_eq!(quality_score(20, 0), 0f64);
	}

	#[test]
	fn normalizes_factor_names() {
		assert_eq!(normalize_factor_name(" Economic Index "), "economic_index");
		assert_eq!(normalize_factor_name("weather-risk"), "weather_risk");
		assert_eq!(normalize_factor_name("Market  Volatility"), "market_volatility");
	}
}
