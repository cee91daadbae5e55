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

use super::typedef::*;
use crate::feature::typedef::*;
use crate::typedef::{FeatureVector, ForecastWarning, Severity, WarningCategory};

/// Checks features and forecast signals against the thresholds. Every rule is independent
/// and only fires when its input is present, so identical inputs give identical warnings.
pub fn detect_warnings(
	features: &FeatureVector,
	signals: &ForecastSignals,
	thresholds: &WarningThresholds,
) -> Vec<ForecastWarning> {
	let mut warnings = Vec::<ForecastWarning>::new();

	if let Some(utilization) = features.get(BUDGET_UTILIZATION) {
		if utilization > thresholds.budget_utilization {
			warnings.push(ForecastWarning::new(
				Severity::High,
				WarningCategory::Budget,
				format!("Budget utilization is at {:.1}%", utilization * 100f64),
				&[BUDGET_UTILIZATION],
				"Review remaining work against the remaining budget",
			));
		}
	}

	if let Some(variance) = features.get(SCHEDULE_VARIANCE) {
		if variance < thresholds.schedule_variance {
			warnings.push(ForecastWarning::new(
				Severity::High,
				WarningCategory::Schedule,
				format!("Progress is {:.1}% behind plan", -variance * 100f64),
				&[SCHEDULE_VARIANCE],
				"Re-plan the critical path or add resources",
			));
		}
	}

	if let Some(variance) = features.get(COST_VARIANCE) {
		if variance > thresholds.cost_variance {
			warnings.push(ForecastWarning::new(
				Severity::Medium,
				WarningCategory::Budget,
				format!("Spending is {:.1}% above planned value", variance * 100f64),
				&[COST_VARIANCE],
				"Investigate cost drivers and tighten approvals",
			));
		}
	}

	if let Some(projected) = signals.projected_budget_ratio {
		if projected > thresholds.projected_budget_ratio {
			warnings.push(ForecastWarning::new(
				Severity::High,
				WarningCategory::Budget,
				format!(
					"Projected spending reaches {:.1}% of the budget",
					projected * 100f64
				),
				&["projected_budget_ratio"],
				"Prepare a budget revision or cut scope",
			));
		}
	}

	for (category, score) in signals.category_scores.iter() {
		if *score >= thresholds.critical_risk_score {
			warnings.push(ForecastWarning::new(
				Severity::from_score(*score),
				WarningCategory::Risk,
				format!("Predicted {} risk score is {:.1}", category, score),
				&[category.name()],
				format!("Escalate {} risk mitigation immediately", category),
			));
		}
	}

	if let Some(trend) = features.get(RISK_TREND) {
		if trend > thresholds.risk_trend {
			warnings.push(ForecastWarning::new(
				Severity::Medium,
				WarningCategory::Risk,
				format!("Risk scores rose {:.1}% over recent entries", trend * 100f64),
				&[RISK_TREND],
				"Review newly logged risks and their owners",
			));
		}
	}

	if let Some(quality) = features.get(QUALITY_SCORE) {
		if quality < thresholds.quality_score {
			warnings.push(ForecastWarning::new(
				Severity::Medium,
				WarningCategory::Quality,
				format!("Site quality score dropped to {:.0}", quality),
				&[QUALITY_SCORE],
				"Increase inspections and follow up on reported issues",
			));
		}
	}

	if let Some(weather) = features.get(WEATHER_RISK) {
		if weather > thresholds.weather_risk {
			warnings.push(ForecastWarning::new(
				Severity::Medium,
				WarningCategory::External,
				format!("Weather risk index is {:.2}", weather),
				&[WEATHER_RISK],
				"Schedule weather-sensitive work around the outlook",
			));
		}
	}

	warnings
}
