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

pub const PROJECT_SIZE: &str = "project_size";
pub const TEAM_SIZE: &str = "team_size";
pub const TOTAL_DURATION_DAYS: &str = "total_duration_days";
pub const ELAPSED_DAYS: &str = "elapsed_days";
pub const REMAINING_DAYS: &str = "remaining_days";
pub const PROGRESS: &str = "progress";
pub const PLANNED_PROGRESS: &str = "planned_progress";
pub const ITEM_COUNT: &str = "item_count";
pub const EXPENSE_COUNT: &str = "expense_count";
pub const SPENT_TO_DATE: &str = "spent_to_date";

pub const BUDGET_UTILIZATION: &str = "budget_utilization";
pub const COST_VARIANCE: &str = "cost_variance";
pub const SCHEDULE_VARIANCE: &str = "schedule_variance";

pub const RISK_TREND: &str = "risk_trend";
pub const RISK_RESOLUTION_RATE: &str = "risk_resolution_rate";
pub const RISK_COUNT_TOTAL: &str = "risk_count_total";
pub const OPEN_RISK_COUNT: &str = "open_risk_count";
pub const AVERAGE_RISK_SCORE: &str = "average_risk_score";
pub const MAX_RISK_SCORE: &str = "max_risk_score";

pub const QUALITY_SCORE: &str = "quality_score";
pub const REPORT_COUNT: &str = "report_count";
pub const AVERAGE_WORKERS: &str = "average_workers";
pub const REPORTED_PROGRESS: &str = "reported_progress";

pub const ECONOMIC_INDEX: &str = "economic_index";
pub const WEATHER_RISK: &str = "weather_risk";
pub const MARKET_VOLATILITY: &str = "market_volatility";

pub const PEAK_SEASON: &str = "peak_season";
pub const HOLIDAY_SEASON: &str = "holiday_season";

// Keyword hits in daily report comments that count against the quality score.
pub(super) const NEGATIVE_KEYWORDS: [&str; 9] = [
	"delay", "issue", "problem", "defect", "accident", "incident", "rework", "shortage",
	"damage",
];

pub(super) const POSITIVE_KEYWORDS: [&str; 6] = [
	"completed",
	"ahead",
	"on schedule",
	"resolved",
	"passed",
	"approved",
];

pub fn risk_count(category: crate::typedef::RiskCategory) -> String {
	format!("risk_count_{}", category.name())
}

pub fn factor(name: &str) -> String {
	format!("factor_{}", name)
}

pub fn factor_trend(name: &str) -> String {
	format!("factor_{}_trend", name)
}
