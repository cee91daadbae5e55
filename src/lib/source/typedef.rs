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

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::typedef::{RiskCategory, Severity};

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
	pub name: String,
	pub planned_amount: f64,
	#[serde(default)]
	pub actual_amount: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
	pub date: NaiveDate,
	pub amount: f64,
	#[serde(default)]
	pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
	pub id: String,
	pub name: String,
	pub start_date: NaiveDate,
	pub planned_end_date: NaiveDate,
	#[serde(default)]
	pub planned_budget: f64,
	#[serde(default)]
	pub team_size: u32,
	#[serde(default)]
	pub progress: f64,
	#[serde(default)]
	pub items: Vec<BudgetItem>,
	#[serde(default)]
	pub expenses: Vec<Expense>,
}

impl ProjectRecord {
	pub fn planned_total(&self) -> f64 {
		if self.planned_budget > 0f64 {
			self.planned_budget
		} else {
			self.items.iter().map(|each| each.planned_amount).sum()
		}
	}

	pub fn spent_to_date(&self) -> f64 {
		if self.expenses.is_empty() {
			self.items.iter().map(|each| each.actual_amount).sum()
		} else {
			self.expenses.iter().map(|each| each.amount).sum()
		}
	}

	pub fn total_duration_days(&self) -> i64 {
		(self.planned_end_date - self.start_date).num_days().max(0)
	}

	pub fn elapsed_days(&self, now: DateTime<Utc>) -> i64 {
		(now.date_naive() - self.start_date).num_days().max(0)
	}

	/// Share of the planned duration that has passed, capped at 1.
	pub fn planned_progress(&self, now: DateTime<Utc>) -> f64 {
		let total = self.total_duration_days();
		if total == 0 {
			return 0f64;
		}

		(self.elapsed_days(now) as f64 / total as f64).min(1f64)
	}
}

#[derive(Default, PartialEq, Eq, Deserialize, Serialize, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum RiskStatus {
	#[default]
	Open,
	Monitoring,
	Mitigated,
	Closed,
}

impl RiskStatus {
	pub fn is_open(self) -> bool {
		matches!(self, RiskStatus::Open | RiskStatus::Monitoring)
	}
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RiskRecord {
	pub id: String,
	pub category: RiskCategory,
	pub severity: Severity,
	pub probability: f64,
	// Score in `[0, 100]`, usually probability times impact.
	pub risk_score: f64,
	#[serde(default)]
	pub priority_level: u8,
	#[serde(default)]
	pub status: RiskStatus,
	#[serde(default)]
	pub mitigation_plan: Option<String>,
	pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
	pub date: NaiveDate,
	#[serde(default)]
	pub comments: String,
	#[serde(default)]
	pub progress: f64,
	#[serde(default)]
	pub issues: Vec<String>,
	#[serde(default)]
	pub workers: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExternalFactor {
	pub category: String,
	pub current_value: f64,
	#[serde(default)]
	pub trend: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
	pub project: ProjectRecord,
	#[serde(default)]
	pub risks: Vec<RiskRecord>,
	#[serde(default)]
	pub reports: Vec<DailyReport>,
	#[serde(default)]
	pub factors: Vec<ExternalFactor>,
}
