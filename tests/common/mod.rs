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

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use project_oracle_lib::model::typedef::FamilyConfig;
use project_oracle_lib::source::typedef::{
	Expense, ProjectRecord, ProjectSnapshot, RiskRecord, RiskStatus,
};
use project_oracle_lib::typedef::{RiskCategory, Severity};
use project_oracle_lib::EngineConfig;

pub fn start_date() -> NaiveDate {
	NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

pub fn at(day_offset: i64) -> DateTime<Utc> {
	let date = start_date() + Duration::days(day_offset);
	Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

pub fn project(id: &str, planned_budget: f64, progress: f64) -> ProjectRecord {
	ProjectRecord {
		id: id.to_string(),
		name: format!("Project {}", id),
		start_date: start_date(),
		planned_end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
		planned_budget,
		team_size: 12,
		progress,
		items: Vec::new(),
		expenses: Vec::new(),
	}
}

/// One expense per day starting at `first_day`, amounts produced by `amount(day_index)`.
pub fn daily_expenses(first_day: i64, days: usize, amount: impl Fn(usize) -> f64) -> Vec<Expense> {
	(0..days)
		.map(|index| Expense {
			date: start_date() + Duration::days(first_day + index as i64),
			amount: amount(index),
			description: String::from("materials"),
		})
		.collect()
}

pub fn risk(index: usize, category: RiskCategory, probability: f64, score: f64) -> RiskRecord {
	RiskRecord {
		id: format!("r-{:03}", index),
		category,
		severity: Severity::from_score(score),
		probability,
		risk_score: score,
		priority_level: 2,
		status: if index % 3 == 0 {
			RiskStatus::Closed
		} else {
			RiskStatus::Open
		},
		mitigation_plan: None,
		created_at: at(index as i64 * 3),
	}
}

pub fn snapshot(project: ProjectRecord, risks: Vec<RiskRecord>) -> ProjectSnapshot {
	ProjectSnapshot {
		project,
		risks,
		reports: Vec::new(),
		factors: Vec::new(),
	}
}

/// Small enough for a handful of CPU epochs per family.
pub fn tiny_config() -> EngineConfig {
	let family = FamilyConfig::new()
		.with_depth(1)
		.with_hidden_size(8)
		.with_num_heads(2)
		.with_epochs(3);

	EngineConfig {
		horizon: 5,
		cost_window: 8,
		risk_window: 4,
		recurrent: family.clone(),
		self_attention: family,
		..EngineConfig::default()
	}
}
