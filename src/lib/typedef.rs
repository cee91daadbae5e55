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
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
	pub timestamp: DateTime<Utc>,
	pub value: f64,
	pub is_anomaly: bool,
}

#[derive(Default, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
	pub fn new() -> Self {
		Self::default()
	}

	// Non-finite values are stored as zero.
	pub fn set(&mut self, name: impl Into<String>, value: f64) {
		let value = if value.is_finite() { value } else { 0f64 };
		self.0.insert(name.into(), value);
	}

	pub fn get(&self, name: &str) -> Option<f64> {
		self.0.get(name).copied()
	}

	pub fn value(&self, name: &str) -> f64 {
		self.get(name).unwrap_or_default()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.0.iter().map(|(name, value)| (name.as_str(), *value))
	}
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureVector {
	fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
		let mut features = FeatureVector::new();
		for (name, value) in iter {
			features.set(name, value);
		}
		features
	}
}

#[derive(
	Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, Clone, Copy, Debug,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	#[default]
	Low,
	Medium,
	High,
	Critical,
}

impl Severity {
	/// The one banding used everywhere a 0..100 score becomes a severity: cost and risk
	/// forecasts, predicted risk categories, scenarios and warnings.
	pub fn from_score(score: f64) -> Self {
		if score >= 75f64 {
			Severity::Critical
		} else if score >= 50f64 {
			Severity::High
		} else if score >= 25f64 {
			Severity::Medium
		} else {
			Severity::Low
		}
	}
}

impl std::fmt::Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Severity::Low => write!(f, "low"),
			Severity::Medium => write!(f, "medium"),
			Severity::High => write!(f, "high"),
			Severity::Critical => write!(f, "critical"),
		}
	}
}

#[derive(
	PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Deserialize, Serialize, Clone, Copy, Debug,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
	Technical,
	Financial,
	Safety,
	Schedule,
	Quality,
	Resource,
	Environmental,
	Regulatory,
}

impl RiskCategory {
	pub const COUNT: usize = 8;

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn from_index(index: usize) -> Option<Self> {
		RiskCategory::iter().nth(index)
	}

	pub fn name(self) -> &'static str {
		match self {
			RiskCategory::Technical => "technical",
			RiskCategory::Financial => "financial",
			RiskCategory::Safety => "safety",
			RiskCategory::Schedule => "schedule",
			RiskCategory::Quality => "quality",
			RiskCategory::Resource => "resource",
			RiskCategory::Environmental => "environmental",
			RiskCategory::Regulatory => "regulatory",
		}
	}
}

impl std::fmt::Display for RiskCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

#[derive(PartialEq, Eq, Hash, Deserialize, Serialize, Clone, Copy, Debug)]
#[serde(rename_all = "camelCase")]
pub enum WarningCategory {
	Budget,
	Schedule,
	Risk,
	Quality,
	External,
	DataQuality,
	Model,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastWarning {
	pub severity: Severity,
	pub category: WarningCategory,
	pub message: String,
	pub affected_metrics: Vec<String>,
	pub recommended_action: String,
	pub acknowledged: bool,
}

impl ForecastWarning {
	pub fn new(
		severity: Severity,
		category: WarningCategory,
		message: impl Into<String>,
		affected_metrics: &[&str],
		recommended_action: impl Into<String>,
	) -> Self {
		Self {
			severity,
			category,
			message: message.into(),
			affected_metrics: affected_metrics.iter().map(|each| each.to_string()).collect(),
			recommended_action: recommended_action.into(),
			acknowledged: false,
		}
	}

	pub fn acknowledge(&mut self) {
		self.acknowledged = true;
	}
}
