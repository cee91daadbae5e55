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

use std::{collections::HashMap, fs, path::Path};

use crate::error::{ForecastError, Result};

use super::typedef::ProjectSnapshot;

pub trait ProjectDataSource {
	fn snapshot(&self, project_id: &str) -> Result<ProjectSnapshot>;
}

#[derive(Default, Clone, Debug)]
pub struct MemoryDataSource {
	snapshots: HashMap<String, ProjectSnapshot>,
}

impl MemoryDataSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, snapshot: ProjectSnapshot) {
		self.snapshots
			.insert(snapshot.project.id.clone(), snapshot);
	}

	/// Accepts either one snapshot object or an array of them.
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
		let contents = fs::read_to_string(path)?;
		Self::from_json_str(&contents)
	}

	pub fn from_json_str(contents: &str) -> Result<Self> {
		let value: serde_json::Value = serde_json::from_str(contents)?;
		let snapshots: Vec<ProjectSnapshot> = match value {
			serde_json::Value::Array(_) => serde_json::from_value(value)?,
			_ => vec![serde_json::from_value(value)?],
		};

		let mut source = Self::new();
		snapshots.into_iter().for_each(|each| source.insert(each));
		Ok(source)
	}

	pub fn project_ids(&self) -> Vec<String> {
		let mut ids = self.snapshots.keys().cloned().collect::<Vec<_>>();
		ids.sort();
		ids
	}
}

impl ProjectDataSource for MemoryDataSource {
	fn snapshot(&self, project_id: &str) -> Result<ProjectSnapshot> {
		self.snapshots
			.get(project_id)
			.cloned()
			.ok_or_else(|| ForecastError::DataNotFound {
				project_id: project_id.to_string(),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SNAPSHOT: &str = r#"{
		"project": {
			"id": "p-1",
			"name": "Depot",
			"startDate": "2025-01-01",
			"plannedEndDate": "2025-12-31",
			"plannedBudget": 1000.0
		}
	}"#;

	#[test]
	fn reads_single_snapshot() {
		let source = MemoryDataSource::from_json_str(SNAPSHOT).unwrap();
		let snapshot = source.snapshot("p-1").unwrap();
		assert_eq!(snapshot.project.name, "Depot");
		assert!(snapshot.risks.is_empty());
	}

	#[test]
	fn reads_snapshot_array() {
		let source = MemoryDataSource::from_json_str(&format!("[{}]", SNAPSHOT)).unwrap();
		assert_eq!(source.project_ids(), vec![String::from("p-1")]);
	}

	#[test]
	fn missing_project_is_data_not_found() {
		let source = MemoryDataSource::new();
		assert!(matches!(
			source.snapshot("nope"),
			Err(ForecastError::DataNotFound { .. })
		));
	}
}
