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
use std::{
	fs::{self, File, OpenOptions},
	io::{BufRead, BufReader, BufWriter, Write},
	path::{Path, PathBuf},
	sync::{Mutex, MutexGuard},
};
use tracing::{debug, info, warn};

use super::typedef::*;
use crate::error::{ForecastError, Result};
use crate::forecast::typedef::{CostForecast, ForecastKind};

pub trait ForecastStore {
	fn save(&self, forecast: StoredForecast) -> Result<()>;

	/// Most recently generated forecast of `kind` for the project, expired or not.
	fn latest(&self, project_id: &str, kind: ForecastKind) -> Result<Option<StoredForecast>>;

	/// Drops every forecast whose expiry has passed and returns how many were dropped.
	fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

fn newest<'a>(
	forecasts: impl Iterator<Item = &'a StoredForecast>,
	project_id: &str,
	kind: ForecastKind,
) -> Option<&'a StoredForecast> {
	forecasts
		.filter(|each| each.project_id() == project_id && each.kind() == kind)
		.fold(None, |chosen: Option<&StoredForecast>, each| match chosen {
			Some(found) if found.generated_at() > each.generated_at() => Some(found),
			_ => Some(each),
		})
}

#[derive(Default)]
pub struct MemoryForecastStore {
	forecasts: Mutex<Vec<StoredForecast>>,
}

impl MemoryForecastStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		match self.forecasts.lock() {
			Ok(guard) => guard.len(),
			Err(_) => 0,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn guard(&self) -> Result<MutexGuard<'_, Vec<StoredForecast>>> {
		self.forecasts
			.lock()
			.map_err(|err| ForecastError::Store(err.to_string()))
	}
}

impl ForecastStore for MemoryForecastStore {
	fn save(&self, forecast: StoredForecast) -> Result<()> {
		debug!(
			"Storing {} forecast for {}",
			forecast.kind(),
			forecast.project_id()
		);
		self.guard()?.push(forecast);
		Ok(())
	}

	fn latest(&self, project_id: &str, kind: ForecastKind) -> Result<Option<StoredForecast>> {
		let guard = self.guard()?;
		Ok(newest(guard.iter(), project_id, kind).cloned())
	}

	fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
		let mut guard = self.guard()?;
		let before = guard.len();
		guard.retain(|each| !each.is_expired(now));
		Ok(before - guard.len())
	}
}

/// One JSON document per line, appended on save and rewritten on purge.
pub struct JsonLinesForecastStore {
	path: PathBuf,
	lock: Mutex<()>,
}

impl JsonLinesForecastStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_all(&self) -> Result<Vec<StoredForecast>> {
		let file = match File::open(&self.path) {
			Ok(ok) => ok,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(err) => return Err(err.into()),
		};

		let mut forecasts = Vec::<StoredForecast>::new();
		for (index, line) in BufReader::new(file).lines().enumerate() {
			let line = line?;
			if line.trim().is_empty() {
				continue;
			}

			match serde_json::from_str::<StoredForecast>(&line) {
				Ok(found) => forecasts.push(found),
				Err(err) => warn!(
					"Skipping unreadable line {} of {}: {}",
					index + 1,
					self.path.display(),
					err
				),
			}
		}

		Ok(forecasts)
	}

	fn guard(&self) -> Result<MutexGuard<'_, ()>> {
		self.lock
			.lock()
			.map_err(|err| ForecastError::Store(err.to_string()))
	}
}

impl ForecastStore for JsonLinesForecastStore {
	fn save(&self, forecast: StoredForecast) -> Result<()> {
		let _guard = self.guard()?;
		let mut file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.path)?;

		let line = serde_json::to_string(&forecast)?;
		writeln!(file, "{}", line)?;
		file.flush()?;
		Ok(())
	}

	fn latest(&self, project_id: &str, kind: ForecastKind) -> Result<Option<StoredForecast>> {
		let _guard = self.guard()?;
		let forecasts = self.read_all()?;
		Ok(newest(forecasts.iter(), project_id, kind).cloned())
	}

	fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
		let _guard = self.guard()?;
		let forecasts = self.read_all()?;
		let before = forecasts.len();
		let kept = forecasts
			.into_iter()
			.filter(|each| !each.is_expired(now))
			.collect::<Vec<_>>();

		let staging = self.path.with_extension("tmp");
		{
			let mut writer = BufWriter::new(File::create(&staging)?);
			for each in kept.iter() {
				writeln!(writer, "{}", serde_json::to_string(each)?)?;
			}
			writer.flush()?;
		}
		fs::rename(&staging, &self.path)?;

		let purged = before - kept.len();
		info!("Purged {} expired forecast(s) from {}", purged, self.path.display());
		Ok(purged)
	}
}

pub fn export_cost_predictions(forecast: &CostForecast, path: impl AsRef<Path>) -> Result<()> {
	let mut writer = csv::Writer::from_path(path.as_ref())?;
	writer.write_record([
		"Date",
		"Predicted Value",
		"Lower Bound",
		"Upper Bound",
		"Confidence",
	])?;

	for each in forecast.predictions.iter() {
		writer.write_record([
			each.date.to_string(),
			each.predicted.to_string(),
			each.lower_bound.to_string(),
			each.upper_bound.to_string(),
			each.confidence.to_string(),
		])?;
	}

	writer.flush()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::forecast::typedef::{CostPrediction, Forecast, ForecastMethod};
	use crate::typedef::Severity;
	use chrono::{Duration, NaiveDate, TimeZone};
	use tempfile::tempdir;
	use uuid::Uuid;

	fn generated(day: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 5, day, 0, 0, 0).unwrap()
	}

	fn cost(project_id: &str, day: u32) -> CostForecast {
		let generated_at = generated(day);
		Forecast {
			forecast_id: Uuid::new_v4(),
			project_id: project_id.to_string(),
			kind: ForecastKind::Cost,
			forecast_date: generated_at.date_naive() + Duration::days(2),
			horizon: 2,
			predictions: (1..=2)
				.map(|step| CostPrediction {
					step,
					date: generated_at.date_naive() + Duration::days(step as i64),
					predicted: 100.0 * step as f64,
					lower_bound: 50.0,
					upper_bound: 250.0,
					confidence: 0.8,
				})
				.collect(),
			total_value: 300.0,
			current_value: 0.0,
			variance: 0.0,
			confidence_score: 0.8,
			risk_level: Severity::Low,
			method: ForecastMethod::Ensemble,
			low_confidence: false,
			model_families: Vec::new(),
			assumptions: Vec::new(),
			warnings: Vec::new(),
			generated_at,
			expires_at: generated_at + Duration::days(7),
		}
	}

	fn exercise(store: &dyn ForecastStore) {
		store.save(cost("a", 1).into()).unwrap();
		store.save(cost("a", 5).into()).unwrap();
		store.save(cost("b", 3).into()).unwrap();

		let latest = store.latest("a", ForecastKind::Cost).unwrap().unwrap();
		assert_eq!(latest.generated_at(), generated(5));
		assert!(store.latest("a", ForecastKind::Risk).unwrap().is_none());
		assert!(store.latest("c", ForecastKind::Cost).unwrap().is_none());

		assert_eq!(store.purge_expired(generated(9)).unwrap(), 1);
		assert!(store.latest("a", ForecastKind::Cost).unwrap().is_some());
		assert_eq!(store.purge_expired(generated(20)).unwrap(), 2);
		assert!(store.latest("a", ForecastKind::Cost).unwrap().is_none());
	}

	#[test]
	fn memory_store_keeps_latest() {
		let store = MemoryForecastStore::new();
		exercise(&store);
		assert!(store.is_empty());
	}

	#[test]
	fn file_store_keeps_latest() {
		let dir = tempdir().unwrap();
		let store = JsonLinesForecastStore::new(dir.path().join("forecasts.jsonl"));
		assert!(store.latest("a", ForecastKind::Cost).unwrap().is_none());
		exercise(&store);
	}

	#[test]
	fn file_store_round_trips_content() {
		let dir = tempdir().unwrap();
		let store = JsonLinesForecastStore::new(dir.path().join("forecasts.jsonl"));
		let original = cost("a", 2);
		store.save(original.clone().into()).unwrap();

		let reopened = JsonLinesForecastStore::new(store.path());
		match reopened.latest("a", ForecastKind::Cost).unwrap() {
			Some(StoredForecast::Cost(found)) => assert_eq!(found, original),
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn exports_predictions_to_csv() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("cost.csv");
		export_cost_predictions(&cost("a", 1), &path).unwrap();

		let mut reader = csv::Reader::from_path(&path).unwrap();
		let headers = reader.headers().unwrap().clone();
		assert_eq!(&headers[0], "Date");

		let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>().unwrap();
		assert_eq!(rows.len(), 2);
		assert_eq!(
			rows[0][0].parse::<NaiveDate>().unwrap(),
			NaiveDate::from_ymd_opt(2025, 5, 2).unwrap()
		);
		assert_eq!(rows[1][1].parse::<f64>().unwrap(), 200.0);
	}
}
