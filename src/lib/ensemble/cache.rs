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

use chrono::{DateTime, Duration, Utc};
use std::{
	collections::{hash_map::DefaultHasher, HashMap},
	hash::{Hash, Hasher},
	sync::Mutex,
};
use tracing::debug;

use super::command::{ClassificationEnsemble, RegressionEnsemble};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::typedef::ModelFamily;
use crate::sequence::typedef::TrainingExample;

struct Cached<E> {
	fingerprint: u64,
	trained_at: DateTime<Utc>,
	ensemble: E,
}

/// Keeps trained ensembles per project so repeated requests on unchanged history skip
/// training. An entry is reused only while it is younger than the TTL and its training
/// data fingerprint still matches.
pub struct ModelCache {
	ttl: Option<Duration>,
	regressors: Mutex<HashMap<String, Cached<RegressionEnsemble>>>,
	classifiers: Mutex<HashMap<String, Cached<ClassificationEnsemble>>>,
}

impl ModelCache {
	/// A TTL of zero minutes or less, or one too large to represent, disables caching.
	pub fn new(ttl_minutes: i64) -> Self {
		Self {
			ttl: Duration::try_minutes(ttl_minutes).filter(|found| *found > Duration::zero()),
			regressors: Mutex::new(HashMap::new()),
			classifiers: Mutex::new(HashMap::new()),
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.ttl.is_some()
	}

	pub fn regressor<F>(
		&self,
		key: &str,
		fingerprint: u64,
		now: DateTime<Utc>,
		train: F,
	) -> Result<RegressionEnsemble>
	where
		F: FnOnce() -> Result<RegressionEnsemble>,
	{
		get_or_train(self.ttl, &self.regressors, key, fingerprint, now, train)
	}

	pub fn classifier<F>(
		&self,
		key: &str,
		fingerprint: u64,
		now: DateTime<Utc>,
		train: F,
	) -> Result<ClassificationEnsemble>
	where
		F: FnOnce() -> Result<ClassificationEnsemble>,
	{
		get_or_train(self.ttl, &self.classifiers, key, fingerprint, now, train)
	}

	pub fn len(&self) -> usize {
		let regressors = match self.regressors.lock() {
			Ok(guard) => guard.len(),
			Err(_) => 0,
		};
		let classifiers = match self.classifiers.lock() {
			Ok(guard) => guard.len(),
			Err(_) => 0,
		};
		regressors + classifiers
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Default for ModelCache {
	fn default() -> Self {
		Self::new(0)
	}
}

fn get_or_train<E, F>(
	ttl: Option<Duration>,
	entries: &Mutex<HashMap<String, Cached<E>>>,
	key: &str,
	fingerprint: u64,
	now: DateTime<Utc>,
	train: F,
) -> Result<E>
where
	E: Clone,
	F: FnOnce() -> Result<E>,
{
	let ttl = match ttl {
		Some(found) => found,
		None => return train(),
	};

	// A poisoned lock only means an earlier request panicked mid-insert; treat it as a miss.
	if let Ok(guard) = entries.lock() {
		if let Some(cached) = guard.get(key) {
			if cached.fingerprint == fingerprint && now - cached.trained_at < ttl {
				debug!("Reusing cached ensemble for {}", key);
				return Ok(cached.ensemble.clone());
			}
		}
	}

	let ensemble = train()?;

	if let Ok(mut guard) = entries.lock() {
		guard.insert(
			key.to_string(),
			Cached {
				fingerprint,
				trained_at: now,
				ensemble: ensemble.clone(),
			},
		);
	}

	Ok(ensemble)
}

/// Hashes every window value and target together with the settings that shape training,
/// so a change in history or in the ensemble setup invalidates the cache.
pub fn fingerprint<T, F>(
	examples: &[TrainingExample<T>],
	families: &[ModelFamily],
	config: &EngineConfig,
	target_bits: F,
) -> u64
where
	F: Fn(&T) -> u64,
{
	let mut hasher = DefaultHasher::new();
	families.hash(&mut hasher);
	for family in families {
		serde_json::to_string(config.family_config(*family))
			.unwrap_or_default()
			.hash(&mut hasher);
	}
	config.seed.hash(&mut hasher);
	config.weight_strategy.hash(&mut hasher);

	examples.len().hash(&mut hasher);

	for example in examples {
		for step in example.window.iter() {
			for value in step {
				value.to_bits().hash(&mut hasher);
			}
		}
		target_bits(&example.target).hash(&mut hasher);
	}

	hasher.finish()
}
