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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
	#[error("No data found for project \"{project_id}\"")]
	DataNotFound { project_id: String },

	#[error("Insufficient history: {required} points required, {available} available")]
	InsufficientHistory { required: usize, available: usize },

	#[error("Model training failed: {0}")]
	ModelTrainingFailure(String),

	#[error("Invalid model input: {0}")]
	InvalidInput(String),

	#[error("Ensemble has no trained models")]
	EnsembleNotReady,

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("Forecast store error: {0}")]
	Store(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
