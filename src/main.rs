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

use chrono::Utc;
use clap::Parser;
use project_oracle_lib::{
	export_cost_predictions, logging, EngineConfig, ForecastEngine, ForecastStore,
	JsonLinesForecastStore, MemoryDataSource, MemoryForecastStore,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
	name = "project-oracle",
	version,
	about = "Cost, risk and scenario forecasts for construction projects"
)]
struct Cli {
	/// Project snapshot, or an array of snapshots, as JSON.
	snapshot: PathBuf,
	/// Engine settings as JSON. Missing keys keep their defaults.
	#[arg(long)]
	config: Option<PathBuf>,
	/// Write cost predictions as CSV, prefixed with the project id when there are several.
	#[arg(long)]
	csv: Option<PathBuf>,
	/// Append forecasts to a JSON lines store instead of keeping them in memory.
	#[arg(long)]
	store: Option<PathBuf>,
}

fn run<F: ForecastStore>(
	engine: &ForecastEngine<MemoryDataSource, F>,
	csv: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
	let now = Utc::now();
	let mut reports = Vec::<serde_json::Value>::new();

	for project_id in engine.source().project_ids() {
		info!("Forecasting project {}", project_id);
		let cost = engine.generate_cost_forecast(&project_id, now)?;
		let risk = engine.generate_risk_forecast(&project_id, now)?;
		let scenarios = engine.generate_scenario_analysis(&project_id, now)?;

		if let Some(path) = csv {
			let path = if engine.source().project_ids().len() > 1 {
				path.with_file_name(format!(
					"{}-{}",
					project_id,
					path.file_name()
						.map(|found| found.to_string_lossy().to_string())
						.unwrap_or_else(|| String::from("cost.csv"))
				))
			} else {
				path.clone()
			};
			export_cost_predictions(&cost, &path)?;
			info!("Cost predictions written to {}", path.display());
		}

		reports.push(json!({
			"projectId": project_id,
			"cost": cost,
			"risk": risk,
			"scenarios": scenarios,
		}));
	}

	println!("{}", serde_json::to_string_pretty(&reports)?);
	Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cli = Cli::parse();
	logging::init();

	let config = match &cli.config {
		Some(path) => EngineConfig::from_json_file(path)?,
		None => EngineConfig::default(),
	};
	let source = MemoryDataSource::from_json_file(&cli.snapshot)?;

	match &cli.store {
		Some(path) => {
			let engine = ForecastEngine::new(config, source, JsonLinesForecastStore::new(path))?;
			run(&engine, cli.csv.as_ref())
		}
		None => {
			let engine = ForecastEngine::new(config, source, MemoryForecastStore::new())?;
			run(&engine, cli.csv.as_ref())
		}
	}
}
