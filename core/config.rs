/*!
This module defines the `Config` struct, which is read from an optional yaml config file and configures every stage of a run. Every field is optional and falls back to the defaults below.
*/

use crate::Error;
use anyhow::{Context, Result};
use pedal_tree::TrainOptions;
use std::path::Path;

pub const DEFAULT_APP_NAME: &str = "bike rental analysis";
pub const DEFAULT_FILE: &str = "Bike.csv";
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.75;
pub const DEFAULT_SEED: u64 = 123;
pub const DEFAULT_SHOW_ROWS: usize = 5;

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	pub app_name: Option<String>,
	pub log_level: Option<LogLevel>,
	/// The number of threads in the session's thread pool. If not set, rayon picks one per cpu.
	pub threads: Option<usize>,
	pub file: Option<String>,
	pub split: Option<SplitConfig>,
	pub tree: Option<TreeConfig>,
	pub show_rows: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub enum LogLevel {
	#[serde(rename = "off")]
	Off,
	#[serde(rename = "error")]
	Error,
	#[serde(rename = "warn")]
	Warn,
	#[serde(rename = "info")]
	Info,
	#[serde(rename = "debug")]
	Debug,
	#[serde(rename = "trace")]
	Trace,
}

impl From<LogLevel> for log::LevelFilter {
	fn from(value: LogLevel) -> log::LevelFilter {
		match value {
			LogLevel::Off => log::LevelFilter::Off,
			LogLevel::Error => log::LevelFilter::Error,
			LogLevel::Warn => log::LevelFilter::Warn,
			LogLevel::Info => log::LevelFilter::Info,
			LogLevel::Debug => log::LevelFilter::Debug,
			LogLevel::Trace => log::LevelFilter::Trace,
		}
	}
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitConfig {
	pub train_fraction: Option<f64>,
	pub seed: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
	pub max_depth: Option<usize>,
	pub max_bins: Option<usize>,
	pub min_examples_per_node: Option<usize>,
	pub min_gain_to_split: Option<f64>,
}

/// Read and parse the config file at `config_path`, if one was given.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
	let config_path = match config_path {
		Some(config_path) => config_path,
		None => return Ok(Config::default()),
	};
	let config = std::fs::read_to_string(config_path)
		.with_context(|| format!("failed to read config file {}", config_path.display()))?;
	let config: Config = serde_yaml::from_str(&config)
		.with_context(|| format!("failed to parse config file {}", config_path.display()))?;
	config.validate()?;
	Ok(config)
}

impl Config {
	pub fn validate(&self) -> Result<(), Error> {
		let train_fraction = self.train_fraction();
		if !(train_fraction > 0.0 && train_fraction < 1.0) {
			return Err(Error::Config(format!(
				"split.train_fraction must be between 0 and 1, got {}",
				train_fraction
			)));
		}
		if self.threads == Some(0) {
			return Err(Error::Config("threads must be at least 1".to_owned()));
		}
		let train_options = self.train_options();
		if train_options.max_bins < 2 {
			return Err(Error::Config(format!(
				"tree.max_bins must be at least 2, got {}",
				train_options.max_bins
			)));
		}
		if train_options.min_examples_per_node == 0 {
			return Err(Error::Config(
				"tree.min_examples_per_node must be at least 1".to_owned(),
			));
		}
		if !train_options.min_gain_to_split.is_finite() || train_options.min_gain_to_split < 0.0 {
			return Err(Error::Config(format!(
				"tree.min_gain_to_split must be a non-negative number, got {}",
				train_options.min_gain_to_split
			)));
		}
		Ok(())
	}

	pub fn app_name(&self) -> &str {
		self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME)
	}

	/// The configured maximum log level. If not set, the logger's own filter applies.
	pub fn log_level(&self) -> Option<log::LevelFilter> {
		self.log_level.map(log::LevelFilter::from)
	}

	pub fn file(&self) -> &str {
		self.file.as_deref().unwrap_or(DEFAULT_FILE)
	}

	pub fn train_fraction(&self) -> f64 {
		self.split
			.as_ref()
			.and_then(|split| split.train_fraction)
			.unwrap_or(DEFAULT_TRAIN_FRACTION)
	}

	pub fn seed(&self) -> u64 {
		self.split
			.as_ref()
			.and_then(|split| split.seed)
			.unwrap_or(DEFAULT_SEED)
	}

	pub fn show_rows(&self) -> usize {
		self.show_rows.unwrap_or(DEFAULT_SHOW_ROWS)
	}

	pub fn train_options(&self) -> TrainOptions {
		let defaults = TrainOptions::default();
		let tree = match &self.tree {
			Some(tree) => tree,
			None => return defaults,
		};
		TrainOptions {
			max_depth: tree.max_depth.unwrap_or(defaults.max_depth),
			max_bins: tree.max_bins.unwrap_or(defaults.max_bins),
			min_examples_per_node: tree
				.min_examples_per_node
				.unwrap_or(defaults.min_examples_per_node),
			min_gain_to_split: tree.min_gain_to_split.unwrap_or(defaults.min_gain_to_split),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.app_name(), "bike rental analysis");
		assert_eq!(config.log_level(), None);
		assert_eq!(config.file(), "Bike.csv");
		assert_eq!(config.train_fraction(), 0.75);
		assert_eq!(config.seed(), 123);
		assert_eq!(config.show_rows(), 5);
		assert_eq!(config.train_options(), TrainOptions::default());
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_parse_yaml() {
		let config: Config = serde_yaml::from_str(
			"
app_name: rentals
log_level: info
split:
  seed: 7
tree:
  max_depth: 3
",
		)
		.unwrap();
		assert_eq!(config.app_name(), "rentals");
		assert_eq!(config.log_level(), Some(log::LevelFilter::Info));
		assert_eq!(config.seed(), 7);
		assert_eq!(config.train_fraction(), 0.75);
		assert_eq!(config.train_options().max_depth, 3);
		assert_eq!(config.train_options().max_bins, 32);
	}

	#[test]
	fn test_parse_json() {
		let config: Config = serde_yaml::from_str(r#"{"file": "rides.csv", "show_rows": 2}"#).unwrap();
		assert_eq!(config.file(), "rides.csv");
		assert_eq!(config.show_rows(), 2);
	}

	#[test]
	fn test_invalid_config() {
		let config = Config {
			split: Some(SplitConfig {
				train_fraction: Some(1.0),
				seed: None,
			}),
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(Error::Config(_))));
		assert!(serde_yaml::from_str::<Config>("max_depth: 3").is_err());
	}
}
