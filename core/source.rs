use crate::Error;
use anyhow::{Context, Result};
use pedal_dataframe::{DataFrame, FromCsvOptions};
use std::path::PathBuf;
use url::Url;

/// These columns must be present after loading.
pub const REQUIRED_COLUMNS: [&str; 6] = [
	"season",
	"temp",
	"humidity",
	"windspeed",
	"registered",
	"count",
];

/// Resolve a source to a local path. A source is either a plain path or a url with the `file` scheme.
pub fn resolve_source(source: &str) -> Result<PathBuf, Error> {
	if !source.contains("://") {
		return Ok(PathBuf::from(source));
	}
	let url = Url::parse(source).map_err(|_| Error::UnsupportedSource(source.to_owned()))?;
	if url.scheme() != "file" {
		return Err(Error::UnsupportedSource(source.to_owned()));
	}
	url.to_file_path()
		.map_err(|_| Error::UnsupportedSource(source.to_owned()))
}

/// Load the csv file at `source`, inferring its column types.
pub fn load(source: &str) -> Result<DataFrame> {
	let path = resolve_source(source)?;
	log::info!("loading {}", path.display());
	let dataframe = DataFrame::from_path(&path, FromCsvOptions::default())
		.map_err(Error::from)
		.with_context(|| format!("failed to load {}", path.display()))?;
	log::info!(
		"loaded {} rows and {} columns",
		dataframe.nrows(),
		dataframe.ncols()
	);
	Ok(dataframe)
}

/// Check that every column in `REQUIRED_COLUMNS` is present. The error names the first missing column.
pub fn validate(dataframe: &DataFrame) -> Result<(), Error> {
	match REQUIRED_COLUMNS
		.iter()
		.find(|column| !dataframe.contains_column(column))
	{
		Some(column) => Err(Error::MissingColumn {
			column: (*column).to_owned(),
			available: dataframe
				.column_names()
				.into_iter()
				.map(|name| name.to_owned())
				.collect(),
		}),
		None => Ok(()),
	}
}

/// List the columns that have at least one null value, with their null counts.
pub fn missing_values(dataframe: &DataFrame) -> Vec<(String, usize)> {
	dataframe
		.null_counts()
		.into_iter()
		.filter(|(_, count)| *count > 0)
		.collect()
}

#[cfg(test)]
mod test {
	use super::*;
	use pedal_dataframe::ColumnType;

	#[test]
	fn test_resolve_source() {
		assert_eq!(resolve_source("Bike.csv").unwrap(), PathBuf::from("Bike.csv"));
		assert_eq!(
			resolve_source("file:///data/Bike.csv").unwrap(),
			PathBuf::from("/data/Bike.csv")
		);
		assert!(matches!(
			resolve_source("hdfs://localhost:9000/Bike.csv"),
			Err(Error::UnsupportedSource(_))
		));
	}

	#[test]
	fn test_validate() {
		let dataframe = DataFrame::new(
			vec!["season".to_owned(), "temp".to_owned()],
			vec![ColumnType::Number, ColumnType::Number],
		);
		match validate(&dataframe) {
			Err(Error::MissingColumn { column, available }) => {
				assert_eq!(column, "humidity");
				assert_eq!(available, vec!["season", "temp"]);
			}
			_ => panic!("expected a missing column error"),
		}
	}
}
