use crate::source::REQUIRED_COLUMNS;
use pedal_dataframe::{DataFrame, Result};

/// The timestamp column, which is not used by the model.
pub const DATETIME_COLUMN: &str = "datetime";

pub struct PreprocessOutput {
	pub dataframe: DataFrame,
	pub dropped_datetime: bool,
}

/// Drop the timestamp column if present and cast the required columns to numbers. Values that fail to parse become `NaN`.
pub fn preprocess(dataframe: &DataFrame) -> Result<PreprocessOutput> {
	let dropped_datetime = dataframe.contains_column(DATETIME_COLUMN);
	let mut dataframe = dataframe.drop_column(DATETIME_COLUMN);
	for column_name in REQUIRED_COLUMNS.iter() {
		dataframe = dataframe.cast_to_number(column_name)?;
	}
	Ok(PreprocessOutput {
		dataframe,
		dropped_datetime,
	})
}

#[cfg(test)]
mod test {
	use super::*;
	use pedal_dataframe::{ColumnType, FromCsvOptions};

	#[test]
	fn test_preprocess() {
		let csv = "datetime,season,temp,humidity,windspeed,registered,count,casual
2011-01-01 00:00:00,1,9.84,81,0,13,16,3
2011-01-01 01:00:00,1,9.02,80,,32,40,8
";
		let mut reader = csv::Reader::from_reader(std::io::Cursor::new(csv));
		let dataframe = DataFrame::from_csv(&mut reader, FromCsvOptions::default()).unwrap();
		let output = preprocess(&dataframe).unwrap();
		assert!(output.dropped_datetime);
		assert_eq!(
			output.dataframe.column_names(),
			vec!["season", "temp", "humidity", "windspeed", "registered", "count", "casual"]
		);
		for column_name in REQUIRED_COLUMNS.iter() {
			assert_eq!(
				output.dataframe.column(column_name).unwrap().column_type(),
				ColumnType::Number
			);
		}
		let windspeed = output.dataframe.column("windspeed").unwrap().as_number().unwrap();
		assert_eq!(windspeed.data[0], 0.0);
		assert!(windspeed.data[1].is_nan());
		let output = preprocess(&output.dataframe).unwrap();
		assert!(!output.dropped_datetime);
	}
}
