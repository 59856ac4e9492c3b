use ndarray::prelude::*;
use pedal_dataframe::{DataFrame, Result};

/// The features, in the order the model sees them.
pub const FEATURE_COLUMNS: [&str; 5] = ["season", "temp", "humidity", "windspeed", "registered"];

/// A `FeatureAssembler` packs number columns into one feature vector per row.
#[derive(Clone, Debug)]
pub struct FeatureAssembler {
	pub input_columns: Vec<String>,
	pub output: String,
}

impl Default for FeatureAssembler {
	fn default() -> Self {
		Self {
			input_columns: FEATURE_COLUMNS.iter().map(|name| (*name).to_owned()).collect(),
			output: "features".to_owned(),
		}
	}
}

impl FeatureAssembler {
	/// Produce an array with one row per row of `dataframe` and one column per input column. Null values are kept as `NaN`.
	pub fn transform(&self, dataframe: &DataFrame) -> Result<Array2<f64>> {
		let input_columns: Vec<&str> = self.input_columns.iter().map(String::as_str).collect();
		let features = dataframe.select(&input_columns)?.to_rows_f64()?;
		log::debug!(
			"assembled {} from {} columns for {} rows",
			self.output,
			features.ncols(),
			features.nrows()
		);
		Ok(features)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pedal_dataframe::{Column, DataFrameError, NumberColumn, TextColumn};

	#[test]
	fn test_transform() {
		let dataframe = DataFrame {
			columns: vec![
				Column::Number(NumberColumn {
					name: "b".to_owned(),
					data: vec![3.0, 4.0],
				}),
				Column::Number(NumberColumn {
					name: "a".to_owned(),
					data: vec![1.0, f64::NAN],
				}),
				Column::Text(TextColumn {
					name: "c".to_owned(),
					data: vec!["x".to_owned(), "y".to_owned()],
				}),
			],
		};
		let assembler = FeatureAssembler {
			input_columns: vec!["a".to_owned(), "b".to_owned()],
			output: "features".to_owned(),
		};
		let features = assembler.transform(&dataframe).unwrap();
		assert_eq!(features.dim(), (2, 2));
		assert_eq!(features.row(0).to_vec(), vec![1.0, 3.0]);
		assert!(features[[1, 0]].is_nan());
		assert_eq!(features[[1, 1]], 4.0);
		let assembler = FeatureAssembler {
			input_columns: vec!["c".to_owned()],
			output: "features".to_owned(),
		};
		assert!(matches!(
			assembler.transform(&dataframe),
			Err(DataFrameError::NotNumber(_))
		));
		assert!(matches!(
			FeatureAssembler::default().transform(&dataframe),
			Err(DataFrameError::ColumnNotFound(_))
		));
	}
}
