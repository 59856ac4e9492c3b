use pedal_dataframe::DataFrameError;
use pedal_tree::TrainError;
use thiserror::Error;

/// The errors that end a run. `MissingColumn` is the validation error raised before any analysis starts. Every other variant is a runtime failure in one of the stages.
#[derive(Debug, Error)]
pub enum Error {
	#[error("required column \"{column}\" is missing, the columns found are: {}", available.join(", "))]
	MissingColumn {
		column: String,
		available: Vec<String>,
	},
	#[error(transparent)]
	DataFrame(#[from] DataFrameError),
	#[error(transparent)]
	Train(#[from] TrainError),
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error("invalid config: {0}")]
	Config(String),
	#[error("unsupported source \"{0}\", only local paths and file:// urls can be read")]
	UnsupportedSource(String),
}

impl Error {
	pub fn is_validation_error(&self) -> bool {
		matches!(self, Self::MissingColumn { .. })
	}
}
