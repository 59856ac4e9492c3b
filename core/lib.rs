/*!
This crate runs the bike rental analysis. It loads a csv file of hourly rentals, summarizes it, trains a decision tree that predicts the rental count, and compares the tree with a baseline that always predicts the mean. See [`run`](fn.run.html).
*/

#![allow(clippy::tabs_in_doc_comments)]

mod error;
mod run;

pub mod assemble;
pub mod config;
pub mod evaluate;
pub mod preprocess;
pub mod session;
pub mod source;
pub mod stats;

pub use self::{
	config::{load_config, Config},
	error::Error,
	run::{run, RunOutput, DESCRIBE_COLUMNS, GROUP_COLUMN, LABEL_COLUMN},
	session::Session,
};

#[cfg(test)]
mod test;
