use crate::Config;
use anyhow::{Context, Result};

/// A `Session` is the compute context of a run. It owns the thread pool that training runs in. Create one with `Session::new` before a run and release it with `Session::stop` when the run is over. A session that is dropped without being stopped is stopped by `Drop`.
pub struct Session {
	app_name: String,
	thread_pool: Option<rayon::ThreadPool>,
}

impl Session {
	pub fn new(config: &Config) -> Result<Session> {
		if let Some(log_level) = config.log_level() {
			log::set_max_level(log_level);
		}
		let mut builder = rayon::ThreadPoolBuilder::new();
		if let Some(threads) = config.threads {
			builder = builder.num_threads(threads);
		}
		let thread_pool = builder
			.build()
			.context("failed to start the session thread pool")?;
		let session = Session {
			app_name: config.app_name().to_owned(),
			thread_pool: Some(thread_pool),
		};
		log::info!(
			"started session \"{}\" with {} threads",
			session.app_name,
			session.n_threads()
		);
		Ok(session)
	}

	pub fn app_name(&self) -> &str {
		&self.app_name
	}

	pub fn n_threads(&self) -> usize {
		self.thread_pool
			.as_ref()
			.map(|thread_pool| thread_pool.current_num_threads())
			.unwrap_or(0)
	}

	/// Run `op` inside the session's thread pool, so rayon parallelism in `op` uses the session's threads.
	pub fn install<OP, R>(&self, op: OP) -> R
	where
		OP: FnOnce() -> R + Send,
		R: Send,
	{
		match &self.thread_pool {
			Some(thread_pool) => thread_pool.install(op),
			None => op(),
		}
	}

	/// Release the session's threads.
	pub fn stop(mut self) {
		self.release();
	}

	fn release(&mut self) {
		if let Some(thread_pool) = self.thread_pool.take() {
			drop(thread_pool);
			log::info!("stopped session \"{}\"", self.app_name);
		}
	}
}

impl Drop for Session {
	fn drop(&mut self) {
		self.release();
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_session() {
		let config = Config {
			app_name: Some("test".to_owned()),
			threads: Some(2),
			..Default::default()
		};
		let session = Session::new(&config).unwrap();
		assert_eq!(session.app_name(), "test");
		assert_eq!(session.n_threads(), 2);
		assert_eq!(session.install(rayon::current_num_threads), 2);
		session.stop();
	}

	#[test]
	fn test_session_without_log_level_keeps_max_level() {
		log::set_max_level(log::LevelFilter::Trace);
		let session = Session::new(&Config::default()).unwrap();
		assert_eq!(log::max_level(), log::LevelFilter::Trace);
		session.stop();
	}
}
