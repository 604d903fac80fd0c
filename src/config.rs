use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("{key} has an invalid value: {value:?}")]
	Invalid { key: &'static str, value: String },
	#[error("can't load .env: {0}")]
	DotEnv(#[from] dotenvy::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub addr: SocketAddr,
	pub max_connections: u32,
	pub acquire_timeout: Duration,
	// empty means any origin
	pub cors_origins: Vec<String>,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			database_url: "sqlite://lms.db".to_string(),
			addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
			max_connections: 5,
			acquire_timeout: Duration::from_secs(3),
			cors_origins: Vec::new(),
		}
	}
}

impl Config {
	/// Reads `.env` (if any) and then the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		env_file(dotenvy::dotenv())?;
		Config::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut cfg = Config::default();

		if let Some(url) = lookup("DATABASE_URL") {
			cfg.database_url = url;
		}
		if let Some(addr) = lookup("LMS_ADDR") {
			cfg.addr = parse("LMS_ADDR", addr)?;
		}
		if let Some(max) = lookup("LMS_MAX_CONNECTIONS") {
			cfg.max_connections = parse("LMS_MAX_CONNECTIONS", max)?;
		}
		if let Some(secs) = lookup("LMS_ACQUIRE_TIMEOUT_SECS") {
			cfg.acquire_timeout = Duration::from_secs(parse("LMS_ACQUIRE_TIMEOUT_SECS", secs)?);
		}
		if let Some(origins) = lookup("LMS_CORS_ORIGINS") {
			cfg.cors_origins = origins.split(',')
				.map(str::trim)
				.filter(|o| !o.is_empty() && *o != "*")
				.map(String::from)
				.collect();
		}

		Ok(cfg)
	}
}

// a missing .env file is fine, the variables may come from the shell;
// a malformed one is not, dotenvy stops at the bad line
fn env_file<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
	match loaded {
		Ok(_) => Ok(()),
		Err(e) if e.not_found() => Ok(()),
		Err(e) => Err(ConfigError::DotEnv(e)),
	}
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
	value.trim().parse().map_err(|_| ConfigError::Invalid{ key, value })
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| vars.get(key).cloned()
	}

	#[test]
	fn defaults_when_nothing_is_set() {
		let cfg = Config::from_lookup(lookup_in(&[])).unwrap();
		assert_eq!(cfg.database_url, "sqlite://lms.db");
		assert_eq!(cfg.addr.to_string(), "127.0.0.1:8000");
		assert_eq!(cfg.max_connections, 5);
		assert_eq!(cfg.acquire_timeout, Duration::from_secs(3));
		assert!(cfg.cors_origins.is_empty());
	}

	#[test]
	fn reads_every_key() {
		let cfg = Config::from_lookup(lookup_in(&[
			("DATABASE_URL", "sqlite::memory:"),
			("LMS_ADDR", "0.0.0.0:8080"),
			("LMS_MAX_CONNECTIONS", "2"),
			("LMS_ACQUIRE_TIMEOUT_SECS", "10"),
			("LMS_CORS_ORIGINS", "http://localhost:3000, http://127.0.0.1:5173"),
		])).unwrap();
		assert_eq!(cfg.database_url, "sqlite::memory:");
		assert_eq!(cfg.addr.port(), 8080);
		assert_eq!(cfg.max_connections, 2);
		assert_eq!(cfg.acquire_timeout, Duration::from_secs(10));
		assert_eq!(cfg.cors_origins, vec!["http://localhost:3000", "http://127.0.0.1:5173"]);
	}

	#[test]
	fn star_means_any_origin() {
		let cfg = Config::from_lookup(lookup_in(&[("LMS_CORS_ORIGINS", "*")])).unwrap();
		assert!(cfg.cors_origins.is_empty());
	}

	#[test]
	fn bad_number_names_the_key() {
		let err = Config::from_lookup(lookup_in(&[("LMS_MAX_CONNECTIONS", "lots")])).unwrap_err();
		assert_eq!(err.to_string(), "LMS_MAX_CONNECTIONS has an invalid value: \"lots\"");
	}

	#[test]
	fn missing_env_file_is_fine() {
		let dir = tempfile::tempdir().unwrap();
		let loaded = dotenvy::from_path(dir.path().join(".env"));
		assert!(env_file(loaded).is_ok());
	}

	#[test]
	fn malformed_env_file_fails() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(".env");
		std::fs::write(&path, "LMS_TEST_DOTENV_URL=sqlite://x.db\nTHIS IS NOT VALID\nLMS_TEST_DOTENV_ADDR=0.0.0.0:9999\n").unwrap();

		let err = env_file(dotenvy::from_path(&path)).unwrap_err();
		assert!(matches!(err, ConfigError::DotEnv(_)));
		assert!(err.to_string().starts_with("can't load .env"));
		// nothing after the bad line was loaded
		assert!(std::env::var("LMS_TEST_DOTENV_ADDR").is_err());
	}

	#[test]
	fn bad_addr_is_rejected() {
		assert!(Config::from_lookup(lookup_in(&[("LMS_ADDR", "localhost")])).is_err());
	}
}
