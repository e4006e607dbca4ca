use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub search: Search,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Origins allowed to call the search endpoint from a browser. Empty
	/// means any origin (the public blog frontend is served from many hosts).
	#[serde(default)]
	pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// `site_settings` key consulted per request to pick the engine.
	#[serde(default = "default_engine_flag_key")]
	pub engine_flag_key: String,
}

pub(crate) fn default_engine_flag_key() -> String {
	"is_opensearch_enabled".to_string()
}
