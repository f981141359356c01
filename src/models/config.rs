//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Clone, Debug, Deserialize)]
/// Settings for the HTTP server and the search engine connection.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Base URL of the Elasticsearch cluster, e.g. `http://localhost:9200`.
    pub elasticsearch_url: String,
    pub elasticsearch_index: String,
    /// Upper bound for a single engine round-trip.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}
