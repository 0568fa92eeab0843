//! Endpoint resolution for the feed connection.
//!
//! Precedence: explicit override, then the deployment host (with `wss` when
//! served securely), then [`DEFAULT_ENDPOINT`].

use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws";

/// Path the service listens on when derived from a host.
const FEED_PATH: &str = "/ws";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
	#[error("invalid endpoint '{endpoint}': {reason}")]
	Malformed { endpoint: String, reason: String },
	#[error("unsupported endpoint scheme '{scheme}' (expected ws or wss)")]
	UnsupportedScheme { scheme: String },
}

/// Where the resolved endpoint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSource {
	Override,
	Host,
	Default,
}

/// Resolves the WebSocket endpoint.
///
/// * `override_url` - explicit endpoint; blank values are ignored
/// * `host` - deployment host (`host[:port]`) used to derive `{scheme}://{host}/ws`
/// * `secure` - whether the deployment is served over TLS (`wss`) or not (`ws`)
pub fn resolve_endpoint(override_url: Option<&str>, host: Option<&str>, secure: bool) -> Result<(String, EndpointSource), EndpointError> {
	if let Some(url) = override_url.map(str::trim).filter(|url| !url.is_empty()) {
		return validate(url).map(|url| (url, EndpointSource::Override));
	}

	if let Some(host) = host.map(str::trim).filter(|host| !host.is_empty()) {
		let scheme = if secure { "wss" } else { "ws" };
		let derived = format!("{scheme}://{host}{FEED_PATH}");
		return validate(&derived).map(|url| (url, EndpointSource::Host));
	}

	Ok((DEFAULT_ENDPOINT.to_string(), EndpointSource::Default))
}

fn validate(endpoint: &str) -> Result<String, EndpointError> {
	let parsed = Url::parse(endpoint).map_err(|err| EndpointError::Malformed {
		endpoint: endpoint.to_string(),
		reason: err.to_string(),
	})?;

	match parsed.scheme() {
		"ws" | "wss" => Ok(endpoint.to_string()),
		other => Err(EndpointError::UnsupportedScheme { scheme: other.to_string() }),
	}
}
