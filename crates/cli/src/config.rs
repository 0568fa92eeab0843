//! Persisted client defaults.
//!
//! Stored as JSON under the platform config dir (`cfeed/config.json`). Flags
//! and environment always win over stored values.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cfeed_protocol::{ChannelId, DataSourceId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CONFIG_DIR: &str = "cfeed";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub host: Option<String>,
	#[serde(default)]
	pub secure: bool,
	#[serde(default)]
	pub data_sources: Vec<DataSourceId>,
	#[serde(default)]
	pub channels: Vec<ChannelId>,
}

impl ClientConfig {
	/// Reads the config at `path`. A missing or unreadable file yields defaults.
	pub fn load(path: &Path) -> Self {
		let content = match fs::read_to_string(path) {
			Ok(content) => content,
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				debug!(target = "cfeed.config", path = %path.display(), "no config file");
				return Self::default();
			}
			Err(err) => {
				warn!(target = "cfeed.config", path = %path.display(), error = %err, "config unreadable, using defaults");
				return Self::default();
			}
		};

		match serde_json::from_str(&content) {
			Ok(config) => config,
			Err(err) => {
				warn!(target = "cfeed.config", path = %path.display(), error = %err, "config malformed, using defaults");
				Self::default()
			}
		}
	}

	pub fn save(&self, path: &Path) -> anyhow::Result<()> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		let json = serde_json::to_string_pretty(self)?;
		fs::write(path, json)?;
		debug!(target = "cfeed.config", path = %path.display(), "config saved");
		Ok(())
	}
}

/// `<config dir>/cfeed/config.json`, or `None` when the platform has no config dir.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
