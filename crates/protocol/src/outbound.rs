//! Messages sent from the client to the recommendation service.
//!
//! Neither message is acknowledged; the service reads the latest selection
//! snapshot from whichever arrived last.

use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, DataSourceId};

/// Selection snapshot pushed right after the connection opens.
///
/// ```json
/// { "dataSources": ["gtm"], "channels": ["email", "sms"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSync {
	pub data_sources: Vec<DataSourceId>,
	pub channels: Vec<ChannelId>,
}

/// Operator prompt with the selection snapshot taken at submit time.
///
/// ```json
/// { "prompt": "Plan a win-back flow", "dataSources": ["gtm"], "channels": ["email"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSubmit {
	pub prompt: String,
	pub data_sources: Vec<DataSourceId>,
	pub channels: Vec<ChannelId>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn preference_sync_uses_camel_case_keys() {
		let msg = PreferenceSync {
			data_sources: vec![DataSourceId::Gtm, DataSourceId::GoogleAdsTag],
			channels: vec![ChannelId::Email],
		};
		let value = serde_json::to_value(&msg).unwrap();
		assert_eq!(value, serde_json::json!({"dataSources": ["gtm", "google_ads_tag"], "channels": ["email"]}));
	}

	#[test]
	fn prompt_submit_embeds_selection() {
		let msg = PromptSubmit {
			prompt: "Plan a win-back flow".to_string(),
			data_sources: vec![DataSourceId::FacebookPixel],
			channels: vec![ChannelId::Sms, ChannelId::Ads],
		};
		let value = serde_json::to_value(&msg).unwrap();
		assert_eq!(value["prompt"], "Plan a win-back flow");
		assert_eq!(value["dataSources"], serde_json::json!(["facebook_pixel"]));
		assert_eq!(value["channels"], serde_json::json!(["sms", "ads"]));
	}
}
