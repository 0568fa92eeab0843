//! Outbound message encoder and inbound message decoder.

use cfeed_protocol::{CampaignRecommendation, ChannelId, DataSourceId, PreferenceSync, PromptSubmit};
use serde::Serialize;

use crate::error::{DecodeError, TransportError};
use crate::selection::SelectionSet;

/// Builds the preference-sync message from the current selections.
pub fn encode_preference_sync(sources: &SelectionSet<DataSourceId>, channels: &SelectionSet<ChannelId>) -> PreferenceSync {
	PreferenceSync {
		data_sources: sources.to_vec(),
		channels: channels.to_vec(),
	}
}

/// Builds the prompt message, or `None` when `text` is blank after trimming.
pub fn encode_prompt(text: &str, sources: &SelectionSet<DataSourceId>, channels: &SelectionSet<ChannelId>) -> Option<PromptSubmit> {
	let prompt = text.trim();
	if prompt.is_empty() {
		return None;
	}
	Some(PromptSubmit {
		prompt: prompt.to_string(),
		data_sources: sources.to_vec(),
		channels: channels.to_vec(),
	})
}

/// Serializes an outbound message into a text frame.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<String, TransportError> {
	serde_json::to_string(message).map_err(|err| TransportError::Encode(err.to_string()))
}

/// Parses one inbound frame as a recommendation.
pub fn decode(raw: &str) -> Result<CampaignRecommendation, DecodeError> {
	Ok(serde_json::from_str(raw)?)
}
