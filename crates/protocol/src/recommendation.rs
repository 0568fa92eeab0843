//! Inbound recommendation payload.
//!
//! Each inbound text frame is one complete, independent recommendation. The
//! service mixes key casings: the envelope is camelCase while the `rightTime`
//! and `metrics` blocks use snake_case. Both spellings are accepted for those
//! inner keys so either producer style parses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured output describing the right time, channel, message and audience
/// for one campaign.
///
/// Format as emitted by the service:
/// ```json
/// {
///   "campaignId": 4821,
///   "generatedAt": "2024-01-01T00:00:00Z",
///   "rightTime": { "send_at": "...", "time_zone": "Europe/London", "window_minutes": 30, "rationale": "..." },
///   "rightChannel": { "id": "email", "name": "Email", "reason": "...", "supportingSignals": ["..."] },
///   "rightMessage": { "headline": "...", "body": "...", "cta": "...", "preview": "...", "tone": "helpful" },
///   "rightAudience": { "age_range": "25-34", "interests": ["new arrivals"] },
///   "dataSources": { "gtm": { "page_view": "/collections/summer-edit" } },
///   "metrics": { "expected_lift": "12%", "confidence_score": 0.81, "sample_size": 2400 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecommendation {
	pub campaign_id: i64,
	pub generated_at: String,
	pub right_time: RightTime,
	pub right_channel: RightChannel,
	pub right_message: RightMessage,
	#[serde(default)]
	pub right_audience: Audience,
	/// Provider name to arbitrary signal payload; not interpreted by the client.
	#[serde(default)]
	pub data_sources: Map<String, Value>,
	pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightTime {
	#[serde(alias = "sendAt")]
	pub send_at: String,
	#[serde(alias = "timeZone")]
	pub time_zone: String,
	#[serde(alias = "windowMinutes")]
	pub window_minutes: u32,
	pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightChannel {
	/// Channel id as sent by the service. Kept as text so a channel this
	/// client does not know yet still renders.
	pub id: String,
	pub name: String,
	pub reason: String,
	#[serde(default, alias = "supporting_signals")]
	pub supporting_signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightMessage {
	pub headline: String,
	pub body: String,
	pub cta: String,
	pub preview: String,
	pub tone: String,
}

/// Demographic and behavioral attributes; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audience {
	#[serde(default, skip_serializing_if = "Option::is_none", alias = "ageRange")]
	pub age_range: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub interests: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub behaviors: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none", alias = "lifecycleStage")]
	pub lifecycle_stage: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none", alias = "preferredDevice")]
	pub preferred_device: Option<String>,
}

impl Audience {
	pub fn is_empty(&self) -> bool {
		self == &Audience::default()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
	#[serde(alias = "expectedLift")]
	pub expected_lift: String,
	#[serde(alias = "confidenceScore")]
	pub confidence_score: f64,
	#[serde(alias = "sampleSize")]
	pub sample_size: u64,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn sample() -> Value {
		json!({
			"campaignId": 4821,
			"generatedAt": "2024-01-01T00:00:00Z",
			"rightTime": {
				"send_at": "2024-01-01T00:30:00Z",
				"time_zone": "Europe/London",
				"window_minutes": 30,
				"rationale": "Optimize delivery window for email engagement"
			},
			"rightChannel": {
				"id": "email",
				"name": "Email",
				"reason": "Highest open rate for returning visitors",
				"supportingSignals": ["gtm: abandoned_cart"]
			},
			"rightMessage": {
				"headline": "Bring them back with a curated edit",
				"body": "Showcase new arrivals",
				"cta": "Shop the tailored picks",
				"preview": "Your picks are waiting",
				"tone": "helpful"
			},
			"rightAudience": {"age_range": "25-34", "interests": ["new arrivals"]},
			"dataSources": {"gtm": {"page_view": "/collections/summer-edit"}},
			"metrics": {"expected_lift": "12%", "confidence_score": 0.81, "sample_size": 2400}
		})
	}

	#[test]
	fn parses_service_payload() {
		let rec: CampaignRecommendation = serde_json::from_value(sample()).unwrap();
		assert_eq!(rec.campaign_id, 4821);
		assert_eq!(rec.right_time.window_minutes, 30);
		assert_eq!(rec.right_channel.supporting_signals, vec!["gtm: abandoned_cart"]);
		assert_eq!(rec.right_audience.age_range.as_deref(), Some("25-34"));
		assert!(rec.right_audience.location.is_none());
		assert_eq!(rec.data_sources["gtm"]["page_view"], "/collections/summer-edit");
		assert_eq!(rec.metrics.sample_size, 2400);
	}

	#[test]
	fn accepts_camel_case_inner_keys() {
		let mut value = sample();
		value["rightTime"] = json!({"sendAt": "x", "timeZone": "UTC", "windowMinutes": 15, "rationale": "r"});
		value["metrics"] = json!({"expectedLift": "5%", "confidenceScore": 0.5, "sampleSize": 10});
		let rec: CampaignRecommendation = serde_json::from_value(value).unwrap();
		assert_eq!(rec.right_time.time_zone, "UTC");
		assert_eq!(rec.metrics.expected_lift, "5%");
	}

	#[test]
	fn audience_and_data_sources_default_when_absent() {
		let mut value = sample();
		let obj = value.as_object_mut().unwrap();
		obj.remove("rightAudience");
		obj.remove("dataSources");
		let rec: CampaignRecommendation = serde_json::from_value(value).unwrap();
		assert!(rec.right_audience.is_empty());
		assert!(rec.data_sources.is_empty());
	}

	#[test]
	fn negative_counts_are_rejected() {
		let mut value = sample();
		value["metrics"]["sample_size"] = json!(-1);
		assert!(serde_json::from_value::<CampaignRecommendation>(value).is_err());
	}

	#[test]
	fn missing_section_is_rejected() {
		let mut value = sample();
		value.as_object_mut().unwrap().remove("rightMessage");
		assert!(serde_json::from_value::<CampaignRecommendation>(value).is_err());
	}
}
