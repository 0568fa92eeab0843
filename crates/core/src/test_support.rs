use serde_json::json;

/// Minimal well-formed recommendation frame.
pub(crate) fn recommendation_json(campaign_id: i64, generated_at: &str) -> String {
	json!({
		"campaignId": campaign_id,
		"generatedAt": generated_at,
		"rightTime": {"send_at": "2024-01-01T00:30:00Z", "time_zone": "America/New_York", "window_minutes": 30, "rationale": "r"},
		"rightChannel": {"id": "sms", "name": "SMS", "reason": "fast", "supportingSignals": []},
		"rightMessage": {"headline": "h", "body": "b", "cta": "c", "preview": "p", "tone": "urgent"},
		"rightAudience": {},
		"dataSources": {},
		"metrics": {"expected_lift": "5%", "confidence_score": 0.8, "sample_size": 1000}
	})
	.to_string()
}
