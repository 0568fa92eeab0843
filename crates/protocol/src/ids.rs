//! Closed enumerations of data sources and activation channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier that did not match any member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownId {
	pub kind: &'static str,
	pub value: String,
	pub expected: String,
}

/// External signal provider the operator can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceId {
	Gtm,
	FacebookPixel,
	GoogleAdsTag,
}

impl DataSourceId {
	pub const ALL: [DataSourceId; 3] = [DataSourceId::Gtm, DataSourceId::FacebookPixel, DataSourceId::GoogleAdsTag];

	pub fn as_str(self) -> &'static str {
		match self {
			DataSourceId::Gtm => "gtm",
			DataSourceId::FacebookPixel => "facebook_pixel",
			DataSourceId::GoogleAdsTag => "google_ads_tag",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			DataSourceId::Gtm => "Google Tag Manager (GTM)",
			DataSourceId::FacebookPixel => "Facebook Pixel",
			DataSourceId::GoogleAdsTag => "Google Ads",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			DataSourceId::Gtm => "Onsite events like page views and funnels",
			DataSourceId::FacebookPixel => "Paid social conversions and remarketing events",
			DataSourceId::GoogleAdsTag => "Campaign spend, conversions and CTR",
		}
	}
}

/// Activation medium the operator can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelId {
	Email,
	Sms,
	Whatsapp,
	Ads,
}

impl ChannelId {
	pub const ALL: [ChannelId; 4] = [ChannelId::Email, ChannelId::Sms, ChannelId::Whatsapp, ChannelId::Ads];

	pub fn as_str(self) -> &'static str {
		match self {
			ChannelId::Email => "email",
			ChannelId::Sms => "sms",
			ChannelId::Whatsapp => "whatsapp",
			ChannelId::Ads => "ads",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			ChannelId::Email => "Email",
			ChannelId::Sms => "SMS",
			ChannelId::Whatsapp => "WhatsApp",
			ChannelId::Ads => "Ads",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			ChannelId::Email => "Rich storytelling with dynamic product blocks",
			ChannelId::Sms => "Short form alerts with instant click-through",
			ChannelId::Whatsapp => "Conversational follow-up with interactive elements",
			ChannelId::Ads => "Dynamic paid placements that mirror site experience",
		}
	}
}

fn parse_member<T: Copy>(kind: &'static str, value: &str, all: &[T], name: impl Fn(T) -> &'static str) -> Result<T, UnknownId> {
	let needle = value.trim();
	all.iter().copied().find(|id| name(*id).eq_ignore_ascii_case(needle)).ok_or_else(|| UnknownId {
		kind,
		value: value.to_string(),
		expected: all.iter().map(|id| name(*id)).collect::<Vec<_>>().join(", "),
	})
}

impl FromStr for DataSourceId {
	type Err = UnknownId;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_member("data source", s, &DataSourceId::ALL, DataSourceId::as_str)
	}
}

impl FromStr for ChannelId {
	type Err = UnknownId;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_member("channel", s, &ChannelId::ALL, ChannelId::as_str)
	}
}

impl fmt::Display for DataSourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl fmt::Display for ChannelId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
