//! Terminal rendering of the session: status, transcript cards, catalog.

use std::fmt::Write as _;

use cfeed::protocol::{CampaignRecommendation, ChannelId, DataSourceId};
use cfeed::runtime::Connector;
use cfeed::{ConnectionState, SelectionSet, Session, TranscriptEntry};
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;

const SEP: &str = " · ";

pub fn status_badge(state: ConnectionState) -> ColoredString {
	let label = state.to_string();
	match state {
		ConnectionState::Connected => label.green().bold(),
		ConnectionState::Connecting => label.yellow().bold(),
		ConnectionState::Disconnected => label.red().bold(),
	}
}

/// Formats an ISO-8601 timestamp as `Jan 1, 2024, 9:05 AM UTC`.
///
/// Empty input renders as `-`; anything unparseable is shown as given.
pub fn format_timestamp(raw: &str) -> String {
	if raw.trim().is_empty() {
		return "-".to_string();
	}
	match DateTime::parse_from_rfc3339(raw.trim()) {
		Ok(parsed) => format_utc(parsed.with_timezone(&Utc)),
		Err(_) => raw.to_string(),
	}
}

fn format_utc(at: DateTime<Utc>) -> String {
	at.format("%b %-d, %Y, %-I:%M %p UTC").to_string()
}

/// `2400` -> `2,400`.
pub fn group_thousands(value: u64) -> String {
	let digits = value.to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, ch) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(',');
		}
		out.push(ch);
	}
	out
}

pub fn entry(entry: &TranscriptEntry) -> String {
	match entry {
		TranscriptEntry::User { prompt, created_at, .. } => user_card(prompt, *created_at),
		TranscriptEntry::Assistant { payload, .. } => recommendation_card(payload),
	}
}

pub fn user_card(prompt: &str, created_at: DateTime<Utc>) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}  {}", "You".blue().bold(), format_utc(created_at).dimmed());
	for line in prompt.lines() {
		let _ = writeln!(out, "  {line}");
	}
	out
}

pub fn recommendation_card(rec: &CampaignRecommendation) -> String {
	let time = &rec.right_time;
	let channel = &rec.right_channel;
	let message = &rec.right_message;
	let metrics = &rec.metrics;
	let mut out = String::new();

	let title = format!("Campaign #{}{SEP}{}", rec.campaign_id, channel.name);
	let _ = writeln!(out, "{}  {}", title.bold(), format!("Generated {}", format_timestamp(&rec.generated_at)).dimmed());
	let _ = writeln!(out, "  {}", channel.reason);

	let _ = writeln!(out, "{}", "Right time".cyan().bold());
	let _ = writeln!(
		out,
		"  {} ({}){SEP}{} min window",
		format_timestamp(&time.send_at),
		time.time_zone,
		time.window_minutes
	);
	let _ = writeln!(out, "  {}", time.rationale.dimmed());

	let _ = writeln!(out, "{}", "Success forecast".cyan().bold());
	let _ = writeln!(
		out,
		"  Expected lift {}{SEP}Confidence {}{SEP}Sample {}",
		metrics.expected_lift,
		metrics.confidence_score,
		group_thousands(metrics.sample_size)
	);

	let _ = writeln!(out, "{}", "Right message".cyan().bold());
	let _ = writeln!(out, "  {}", message.headline.bold());
	for line in message.body.lines() {
		let _ = writeln!(out, "  {line}");
	}
	let _ = writeln!(out, "  {}", format!("CTA: {}{SEP}Tone: {}", message.cta, message.tone).blue());
	if !channel.supporting_signals.is_empty() {
		let signals: Vec<String> = channel.supporting_signals.iter().map(|s| format!("[{s}]")).collect();
		let _ = writeln!(out, "  {}", signals.join(" ").green());
	}

	let audience = &rec.right_audience;
	if !audience.is_empty() {
		let _ = writeln!(out, "{}", "Right audience".cyan().bold());
		let fields = [
			("Location", audience.location.clone()),
			("Age", audience.age_range.clone()),
			("Lifecycle", audience.lifecycle_stage.clone()),
			("Preferred device", audience.preferred_device.clone()),
			("Interests", Some(audience.interests.join(", ")).filter(|s| !s.is_empty())),
			("Behaviors", Some(audience.behaviors.join(", ")).filter(|s| !s.is_empty())),
		];
		for (label, value) in fields {
			if let Some(value) = value {
				let _ = writeln!(out, "  {label}{SEP}{value}");
			}
		}
	}

	if !rec.data_sources.is_empty() {
		let _ = writeln!(out, "{}", "Data signals".cyan().bold());
		let pretty = serde_json::to_string_pretty(&rec.data_sources).unwrap_or_default();
		for line in pretty.lines() {
			let _ = writeln!(out, "  {}", line.dimmed());
		}
	}
	out
}

/// Every known data source and channel, marking the current selections.
pub fn catalog(sources: &SelectionSet<DataSourceId>, channels: &SelectionSet<ChannelId>) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}", "Data sources".bold());
	for id in DataSourceId::ALL {
		let _ = writeln!(out, "  {} {:<16} {}", mark(sources.contains(id)), id.as_str(), id.label());
		let _ = writeln!(out, "      {}", id.description().dimmed());
	}
	let _ = writeln!(out, "{}", "Channels".bold());
	for id in ChannelId::ALL {
		let _ = writeln!(out, "  {} {:<16} {}", mark(channels.contains(id)), id.as_str(), id.label());
		let _ = writeln!(out, "      {}", id.description().dimmed());
	}
	out
}

fn mark(selected: bool) -> ColoredString {
	if selected { "[x]".green() } else { "[ ]".normal() }
}

pub fn status<C: Connector>(session: &Session<C>) -> String {
	let sources: Vec<&str> = session.sources().iter().map(|id| id.as_str()).collect();
	let channels: Vec<&str> = session.channels().iter().map(|id| id.as_str()).collect();
	let mut out = String::new();
	let _ = writeln!(out, "{} {}", status_badge(session.state()), session.endpoint().dimmed());
	let _ = writeln!(out, "  sources:  {}", list_or_none(&sources));
	let _ = writeln!(out, "  channels: {}", list_or_none(&channels));
	let _ = writeln!(out, "  feed:     {}/{} entries", session.feed().len(), session.feed().capacity());
	if let Some(error) = session.error() {
		let _ = writeln!(out, "  {}", error_line(&error.to_string()));
	}
	out
}

fn list_or_none(items: &[&str]) -> String {
	if items.is_empty() { "(none)".to_string() } else { items.join(", ") }
}

pub fn error_line(message: &str) -> ColoredString {
	format!("error: {message}").red()
}

pub const HELP: &str = "\
Type a prompt and press enter to send it. Commands:
  :source ID      toggle a data source (gtm, facebook_pixel, google_ads_tag)
  :channel ID     toggle a channel (email, sms, whatsapp, ads)
  :connect        open the connection (alias :reconnect)
  :disconnect     close the connection
  :sync           send the current selections again
  :clear          clear the transcript and any error
  :status         show connection state and selections
  :feed           print the transcript, oldest first
  :catalog        list data sources and channels
  :save           store the current selections in the config file
  :help           show this help
  :quit           exit";

/// One compact JSON document per line.
pub fn json_line<T: Serialize>(value: &T) -> serde_json::Result<String> {
	serde_json::to_string(value)
}
