//! Transcript feed: one bounded, newest-first timeline of user prompts and
//! received recommendations.

use std::collections::VecDeque;

use cfeed_protocol::CampaignRecommendation;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Default number of entries kept.
pub const MAX_ENTRIES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
	User,
	Assistant,
}

/// One message in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum TranscriptEntry {
	#[serde(rename_all = "camelCase")]
	User { id: String, prompt: String, created_at: DateTime<Utc> },
	Assistant { id: String, payload: Box<CampaignRecommendation> },
}

impl TranscriptEntry {
	/// User entry with id `user-{createdAt}`.
	pub fn user(prompt: impl Into<String>, created_at: DateTime<Utc>) -> Self {
		TranscriptEntry::User {
			id: format!("user-{}", created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
			prompt: prompt.into(),
			created_at,
		}
	}

	/// Assistant entry with id `{campaignId}-{generatedAt}`.
	pub fn assistant(payload: CampaignRecommendation) -> Self {
		TranscriptEntry::Assistant {
			id: format!("{}-{}", payload.campaign_id, payload.generated_at),
			payload: Box::new(payload),
		}
	}

	pub fn id(&self) -> &str {
		match self {
			TranscriptEntry::User { id, .. } | TranscriptEntry::Assistant { id, .. } => id,
		}
	}

	pub fn kind(&self) -> EntryKind {
		match self {
			TranscriptEntry::User { .. } => EntryKind::User,
			TranscriptEntry::Assistant { .. } => EntryKind::Assistant,
		}
	}

	fn set_id(&mut self, new_id: String) {
		match self {
			TranscriptEntry::User { id, .. } | TranscriptEntry::Assistant { id, .. } => *id = new_id,
		}
	}
}

/// Capacity-bounded transcript, front = most recent.
///
/// Entries from both directions share a single ordering by insertion recency.
/// Pushing at capacity evicts the oldest entry from the back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptFeed {
	entries: VecDeque<TranscriptEntry>,
	#[serde(skip)]
	capacity: usize,
}

impl Default for TranscriptFeed {
	fn default() -> Self {
		Self::with_capacity(MAX_ENTRIES)
	}
}

impl TranscriptFeed {
	pub fn new() -> Self {
		Self::default()
	}

	/// Feed holding at most `capacity` entries (minimum 1).
	pub fn with_capacity(capacity: usize) -> Self {
		let capacity = capacity.max(1);
		Self {
			entries: VecDeque::with_capacity(capacity),
			capacity,
		}
	}

	/// Inserts `entry` at the front and returns the evicted oldest entry, if any.
	///
	/// An id already present in the feed gets a `-N` suffix so ids stay unique.
	pub fn push(&mut self, mut entry: TranscriptEntry) -> Option<TranscriptEntry> {
		if self.contains_id(entry.id()) {
			let unique = self.unique_id(entry.id());
			entry.set_id(unique);
		}

		self.entries.push_front(entry);
		if self.entries.len() > self.capacity {
			self.entries.pop_back()
		} else {
			None
		}
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Most recent entry.
	pub fn latest(&self) -> Option<&TranscriptEntry> {
		self.entries.front()
	}

	/// Entries newest first.
	pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TranscriptEntry> + ExactSizeIterator {
		self.entries.iter()
	}

	pub fn contains_id(&self, id: &str) -> bool {
		self.entries.iter().any(|entry| entry.id() == id)
	}

	fn unique_id(&self, base: &str) -> String {
		(2..)
			.map(|n| format!("{base}-{n}"))
			.find(|candidate| !self.contains_id(candidate))
			.unwrap_or_else(|| base.to_string())
	}
}

impl<'a> IntoIterator for &'a TranscriptFeed {
	type Item = &'a TranscriptEntry;
	type IntoIter = std::collections::vec_deque::Iter<'a, TranscriptEntry>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;

	use super::*;
	use crate::codec::decode;
	use crate::test_support::recommendation_json;

	fn at(second: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, second).unwrap()
	}

	fn prompt(n: u32) -> TranscriptEntry {
		TranscriptEntry::user(format!("prompt {n}"), at(n))
	}

	fn prompt_text(entry: &TranscriptEntry) -> &str {
		match entry {
			TranscriptEntry::User { prompt, .. } => prompt,
			TranscriptEntry::Assistant { .. } => panic!("expected user entry"),
		}
	}

	#[test]
	fn keeps_twenty_most_recent_of_twenty_five() {
		let mut feed = TranscriptFeed::new();
		for n in 0..25 {
			feed.push(prompt(n));
		}

		assert_eq!(feed.len(), MAX_ENTRIES);
		let prompts: Vec<_> = feed.iter().map(prompt_text).collect();
		let expected: Vec<_> = (5..25).rev().map(|n| format!("prompt {n}")).collect();
		assert_eq!(prompts, expected);
	}

	#[test]
	fn push_returns_evicted_entry() {
		let mut feed = TranscriptFeed::with_capacity(2);
		assert!(feed.push(prompt(0)).is_none());
		assert!(feed.push(prompt(1)).is_none());
		let evicted = feed.push(prompt(2)).unwrap();
		assert_eq!(prompt_text(&evicted), "prompt 0");
		assert_eq!(feed.len(), 2);
	}

	#[test]
	fn user_and_assistant_entries_share_one_timeline() {
		let mut feed = TranscriptFeed::new();
		feed.push(prompt(1));
		feed.push(TranscriptEntry::assistant(decode(&recommendation_json(7, "2024-01-01T00:00:02Z")).unwrap()));
		feed.push(prompt(3));

		let kinds: Vec<_> = feed.iter().map(TranscriptEntry::kind).collect();
		assert_eq!(kinds, vec![EntryKind::User, EntryKind::Assistant, EntryKind::User]);
		assert_eq!(feed.latest().map(TranscriptEntry::id), Some("user-2024-01-01T00:00:03.000Z"));
	}

	#[test]
	fn entry_ids_follow_content_and_timestamp() {
		let assistant = TranscriptEntry::assistant(decode(&recommendation_json(42, "2024-01-01T00:00:00Z")).unwrap());
		assert_eq!(assistant.id(), "42-2024-01-01T00:00:00Z");
		assert_eq!(prompt(9).id(), "user-2024-01-01T00:00:09.000Z");
	}

	#[test]
	fn colliding_ids_are_suffixed() {
		let mut feed = TranscriptFeed::new();
		let frame = recommendation_json(5, "2024-01-01T00:00:00Z");
		feed.push(TranscriptEntry::assistant(decode(&frame).unwrap()));
		feed.push(TranscriptEntry::assistant(decode(&frame).unwrap()));
		feed.push(TranscriptEntry::assistant(decode(&frame).unwrap()));

		let ids: Vec<_> = feed.iter().map(TranscriptEntry::id).collect();
		assert_eq!(ids, vec!["5-2024-01-01T00:00:00Z-3", "5-2024-01-01T00:00:00Z-2", "5-2024-01-01T00:00:00Z"]);
	}

	#[test]
	fn clear_is_idempotent() {
		let mut feed = TranscriptFeed::new();
		feed.clear();
		assert!(feed.is_empty());

		feed.push(prompt(0));
		feed.clear();
		feed.clear();
		assert_eq!(feed.len(), 0);
		assert_eq!(feed.capacity(), MAX_ENTRIES);
	}

	#[test]
	fn zero_capacity_is_raised_to_one() {
		let mut feed = TranscriptFeed::with_capacity(0);
		feed.push(prompt(0));
		feed.push(prompt(1));
		assert_eq!(feed.len(), 1);
		assert_eq!(prompt_text(feed.latest().unwrap()), "prompt 1");
	}

	#[test]
	fn user_entry_serializes_with_role_tag() {
		let value = serde_json::to_value(prompt(0)).unwrap();
		assert_eq!(value["role"], "user");
		assert_eq!(value["prompt"], "prompt 0");
		assert_eq!(value["createdAt"], "2024-01-01T00:00:00Z");
	}
}
