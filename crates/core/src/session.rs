//! Session facade owning selections, connection, transcript, and error slot.
//!
//! The presentation layer reads snapshots and calls the action methods; link
//! events are fed back in through [`Session::handle_event`] (or
//! [`Session::next_event`] / [`Session::pump`]). Everything runs on one task,
//! so no locking is involved.

use cfeed_protocol::{ChannelId, DataSourceId};
use cfeed_runtime::{Connector, LinkEvent, TransportError, event_channel};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::codec::{decode, encode_frame, encode_preference_sync, encode_prompt};
use crate::connection::{ConnectionManager, ConnectionState, Transition};
use crate::error::{GuardError, Result, SessionError};
use crate::error_surface::ErrorSurface;
use crate::feed::{TranscriptEntry, TranscriptFeed};
use crate::selection::SelectionSet;

/// Outcome of [`Session::submit_prompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
	/// Prompt sent and recorded in the transcript.
	Sent,
	/// Blank prompt; nothing happened.
	Ignored,
}

/// Owned view of the session for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
	pub endpoint: String,
	pub state: ConnectionState,
	pub data_sources: Vec<DataSourceId>,
	pub channels: Vec<ChannelId>,
	pub error: Option<String>,
	pub transcript: Vec<TranscriptEntry>,
}

pub struct Session<C: Connector> {
	endpoint: String,
	sources: SelectionSet<DataSourceId>,
	channels: SelectionSet<ChannelId>,
	connection: ConnectionManager<C>,
	feed: TranscriptFeed,
	error: ErrorSurface,
	events: mpsc::UnboundedReceiver<LinkEvent>,
}

impl<C: Connector> Session<C> {
	pub fn new(connector: C, endpoint: impl Into<String>) -> Self {
		let (tx, events) = event_channel();
		Self {
			endpoint: endpoint.into(),
			sources: SelectionSet::new(),
			channels: SelectionSet::new(),
			connection: ConnectionManager::new(connector, tx),
			feed: TranscriptFeed::new(),
			error: ErrorSurface::new(),
			events,
		}
	}

	/// Starts with the given selections instead of empty ones.
	pub fn with_selections(mut self, sources: impl IntoIterator<Item = DataSourceId>, channels: impl IntoIterator<Item = ChannelId>) -> Self {
		self.sources = sources.into_iter().collect();
		self.channels = channels.into_iter().collect();
		self
	}

	/// Replaces the transcript with an empty feed of the given capacity.
	pub fn with_transcript_capacity(mut self, capacity: usize) -> Self {
		self.feed = TranscriptFeed::with_capacity(capacity);
		self
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn state(&self) -> ConnectionState {
		self.connection.state()
	}

	pub fn feed(&self) -> &TranscriptFeed {
		&self.feed
	}

	pub fn error(&self) -> Option<&SessionError> {
		self.error.current()
	}

	/// Bumps on every surfaced error, so observers can spot a repeat of the
	/// same message.
	pub fn error_reports(&self) -> u64 {
		self.error.reports()
	}

	pub fn sources(&self) -> &SelectionSet<DataSourceId> {
		&self.sources
	}

	pub fn channels(&self) -> &SelectionSet<ChannelId> {
		&self.channels
	}

	pub fn snapshot(&self) -> SessionSnapshot {
		SessionSnapshot {
			endpoint: self.endpoint.clone(),
			state: self.state(),
			data_sources: self.sources.to_vec(),
			channels: self.channels.to_vec(),
			error: self.error.message(),
			transcript: self.feed.iter().cloned().collect(),
		}
	}

	pub fn toggle_source(&mut self, id: DataSourceId) {
		self.sources = self.sources.toggle(id);
		debug!(target = "cfeed.session", source = %id, selected = self.sources.contains(id), "data source toggled");
	}

	pub fn toggle_channel(&mut self, id: ChannelId) {
		self.channels = self.channels.toggle(id);
		debug!(target = "cfeed.session", channel = %id, selected = self.channels.contains(id), "channel toggled");
	}

	/// Opens a fresh connection, closing any existing one first.
	///
	/// Requires at least one data source and one channel; otherwise raises
	/// [`GuardError::EmptySelection`] and changes nothing else.
	pub fn connect(&mut self) -> Result<()> {
		if self.sources.is_empty() || self.channels.is_empty() {
			return Err(self.raise(GuardError::EmptySelection));
		}
		self.error.clear();
		self.connection.connect(&self.endpoint);
		Ok(())
	}

	pub fn disconnect(&mut self) {
		self.connection.disconnect();
	}

	pub fn clear_transcript(&mut self) {
		self.feed.clear();
	}

	pub fn clear_error(&mut self) {
		self.error.clear();
	}

	/// Sends the current selections. Silent no-op unless connected.
	pub fn sync_preferences(&mut self) -> Result<bool> {
		let message = encode_preference_sync(&self.sources, &self.channels);
		let frame = encode_frame(&message).map_err(|err| self.raise(err))?;
		match self.connection.send(frame) {
			Ok(sent) => {
				if sent {
					debug!(target = "cfeed.session", sources = self.sources.len(), channels = self.channels.len(), "preferences synced");
				}
				Ok(sent)
			}
			Err(err) => Err(self.raise(err)),
		}
	}

	/// Sends a prompt and records it as the newest transcript entry.
	///
	/// Blank prompts are ignored without error. Submitting while not connected
	/// raises [`GuardError::NotConnected`].
	pub fn submit_prompt(&mut self, text: &str) -> Result<Submitted> {
		let Some(message) = encode_prompt(text, &self.sources, &self.channels) else {
			return Ok(Submitted::Ignored);
		};
		if !self.connection.is_connected() {
			return Err(self.raise(GuardError::NotConnected));
		}

		self.error.clear();
		let frame = encode_frame(&message).map_err(|err| self.raise(err))?;
		match self.connection.send(frame) {
			Ok(true) => {}
			Ok(false) => return Err(self.raise(GuardError::NotConnected)),
			Err(err) => return Err(self.raise(err)),
		}

		info!(target = "cfeed.session", chars = message.prompt.len(), "prompt submitted");
		self.feed.push(TranscriptEntry::user(message.prompt, Utc::now()));
		Ok(Submitted::Sent)
	}

	/// Waits for the next link event.
	pub async fn next_event(&mut self) -> Option<LinkEvent> {
		self.events.recv().await
	}

	/// Handles every event already queued, without waiting. Returns how many
	/// were processed.
	pub fn pump(&mut self) -> usize {
		let mut handled = 0;
		while let Ok(event) = self.events.try_recv() {
			self.handle_event(event);
			handled += 1;
		}
		handled
	}

	/// Applies one link event.
	pub fn handle_event(&mut self, event: LinkEvent) {
		let Some(transition) = self.connection.accept(event) else {
			return;
		};

		match transition {
			Transition::Opened => {
				// The service reads the selection snapshot right after open.
				let _ = self.sync_preferences();
			}
			Transition::Message(raw) => match decode(&raw) {
				Ok(payload) => {
					debug!(target = "cfeed.session", campaign_id = payload.campaign_id, "recommendation received");
					self.feed.push(TranscriptEntry::assistant(payload));
				}
				Err(err) => {
					warn!(target = "cfeed.session", reason = %err.reason, "failed to decode payload");
					self.error.report(err);
				}
			},
			Transition::Failed(reason) => self.error.report(TransportError::Socket(reason)),
			Transition::Closed => self.error.report(TransportError::Closed),
		}
	}

	fn raise(&mut self, error: impl Into<SessionError>) -> SessionError {
		let error = error.into();
		self.error.report(error.clone());
		error
	}
}
