//! Transport seam between the session core and a concrete connection.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

/// Connection-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	/// Handshake or socket failure reported by the underlying connection.
	#[error("WebSocket error ({0}). Please check that the backend is running.")]
	Socket(String),
	/// The peer closed the connection, or the link is already gone.
	#[error("Connection closed by the server. Reconnect to resume streaming.")]
	Closed,
	/// Outbound message could not be serialized into a frame.
	#[error("Failed to encode outbound message: {0}")]
	Encode(String),
}

/// Identity of one connection attempt.
///
/// Strictly increasing per owner; events carry the generation of the link
/// that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
	pub const fn new(value: u64) -> Self {
		Self(value)
	}

	pub const fn get(self) -> u64 {
		self.0
	}

	#[must_use]
	pub const fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// What happened on a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEventKind {
	Opened,
	Message(String),
	Error(String),
	Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
	pub generation: Generation,
	pub kind: LinkEventKind,
}

/// Creates the channel links report into.
pub fn event_channel() -> (mpsc::UnboundedSender<LinkEvent>, mpsc::UnboundedReceiver<LinkEvent>) {
	mpsc::unbounded_channel()
}

/// Generation-stamped event sender handed to a [`Connector`].
#[derive(Debug, Clone)]
pub struct EventSink {
	generation: Generation,
	tx: mpsc::UnboundedSender<LinkEvent>,
}

impl EventSink {
	pub fn new(generation: Generation, tx: mpsc::UnboundedSender<LinkEvent>) -> Self {
		Self { generation, tx }
	}

	pub fn generation(&self) -> Generation {
		self.generation
	}

	pub fn opened(&self) {
		self.emit(LinkEventKind::Opened);
	}

	pub fn message(&self, text: impl Into<String>) {
		self.emit(LinkEventKind::Message(text.into()));
	}

	pub fn error(&self, reason: impl Into<String>) {
		self.emit(LinkEventKind::Error(reason.into()));
	}

	pub fn closed(&self) {
		self.emit(LinkEventKind::Closed);
	}

	fn emit(&self, kind: LinkEventKind) {
		// Receiver gone means the owning session was dropped.
		let _ = self.tx.send(LinkEvent {
			generation: self.generation,
			kind,
		});
	}
}

/// Live handle to one opened connection.
pub trait Link: Send {
	/// Queues a text frame. Never blocks; frames go out in call order.
	fn send(&mut self, frame: String) -> Result<(), TransportError>;

	/// Closes the connection. Idempotent. A closed link emits no further events
	/// that the owner needs to act on.
	fn close(&mut self);
}

/// Opens links to an endpoint.
pub trait Connector {
	type Link: Link;

	/// Starts opening a connection and returns immediately. The outcome is
	/// reported later through `sink` (`Opened`, then messages, then `Closed`
	/// or `Error`).
	fn open(&mut self, endpoint: &str, sink: EventSink) -> Self::Link;
}
