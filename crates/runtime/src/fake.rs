//! Fake connector for unit testing session state transitions.
//!
//! Provides an in-memory connector so the session core can be driven without
//! a network. Links never produce events on their own: the test decides when
//! each generation opens, receives a message, fails, or closes.
//!
//! # Example
//!
//! ```ignore
//! let (connector, controller) = FakeConnectorBuilder::new().build();
//! let mut session = Session::new(connector, "ws://test/ws");
//! session.connect()?;
//!
//! controller.open_latest();
//! session.pump();
//! assert_eq!(controller.take_sent().len(), 1);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::transport::{Connector, EventSink, Generation, Link, TransportError};

/// Builder for creating fake connector instances.
pub struct FakeConnectorBuilder {
	fail_sends: bool,
}

impl FakeConnectorBuilder {
	pub fn new() -> Self {
		Self { fail_sends: false }
	}

	/// Makes every `Link::send` fail with [`TransportError::Closed`].
	pub fn fail_sends(mut self) -> Self {
		self.fail_sends = true;
		self
	}

	/// Build the connector and a controller sharing its recorded state.
	pub fn build(self) -> (FakeConnector, FakeConnectorController) {
		let state = Arc::new(Mutex::new(FakeState {
			fail_sends: self.fail_sends,
			..FakeState::default()
		}));
		(
			FakeConnector {
				state: Arc::clone(&state),
			},
			FakeConnectorController { state },
		)
	}
}

impl Default for FakeConnectorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Frame written through a fake link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
	pub generation: Generation,
	pub text: String,
}

#[derive(Default)]
struct FakeState {
	opened: Vec<OpenedLink>,
	sent: Vec<SentFrame>,
	closed: Vec<Generation>,
	fail_sends: bool,
}

struct OpenedLink {
	endpoint: String,
	sink: EventSink,
}

pub struct FakeConnector {
	state: Arc<Mutex<FakeState>>,
}

impl Connector for FakeConnector {
	type Link = FakeLink;

	fn open(&mut self, endpoint: &str, sink: EventSink) -> FakeLink {
		let generation = sink.generation();
		self.state.lock().opened.push(OpenedLink {
			endpoint: endpoint.to_string(),
			sink,
		});
		FakeLink {
			generation,
			state: Arc::clone(&self.state),
			closed: false,
		}
	}
}

pub struct FakeLink {
	generation: Generation,
	state: Arc<Mutex<FakeState>>,
	closed: bool,
}

impl Link for FakeLink {
	fn send(&mut self, frame: String) -> Result<(), TransportError> {
		let mut state = self.state.lock();
		if self.closed || state.fail_sends {
			return Err(TransportError::Closed);
		}
		state.sent.push(SentFrame {
			generation: self.generation,
			text: frame,
		});
		Ok(())
	}

	fn close(&mut self) {
		if !self.closed {
			self.closed = true;
			self.state.lock().closed.push(self.generation);
		}
	}
}

/// Controller for injecting link events and inspecting what was sent.
pub struct FakeConnectorController {
	state: Arc<Mutex<FakeState>>,
}

impl FakeConnectorController {
	/// Number of links opened so far.
	pub fn open_count(&self) -> usize {
		self.state.lock().opened.len()
	}

	/// Generation of the most recently opened link.
	pub fn latest_generation(&self) -> Option<Generation> {
		self.state.lock().opened.last().map(|link| link.sink.generation())
	}

	/// Endpoints passed to `open`, oldest first.
	pub fn endpoints(&self) -> Vec<String> {
		self.state.lock().opened.iter().map(|link| link.endpoint.clone()).collect()
	}

	/// Generations whose links were closed by their owner, in close order.
	pub fn closed(&self) -> Vec<Generation> {
		self.state.lock().closed.clone()
	}

	/// Make every link reject (or accept again) further sends.
	pub fn set_fail_sends(&self, fail: bool) {
		self.state.lock().fail_sends = fail;
	}

	/// Take all sent frames, clearing the buffer.
	pub fn take_sent(&self) -> Vec<SentFrame> {
		std::mem::take(&mut self.state.lock().sent)
	}

	/// Report `Opened` for `generation`.
	pub fn open(&self, generation: Generation) {
		self.with_sink(generation, EventSink::opened);
	}

	/// Report `Opened` for the most recent link.
	pub fn open_latest(&self) {
		if let Some(generation) = self.latest_generation() {
			self.open(generation);
		}
	}

	/// Deliver an inbound text frame on `generation`.
	pub fn deliver(&self, generation: Generation, text: &str) {
		self.with_sink(generation, |sink| sink.message(text));
	}

	/// Deliver an inbound text frame on the most recent link.
	pub fn deliver_latest(&self, text: &str) {
		if let Some(generation) = self.latest_generation() {
			self.deliver(generation, text);
		}
	}

	/// Report a socket error on `generation`.
	pub fn fail(&self, generation: Generation, reason: &str) {
		self.with_sink(generation, |sink| sink.error(reason));
	}

	/// Report a peer close on `generation`.
	pub fn close(&self, generation: Generation) {
		self.with_sink(generation, EventSink::closed);
	}

	fn with_sink(&self, generation: Generation, emit: impl FnOnce(&EventSink)) {
		let state = self.state.lock();
		if let Some(link) = state.opened.iter().find(|link| link.sink.generation() == generation) {
			emit(&link.sink);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::transport::{LinkEventKind, event_channel};

	#[test]
	fn records_opened_links_and_sent_frames() {
		let (mut connector, controller) = FakeConnectorBuilder::new().build();
		let (tx, _rx) = event_channel();

		let mut link = connector.open("ws://test/ws", EventSink::new(Generation::new(1), tx));
		link.send("hello".to_string()).unwrap();

		assert_eq!(controller.endpoints(), vec!["ws://test/ws"]);
		assert_eq!(controller.latest_generation(), Some(Generation::new(1)));
		let sent = controller.take_sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].text, "hello");
		assert!(controller.take_sent().is_empty());
	}

	#[test]
	fn injected_events_carry_link_generation() {
		let (mut connector, controller) = FakeConnectorBuilder::new().build();
		let (tx, mut rx) = event_channel();

		let _first = connector.open("ws://a", EventSink::new(Generation::new(1), tx.clone()));
		let _second = connector.open("ws://b", EventSink::new(Generation::new(2), tx));

		controller.open(Generation::new(1));
		controller.deliver_latest("{}");

		let first = rx.try_recv().unwrap();
		assert_eq!(first.generation, Generation::new(1));
		assert_eq!(first.kind, LinkEventKind::Opened);
		let second = rx.try_recv().unwrap();
		assert_eq!(second.generation, Generation::new(2));
	}

	#[test]
	fn closed_link_rejects_sends_and_records_close_once() {
		let (mut connector, controller) = FakeConnectorBuilder::new().build();
		let (tx, _rx) = event_channel();

		let mut link = connector.open("ws://test/ws", EventSink::new(Generation::new(3), tx));
		link.close();
		link.close();

		assert_eq!(link.send("late".to_string()), Err(TransportError::Closed));
		assert_eq!(controller.closed(), vec![Generation::new(3)]);
	}
}
