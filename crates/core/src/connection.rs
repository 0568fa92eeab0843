//! Connection manager: owns the single live link and its state machine.
//!
//! ```text
//! Disconnected --connect--> Connecting --Opened--> Connected
//!      ^                        |                      |
//!      +------ Error / Closed / disconnect ------------+
//! ```
//!
//! Every `connect` tears down the previous link and starts a new
//! [`Generation`]. Events are accepted only when they carry the live
//! generation, so a late `Opened` or `Error` from a torn-down link can never
//! resurrect or kill the current one.

use std::fmt;

use cfeed_runtime::{Connector, EventSink, Generation, Link, LinkEvent, LinkEventKind, TransportError};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
	#[default]
	Disconnected,
	Connecting,
	Connected,
}

impl fmt::Display for ConnectionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ConnectionState::Disconnected => "disconnected",
			ConnectionState::Connecting => "connecting",
			ConnectionState::Connected => "connected",
		})
	}
}

/// Effect of an accepted link event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
	/// Connecting -> Connected.
	Opened,
	/// Inbound frame on the connected link.
	Message(String),
	/// Link failed; now Disconnected.
	Failed(String),
	/// Peer closed the link; now Disconnected.
	Closed,
}

pub struct ConnectionManager<C: Connector> {
	connector: C,
	state: ConnectionState,
	last_generation: Generation,
	live: Option<Live<C::Link>>,
	events: mpsc::UnboundedSender<LinkEvent>,
}

struct Live<L> {
	generation: Generation,
	link: L,
}

impl<C: Connector> ConnectionManager<C> {
	/// Creates a manager whose links report into `events`.
	pub fn new(connector: C, events: mpsc::UnboundedSender<LinkEvent>) -> Self {
		Self {
			connector,
			state: ConnectionState::Disconnected,
			last_generation: Generation::default(),
			live: None,
			events,
		}
	}

	pub fn state(&self) -> ConnectionState {
		self.state
	}

	pub fn is_connected(&self) -> bool {
		self.state == ConnectionState::Connected
	}

	/// Generation of the live link, if any.
	pub fn live_generation(&self) -> Option<Generation> {
		self.live.as_ref().map(|live| live.generation)
	}

	/// Closes any existing link, then starts opening a new one. Returns
	/// immediately in `Connecting`.
	pub fn connect(&mut self, endpoint: &str) -> Generation {
		self.teardown();

		let generation = self.last_generation.next();
		self.last_generation = generation;
		self.state = ConnectionState::Connecting;

		info!(target = "cfeed.session", %generation, endpoint, "connecting");
		let link = self.connector.open(endpoint, EventSink::new(generation, self.events.clone()));
		self.live = Some(Live { generation, link });
		generation
	}

	/// Closes the live link if any and forces `Disconnected`. Returns whether
	/// anything was torn down.
	pub fn disconnect(&mut self) -> bool {
		let had_link = self.teardown();
		if had_link {
			info!(target = "cfeed.session", "disconnected");
		}
		self.state = ConnectionState::Disconnected;
		had_link
	}

	/// Applies an event from a link. Returns `None` for stale events and for
	/// events that do not fit the current state.
	pub fn accept(&mut self, event: LinkEvent) -> Option<Transition> {
		if self.live_generation() != Some(event.generation) {
			debug!(target = "cfeed.session", generation = %event.generation, kind = ?event.kind, "ignoring stale link event");
			return None;
		}

		match event.kind {
			LinkEventKind::Opened => {
				if self.state != ConnectionState::Connecting {
					return None;
				}
				self.state = ConnectionState::Connected;
				info!(target = "cfeed.session", generation = %event.generation, "connected");
				Some(Transition::Opened)
			}
			LinkEventKind::Message(text) => {
				if self.state != ConnectionState::Connected {
					warn!(target = "cfeed.session", generation = %event.generation, "dropping message received before open");
					return None;
				}
				Some(Transition::Message(text))
			}
			LinkEventKind::Error(reason) => {
				warn!(target = "cfeed.session", generation = %event.generation, %reason, "connection error");
				self.teardown();
				self.state = ConnectionState::Disconnected;
				Some(Transition::Failed(reason))
			}
			LinkEventKind::Closed => {
				info!(target = "cfeed.session", generation = %event.generation, "connection closed by peer");
				self.live = None;
				self.state = ConnectionState::Disconnected;
				Some(Transition::Closed)
			}
		}
	}

	/// Sends a frame on the connected link.
	///
	/// Returns `Ok(false)` without sending when not connected. A link that
	/// refuses the frame is torn down and the manager drops to `Disconnected`.
	pub fn send(&mut self, frame: String) -> Result<bool, TransportError> {
		if self.state != ConnectionState::Connected {
			debug!(target = "cfeed.session", state = %self.state, "send skipped: not connected");
			return Ok(false);
		}
		let Some(live) = self.live.as_mut() else {
			return Ok(false);
		};
		if let Err(err) = live.link.send(frame) {
			warn!(target = "cfeed.session", generation = %live.generation, error = %err, "send failed, dropping link");
			self.fail();
			return Err(err);
		}
		Ok(true)
	}

	/// Tears down the live link after a transport failure and forces
	/// `Disconnected`.
	pub fn fail(&mut self) {
		self.teardown();
		self.state = ConnectionState::Disconnected;
	}

	fn teardown(&mut self) -> bool {
		match self.live.take() {
			Some(mut live) => {
				debug!(target = "cfeed.session", generation = %live.generation, "closing link");
				live.link.close();
				true
			}
			None => false,
		}
	}
}

impl<C: Connector> Drop for ConnectionManager<C> {
	fn drop(&mut self) {
		self.teardown();
	}
}

#[cfg(test)]
mod tests {
	use cfeed_runtime::event_channel;
	use cfeed_runtime::fake::{FakeConnectorBuilder, FakeConnectorController};
	use cfeed_runtime::fake::FakeConnector;
	use tokio::sync::mpsc::UnboundedReceiver;

	use super::*;

	fn manager() -> (ConnectionManager<FakeConnector>, FakeConnectorController, UnboundedReceiver<LinkEvent>) {
		let (connector, controller) = FakeConnectorBuilder::new().build();
		let (tx, rx) = event_channel();
		(ConnectionManager::new(connector, tx), controller, rx)
	}

	fn drain(manager: &mut ConnectionManager<FakeConnector>, rx: &mut UnboundedReceiver<LinkEvent>) -> Vec<Transition> {
		std::iter::from_fn(|| rx.try_recv().ok()).filter_map(|event| manager.accept(event)).collect()
	}

	#[test]
	fn connect_enters_connecting_then_connected_on_open() {
		let (mut manager, controller, mut rx) = manager();
		let generation = manager.connect("ws://test/ws");
		assert_eq!(manager.state(), ConnectionState::Connecting);
		assert_eq!(controller.endpoints(), vec!["ws://test/ws"]);

		controller.open(generation);
		assert_eq!(drain(&mut manager, &mut rx), vec![Transition::Opened]);
		assert!(manager.is_connected());
	}

	#[test]
	fn reconnect_tears_down_previous_link_and_ignores_its_events() {
		let (mut manager, controller, mut rx) = manager();
		let first = manager.connect("ws://test/ws");
		let second = manager.connect("ws://test/ws");

		assert_eq!(controller.closed(), vec![first]);
		assert_eq!(manager.live_generation(), Some(second));

		controller.open(first);
		assert!(drain(&mut manager, &mut rx).is_empty());
		assert_eq!(manager.state(), ConnectionState::Connecting);

		controller.open(second);
		assert_eq!(drain(&mut manager, &mut rx), vec![Transition::Opened]);
	}

	#[test]
	fn disconnect_while_connecting_suppresses_late_open() {
		let (mut manager, controller, mut rx) = manager();
		let generation = manager.connect("ws://test/ws");
		assert!(manager.disconnect());

		controller.open(generation);
		controller.fail(generation, "late");
		assert!(drain(&mut manager, &mut rx).is_empty());
		assert_eq!(manager.state(), ConnectionState::Disconnected);
	}

	#[test]
	fn disconnect_is_idempotent() {
		let (mut manager, _controller, _rx) = manager();
		assert!(!manager.disconnect());
		assert!(!manager.disconnect());
		assert_eq!(manager.state(), ConnectionState::Disconnected);
	}

	#[test]
	fn error_forces_disconnected_and_closes_link() {
		let (mut manager, controller, mut rx) = manager();
		let generation = manager.connect("ws://test/ws");
		controller.open(generation);
		controller.fail(generation, "reset by peer");

		assert_eq!(drain(&mut manager, &mut rx), vec![Transition::Opened, Transition::Failed("reset by peer".to_string())]);
		assert_eq!(manager.state(), ConnectionState::Disconnected);
		assert_eq!(controller.closed(), vec![generation]);
		assert_eq!(manager.live_generation(), None);
	}

	#[test]
	fn peer_close_forces_disconnected() {
		let (mut manager, controller, mut rx) = manager();
		let generation = manager.connect("ws://test/ws");
		controller.open(generation);
		controller.close(generation);

		assert_eq!(drain(&mut manager, &mut rx), vec![Transition::Opened, Transition::Closed]);
		assert_eq!(manager.state(), ConnectionState::Disconnected);
	}

	#[test]
	fn send_is_noop_unless_connected() {
		let (mut manager, controller, mut rx) = manager();
		assert_eq!(manager.send("x".to_string()), Ok(false));

		let generation = manager.connect("ws://test/ws");
		assert_eq!(manager.send("x".to_string()), Ok(false));

		controller.open(generation);
		drain(&mut manager, &mut rx);
		assert_eq!(manager.send("y".to_string()), Ok(true));

		let sent = controller.take_sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].text, "y");
		assert_eq!(sent[0].generation, generation);
	}

	#[test]
	fn failed_send_drops_link_and_disconnects() {
		let (connector, controller) = FakeConnectorBuilder::new().fail_sends().build();
		let (tx, mut rx) = event_channel();
		let mut manager = ConnectionManager::new(connector, tx);
		let generation = manager.connect("ws://test/ws");
		controller.open(generation);
		drain(&mut manager, &mut rx);

		assert!(manager.send("x".to_string()).is_err());
		assert_eq!(manager.state(), ConnectionState::Disconnected);
		assert_eq!(manager.live_generation(), None);
		assert_eq!(controller.closed(), vec![generation]);

		controller.close(generation);
		assert!(drain(&mut manager, &mut rx).is_empty());
		assert_eq!(manager.send("y".to_string()), Ok(false));
	}

	#[test]
	fn messages_before_open_are_dropped() {
		let (mut manager, controller, mut rx) = manager();
		let generation = manager.connect("ws://test/ws");
		controller.deliver(generation, "{}");
		assert!(drain(&mut manager, &mut rx).is_empty());
	}

	#[test]
	fn generations_increase_across_reconnects() {
		let (mut manager, _controller, _rx) = manager();
		let first = manager.connect("ws://test/ws");
		manager.disconnect();
		let second = manager.connect("ws://test/ws");
		assert!(second > first);
	}
}
