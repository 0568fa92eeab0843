//! WebSocket connector built on tokio-tungstenite.
//!
//! Each link runs on its own spawned task:
//! 1. Perform the handshake, racing it against the link being closed
//! 2. Report `Opened`
//! 3. Forward queued outbound frames and inbound text frames until either side closes
//!
//! [`WsConnector::open`] must be called from within a tokio runtime.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::transport::{Connector, EventSink, Link, TransportError};

/// Opens WebSocket links.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl WsConnector {
	pub fn new() -> Self {
		Self
	}
}

impl Connector for WsConnector {
	type Link = WsLink;

	fn open(&mut self, endpoint: &str, sink: EventSink) -> WsLink {
		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
		let generation = sink.generation();
		debug!(target = "cfeed.transport", %generation, endpoint, "opening websocket");
		let task = tokio::spawn(run_link(endpoint.to_string(), sink, outbound_rx));
		WsLink {
			outbound: Some(outbound_tx),
			task,
		}
	}
}

/// Handle to a spawned WebSocket task.
///
/// Closing (or dropping) the handle ends the outbound queue; the task then
/// sends a close frame, or abandons a handshake still in flight.
#[derive(Debug)]
pub struct WsLink {
	outbound: Option<mpsc::UnboundedSender<String>>,
	task: JoinHandle<()>,
}

impl WsLink {
	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}
}

impl Link for WsLink {
	fn send(&mut self, frame: String) -> Result<(), TransportError> {
		let outbound = self.outbound.as_ref().ok_or(TransportError::Closed)?;
		outbound.send(frame).map_err(|_| TransportError::Closed)
	}

	fn close(&mut self) {
		self.outbound.take();
	}
}

impl Drop for WsLink {
	fn drop(&mut self) {
		self.close();
	}
}

async fn run_link(endpoint: String, sink: EventSink, mut outbound: mpsc::UnboundedReceiver<String>) {
	let generation = sink.generation();

	let handshake = tokio::select! {
		result = connect_async(endpoint.as_str()) => result,
		_ = outbound.recv() => {
			debug!(target = "cfeed.transport", %generation, "link closed before handshake completed");
			return;
		}
	};

	let stream = match handshake {
		Ok((stream, _response)) => stream,
		Err(err) => {
			warn!(target = "cfeed.transport", %generation, endpoint = %endpoint, error = %err, "websocket handshake failed");
			sink.error(err.to_string());
			return;
		}
	};

	info!(target = "cfeed.transport", %generation, endpoint = %endpoint, "websocket open");
	sink.opened();

	let (mut ws_tx, mut ws_rx) = stream.split();
	loop {
		tokio::select! {
			frame = outbound.recv() => match frame {
				Some(text) => {
					if let Err(err) = ws_tx.send(Message::Text(text.into())).await {
						warn!(target = "cfeed.transport", %generation, error = %err, "websocket send failed");
						sink.error(err.to_string());
						return;
					}
				}
				None => {
					debug!(target = "cfeed.transport", %generation, "closing websocket");
					let _ = ws_tx.send(Message::Close(None)).await;
					return;
				}
			},
			incoming = ws_rx.next() => match incoming {
				Some(Ok(Message::Text(text))) => sink.message(text.as_str()),
				Some(Ok(Message::Binary(bytes))) => sink.message(String::from_utf8_lossy(&bytes).into_owned()),
				Some(Ok(Message::Close(frame))) => {
					debug!(target = "cfeed.transport", %generation, ?frame, "peer closed websocket");
					sink.closed();
					return;
				}
				Some(Ok(_)) => {}
				Some(Err(err)) => {
					warn!(target = "cfeed.transport", %generation, error = %err, "websocket receive failed");
					sink.error(err.to_string());
					return;
				}
				None => {
					sink.closed();
					return;
				}
			},
		}
	}
}
