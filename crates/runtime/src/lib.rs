//! Connection transport for the campaign feed client.
//!
//! A [`Connector`] opens links to the recommendation service. Every link is
//! stamped with a [`Generation`] and reports what happens to it through an
//! [`EventSink`], so the owner can tell events of the live connection apart
//! from late events of connections it already tore down.

pub mod endpoint;
pub mod fake;
pub mod transport;
pub mod websocket;

pub use endpoint::{DEFAULT_ENDPOINT, EndpointError, EndpointSource, resolve_endpoint};
pub use transport::{Connector, EventSink, Generation, Link, LinkEvent, LinkEventKind, TransportError, event_channel};
pub use websocket::{WsConnector, WsLink};
