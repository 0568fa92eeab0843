//! Client-side session core for a real-time campaign recommendation feed.
//!
//! [`Session`] keeps a persistent connection to the recommendation service,
//! pushes the operator's data-source and channel selections to it right after
//! every (re)connect, submits prompts, and accumulates a bounded, newest-first
//! transcript of everything exchanged.
//!
//! # Example
//!
//! ```ignore
//! use cfeed::{Session, protocol::{ChannelId, DataSourceId}};
//! use cfeed_runtime::WsConnector;
//!
//! let mut session = Session::new(WsConnector::new(), "ws://localhost:8000/ws")
//!     .with_selections([DataSourceId::Gtm], [ChannelId::Email]);
//! session.connect()?;
//! while let Some(event) = session.next_event().await {
//!     session.handle_event(event);
//! }
//! ```

pub mod codec;
pub mod connection;
pub mod error;
pub mod error_surface;
pub mod feed;
pub mod selection;
pub mod session;

#[cfg(test)]
mod test_support;

pub use cfeed_protocol as protocol;
pub use cfeed_runtime as runtime;
pub use connection::{ConnectionManager, ConnectionState, Transition};
pub use error::{DecodeError, GuardError, Result, SessionError, TransportError};
pub use error_surface::ErrorSurface;
pub use feed::{EntryKind, MAX_ENTRIES, TranscriptEntry, TranscriptFeed};
pub use selection::SelectionSet;
pub use session::{Session, SessionSnapshot, Submitted};
