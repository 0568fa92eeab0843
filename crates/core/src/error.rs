//! Error taxonomy for the session core.
//!
//! None of these are fatal: each is shown on the [`ErrorSurface`] and the
//! session stays usable. The worst outcome is `Disconnected`, recovered by an
//! explicit reconnect.
//!
//! [`ErrorSurface`]: crate::ErrorSurface

use thiserror::Error;

pub use cfeed_runtime::TransportError;

/// Inbound payload that did not parse as a recommendation.
///
/// Does not affect the connection; later messages are decoded independently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Received an unexpected payload from the server.")]
pub struct DecodeError {
	/// Parser detail, kept for logs.
	pub reason: String,
}

impl From<serde_json::Error> for DecodeError {
	fn from(err: serde_json::Error) -> Self {
		Self { reason: err.to_string() }
	}
}

/// Action attempted in a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
	#[error("Connection is not ready. Please reconnect and try again.")]
	NotConnected,
	#[error("Select at least one data source and one channel before connecting.")]
	EmptySelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
	#[error(transparent)]
	Transport(#[from] TransportError),
	#[error(transparent)]
	Decode(#[from] DecodeError),
	#[error(transparent)]
	Guard(#[from] GuardError),
}

impl SessionError {
	pub fn is_transport(&self) -> bool {
		matches!(self, SessionError::Transport(_))
	}

	pub fn is_decode(&self) -> bool {
		matches!(self, SessionError::Decode(_))
	}

	pub fn is_guard(&self) -> bool {
		matches!(self, SessionError::Guard(_))
	}
}

pub type Result<T> = std::result::Result<T, SessionError>;
