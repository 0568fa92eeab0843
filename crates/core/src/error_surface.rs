//! Single current-error slot shown to the operator.

use tracing::debug;

use crate::error::SessionError;

/// Holds the most recently reported error; newer reports replace older ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSurface {
	current: Option<SessionError>,
	reports: u64,
}

impl ErrorSurface {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn report(&mut self, error: impl Into<SessionError>) {
		let error = error.into();
		debug!(target = "cfeed.session", error = %error, "error surfaced");
		self.current = Some(error);
		self.reports += 1;
	}

	pub fn clear(&mut self) {
		self.current = None;
	}

	pub fn current(&self) -> Option<&SessionError> {
		self.current.as_ref()
	}

	/// Number of reports so far, including ones that repeated the current error.
	pub fn reports(&self) -> u64 {
		self.reports
	}

	/// Operator-facing text of the current error.
	pub fn message(&self) -> Option<String> {
		self.current.as_ref().map(ToString::to_string)
	}
}
