//! Line-oriented interactive loop.
//!
//! Plain lines are prompts; lines starting with `:` are commands. A leading
//! `::` sends the rest of the line, colon included, as a prompt.

use std::path::PathBuf;

use cfeed::protocol::{ChannelId, DataSourceId, UnknownId};
use cfeed::runtime::Connector;
use cfeed::{ConnectionState, Session, Submitted, TranscriptEntry, TranscriptFeed};
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::config::ClientConfig;
use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	Prompt(String),
	ToggleSource(DataSourceId),
	ToggleChannel(ChannelId),
	Connect,
	Disconnect,
	Sync,
	Clear,
	Status,
	Feed,
	Catalog,
	Save,
	Help,
	Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	#[error("unknown command ':{0}' (try :help)")]
	UnknownCommand(String),
	#[error(":{command} needs an argument")]
	MissingArgument { command: &'static str },
	#[error(transparent)]
	UnknownId(#[from] UnknownId),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Action>, ParseError> {
	let line = line.trim();
	if line.is_empty() {
		return Ok(None);
	}
	if let Some(escaped) = line.strip_prefix("::") {
		return Ok(Some(Action::Prompt(format!(":{escaped}"))));
	}
	let Some(command) = line.strip_prefix(':') else {
		return Ok(Some(Action::Prompt(line.to_string())));
	};

	let (name, arg) = match command.split_once(char::is_whitespace) {
		Some((name, arg)) => (name, arg.trim()),
		None => (command, ""),
	};

	let action = match name.to_ascii_lowercase().as_str() {
		"source" | "src" => Action::ToggleSource(require(arg, "source")?.parse()?),
		"channel" | "ch" => Action::ToggleChannel(require(arg, "channel")?.parse()?),
		"connect" | "reconnect" => Action::Connect,
		"disconnect" => Action::Disconnect,
		"sync" => Action::Sync,
		"clear" => Action::Clear,
		"status" => Action::Status,
		"feed" => Action::Feed,
		"catalog" => Action::Catalog,
		"save" => Action::Save,
		"help" | "?" => Action::Help,
		"quit" | "q" | "exit" => Action::Quit,
		other => return Err(ParseError::UnknownCommand(other.to_string())),
	};
	Ok(Some(action))
}

fn require<'a>(arg: &'a str, command: &'static str) -> Result<&'a str, ParseError> {
	if arg.is_empty() { Err(ParseError::MissingArgument { command }) } else { Ok(arg) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
	Continue,
	Quit,
}

/// Structured output for `--format json`.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Notice<'a> {
	State { state: ConnectionState },
	Entry { entry: &'a TranscriptEntry },
	Error { message: String },
	Info { message: &'a str },
}

/// What the observer last printed.
#[derive(Debug, Default)]
struct Seen {
	state: ConnectionState,
	latest: Option<String>,
	error_reports: u64,
}

pub struct Repl<C: Connector> {
	session: Session<C>,
	format: OutputFormat,
	config: ClientConfig,
	config_path: Option<PathBuf>,
	seen: Seen,
}

impl<C: Connector> Repl<C> {
	pub fn new(session: Session<C>, format: OutputFormat, config: ClientConfig, config_path: Option<PathBuf>) -> Self {
		let seen = Seen {
			state: session.state(),
			latest: session.feed().latest().map(|entry| entry.id().to_string()),
			error_reports: session.error_reports(),
		};
		Self {
			session,
			format,
			config,
			config_path,
			seen,
		}
	}

	/// Runs until `:quit` or end of input.
	pub async fn run(mut self, connect: bool) -> anyhow::Result<()> {
		if self.format == OutputFormat::Text {
			print!("{}", render::status(&self.session));
			println!("Type :help for commands.");
		}
		if connect {
			self.apply(Action::Connect)?;
		}

		let mut lines = BufReader::new(tokio::io::stdin()).lines();
		loop {
			tokio::select! {
				line = lines.next_line() => {
					let Some(line) = line? else {
						debug!(target = "cfeed.cli", "stdin closed");
						break;
					};
					match parse_line(&line) {
						Ok(Some(action)) => {
							if self.apply(action)? == Flow::Quit {
								break;
							}
						}
						Ok(None) => {}
						Err(err) => self.notify_error(err.to_string())?,
					}
				}
				Some(event) = self.session.next_event() => self.session.handle_event(event),
			}
			self.observe()?;
		}

		self.session.disconnect();
		info!(target = "cfeed.cli", "session ended");
		Ok(())
	}

	fn apply(&mut self, action: Action) -> anyhow::Result<Flow> {
		debug!(target = "cfeed.cli", ?action, "applying action");
		// Action errors land on the session's error slot; `observe` prints them.
		match action {
			Action::Prompt(text) => {
				if let Ok(Submitted::Ignored) = self.session.submit_prompt(&text) {
					debug!(target = "cfeed.cli", "blank prompt ignored");
				}
			}
			Action::ToggleSource(id) => {
				self.session.toggle_source(id);
				self.info(&format!("{id}: {}", on_off(self.session.sources().contains(id))))?;
			}
			Action::ToggleChannel(id) => {
				self.session.toggle_channel(id);
				self.info(&format!("{id}: {}", on_off(self.session.channels().contains(id))))?;
			}
			Action::Connect => {
				let _ = self.session.connect();
			}
			Action::Disconnect => self.session.disconnect(),
			Action::Sync => match self.session.sync_preferences() {
				Ok(true) => self.info("preferences sent")?,
				Ok(false) => self.info("not connected; preferences are sent on the next connect")?,
				Err(_) => {}
			},
			Action::Clear => {
				self.session.clear_transcript();
				self.session.clear_error();
				self.seen.latest = None;
			}
			Action::Status => self.print_status()?,
			Action::Feed => self.print_feed()?,
			Action::Catalog => self.print(render::catalog(self.session.sources(), self.session.channels())),
			Action::Save => self.save()?,
			Action::Help => self.print(render::HELP.to_string()),
			Action::Quit => return Ok(Flow::Quit),
		}
		self.observe()?;
		Ok(Flow::Continue)
	}

	/// Prints whatever changed since the last call.
	fn observe(&mut self) -> anyhow::Result<()> {
		let state = self.session.state();
		if state != self.seen.state {
			self.seen.state = state;
			match self.format {
				OutputFormat::Text => println!("{}", render::status_badge(state)),
				OutputFormat::Json => println!("{}", render::json_line(&Notice::State { state })?),
			}
		}

		let fresh = unseen_entries(self.session.feed(), self.seen.latest.as_deref());
		for entry in fresh.iter().rev() {
			match self.format {
				OutputFormat::Text => print!("{}", render::entry(entry)),
				OutputFormat::Json => println!("{}", render::json_line(&Notice::Entry { entry })?),
			}
		}
		self.seen.latest = self.session.feed().latest().map(|entry| entry.id().to_string());

		let reports = self.session.error_reports();
		if reports != self.seen.error_reports {
			self.seen.error_reports = reports;
			if let Some(error) = self.session.error() {
				self.notify_error(error.to_string())?;
			}
		}
		Ok(())
	}

	fn save(&mut self) -> anyhow::Result<()> {
		let Some(path) = self.config_path.clone() else {
			self.notify_error("no config directory available; pass --config".to_string())?;
			return Ok(());
		};
		self.config.data_sources = self.session.sources().to_vec();
		self.config.channels = self.session.channels().to_vec();
		match self.config.save(&path) {
			Ok(()) => self.info(&format!("saved selections to {}", path.display())),
			Err(err) => self.notify_error(format!("failed to save {}: {err}", path.display())),
		}
	}

	fn print_status(&self) -> anyhow::Result<()> {
		match self.format {
			OutputFormat::Text => print!("{}", render::status(&self.session)),
			OutputFormat::Json => {
				let mut snapshot = self.session.snapshot();
				snapshot.transcript.clear();
				println!("{}", render::json_line(&snapshot)?);
			}
		}
		Ok(())
	}

	fn print_feed(&self) -> anyhow::Result<()> {
		if self.session.feed().is_empty() {
			return self.info("transcript is empty");
		}
		for entry in self.session.feed().iter().rev() {
			match self.format {
				OutputFormat::Text => print!("{}", render::entry(entry)),
				OutputFormat::Json => println!("{}", render::json_line(&Notice::Entry { entry })?),
			}
		}
		Ok(())
	}

	fn print(&self, text: String) {
		match self.format {
			OutputFormat::Text => println!("{}", text.trim_end()),
			OutputFormat::Json => {
				if let Ok(line) = render::json_line(&Notice::Info { message: text.trim_end() }) {
					println!("{line}");
				}
			}
		}
	}

	fn info(&self, message: &str) -> anyhow::Result<()> {
		match self.format {
			OutputFormat::Text => println!("{message}"),
			OutputFormat::Json => println!("{}", render::json_line(&Notice::Info { message })?),
		}
		Ok(())
	}

	fn notify_error(&self, message: String) -> anyhow::Result<()> {
		match self.format {
			OutputFormat::Text => eprintln!("{}", render::error_line(&message)),
			OutputFormat::Json => println!("{}", render::json_line(&Notice::Error { message })?),
		}
		Ok(())
	}
}

/// Entries newer than `seen`, newest first. Everything is new when `seen`
/// is unset or already evicted.
fn unseen_entries<'a>(feed: &'a TranscriptFeed, seen: Option<&str>) -> Vec<&'a TranscriptEntry> {
	feed.iter().take_while(|entry| Some(entry.id()) != seen).collect()
}

fn on_off(selected: bool) -> &'static str {
	if selected { "selected" } else { "deselected" }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_lines_are_prompts() {
		assert_eq!(parse_line("  Plan a launch  ").unwrap(), Some(Action::Prompt("Plan a launch".into())));
		assert_eq!(parse_line("   ").unwrap(), None);
	}

	#[test]
	fn double_colon_escapes_prompt() {
		assert_eq!(parse_line("::) smile").unwrap(), Some(Action::Prompt(":) smile".into())));
	}

	#[test]
	fn toggles_parse_ids() {
		assert_eq!(parse_line(":source facebook_pixel").unwrap(), Some(Action::ToggleSource(DataSourceId::FacebookPixel)));
		assert_eq!(parse_line(":channel WhatsApp").unwrap(), Some(Action::ToggleChannel(ChannelId::Whatsapp)));
		assert_eq!(parse_line(":ch   sms ").unwrap(), Some(Action::ToggleChannel(ChannelId::Sms)));
	}

	#[test]
	fn toggle_errors() {
		assert_eq!(parse_line(":source").unwrap_err(), ParseError::MissingArgument { command: "source" });
		assert!(matches!(parse_line(":channel fax").unwrap_err(), ParseError::UnknownId(_)));
	}

	#[test]
	fn simple_commands() {
		let cases = [
			(":connect", Action::Connect),
			(":reconnect", Action::Connect),
			(":disconnect", Action::Disconnect),
			(":sync", Action::Sync),
			(":clear", Action::Clear),
			(":STATUS", Action::Status),
			(":feed", Action::Feed),
			(":catalog", Action::Catalog),
			(":save", Action::Save),
			(":help", Action::Help),
			(":q", Action::Quit),
		];
		for (line, expected) in cases {
			assert_eq!(parse_line(line).unwrap(), Some(expected), "{line}");
		}
	}

	fn assistant(campaign_id: i64) -> TranscriptEntry {
		let payload = serde_json::json!({
			"campaignId": campaign_id,
			"generatedAt": "2024-01-01T00:00:00Z",
			"rightTime": {"send_at": "", "time_zone": "UTC", "window_minutes": 30, "rationale": ""},
			"rightChannel": {"id": "email", "name": "Email", "reason": ""},
			"rightMessage": {"headline": "", "body": "", "cta": "", "preview": "", "tone": ""},
			"metrics": {"expected_lift": "1%", "confidence_score": 0.5, "sample_size": 10}
		});
		TranscriptEntry::assistant(serde_json::from_value(payload).unwrap())
	}

	fn ids(entries: &[&TranscriptEntry]) -> Vec<String> {
		entries.iter().map(|entry| entry.id().to_string()).collect()
	}

	#[test]
	fn unseen_entries_cover_a_whole_burst() {
		let mut feed = TranscriptFeed::new();
		feed.push(assistant(1));
		let seen = feed.latest().map(|entry| entry.id().to_string());
		feed.push(assistant(2));
		feed.push(assistant(3));

		let fresh = unseen_entries(&feed, seen.as_deref());
		assert_eq!(ids(&fresh), vec!["3-2024-01-01T00:00:00Z", "2-2024-01-01T00:00:00Z"]);
		assert!(unseen_entries(&feed, feed.latest().map(TranscriptEntry::id)).is_empty());
	}

	#[test]
	fn unseen_entries_when_marker_evicted() {
		let mut feed = TranscriptFeed::with_capacity(2);
		feed.push(assistant(1));
		feed.push(assistant(2));
		feed.push(assistant(3));
		assert_eq!(unseen_entries(&feed, Some("1-2024-01-01T00:00:00Z")).len(), 2);
		assert_eq!(unseen_entries(&feed, None).len(), 2);
	}

	#[test]
	fn unknown_command() {
		assert_eq!(parse_line(":launch now").unwrap_err(), ParseError::UnknownCommand("launch".into()));
	}
}
