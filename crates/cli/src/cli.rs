use std::path::PathBuf;

use cfeed_protocol::{ChannelId, DataSourceId};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "cfeed")]
#[command(about = "Campaign feed - stream right-time/right-channel recommendations from the terminal")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Config file (defaults to <config dir>/cfeed/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Options for the default `run` command
	#[command(flatten)]
	pub run: RunArgs,

	#[command(subcommand)]
	pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Start an interactive session (default)
	Run(RunArgs),

	/// List available data sources and channels
	Catalog,

	/// Print the endpoint a session would connect to
	Endpoint(ConnectionArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
	/// WebSocket endpoint, overrides host-derived and configured values
	#[arg(short, long, env = "CFEED_WS_URL", value_name = "URL")]
	pub endpoint: Option<String>,

	/// Deployment host (host[:port]) to derive `ws(s)://<host>/ws` from
	#[arg(long, value_name = "HOST")]
	pub host: Option<String>,

	/// Derive a `wss://` endpoint from --host
	#[arg(long)]
	pub secure: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
	#[command(flatten)]
	pub connection: ConnectionArgs,

	/// Data source to select at startup (repeatable)
	#[arg(long = "source", value_name = "ID")]
	pub sources: Vec<DataSourceId>,

	/// Channel to select at startup (repeatable)
	#[arg(long = "channel", value_name = "ID")]
	pub channels: Vec<ChannelId>,

	/// Connect immediately instead of waiting for `:connect`
	#[arg(long)]
	pub connect: bool,

	/// How feed entries are printed
	#[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	#[default]
	Text,
	Json,
}
