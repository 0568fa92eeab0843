//! Subcommand dispatch.

use std::path::PathBuf;

use cfeed::{SelectionSet, Session};
use cfeed_protocol::{ChannelId, DataSourceId};
use cfeed_runtime::{EndpointSource, WsConnector, resolve_endpoint};
use tracing::info;

use crate::cli::{Cli, Commands, ConnectionArgs, RunArgs};
use crate::config::{ClientConfig, default_config_path};
use crate::render;
use crate::repl::Repl;

pub async fn dispatch(cli: Cli) -> anyhow::Result<()> {
	let config_path = cli.config.clone().or_else(default_config_path);
	let config = config_path.as_deref().map(ClientConfig::load).unwrap_or_default();

	match cli.command {
		None => run(cli.run, config, config_path).await,
		Some(Commands::Run(args)) => run(args, config, config_path).await,
		Some(Commands::Catalog) => {
			catalog(&config);
			Ok(())
		}
		Some(Commands::Endpoint(args)) => endpoint(&args, &config),
	}
}

async fn run(args: RunArgs, config: ClientConfig, config_path: Option<PathBuf>) -> anyhow::Result<()> {
	let (endpoint, source) = endpoint_for(&args.connection, &config)?;
	let (sources, channels) = selections_for(&args, &config);
	info!(target = "cfeed.cli", %endpoint, ?source, sources = sources.len(), channels = channels.len(), "starting session");

	let session = Session::new(WsConnector::new(), endpoint).with_selections(sources, channels);
	Repl::new(session, args.format, config, config_path).run(args.connect).await
}

fn catalog(config: &ClientConfig) {
	let sources: SelectionSet<DataSourceId> = config.data_sources.iter().copied().collect();
	let channels: SelectionSet<ChannelId> = config.channels.iter().copied().collect();
	print!("{}", render::catalog(&sources, &channels));
}

fn endpoint(args: &ConnectionArgs, config: &ClientConfig) -> anyhow::Result<()> {
	let (endpoint, source) = endpoint_for(args, config)?;
	info!(target = "cfeed.cli", ?source, "endpoint resolved");
	println!("{endpoint}");
	Ok(())
}

/// Flags (and `CFEED_WS_URL`) take precedence over stored values.
fn endpoint_for(args: &ConnectionArgs, config: &ClientConfig) -> anyhow::Result<(String, EndpointSource)> {
	let override_url = args.endpoint.as_deref().or(config.endpoint.as_deref());
	let host = args.host.as_deref().or(config.host.as_deref());
	let secure = args.secure || config.secure;
	Ok(resolve_endpoint(override_url, host, secure)?)
}

/// Selections given on the command line replace the stored ones per kind.
fn selections_for(args: &RunArgs, config: &ClientConfig) -> (Vec<DataSourceId>, Vec<ChannelId>) {
	let sources = if args.sources.is_empty() { config.data_sources.clone() } else { args.sources.clone() };
	let channels = if args.channels.is_empty() { config.channels.clone() } else { args.channels.clone() };
	(sources, channels)
}
