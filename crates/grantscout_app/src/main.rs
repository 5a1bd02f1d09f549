mod app;
mod cli;
mod effects;
mod logging;
mod persistence;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use grantscout_client::{ClientHandle, ClientSettings, GrantsApi, ReqwestGrantsApi};
use url::Url;

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::initialize(args.log.into());

    let base_url = Url::parse(&args.base_url).context("invalid --base-url")?;
    let settings = ClientSettings::new(base_url);
    let poll_interval = settings.poll_interval;
    let api: Arc<dyn GrantsApi> = Arc::new(
        ReqwestGrantsApi::new(settings)
            .map_err(|err| anyhow::anyhow!("failed to build http client: {err}"))?,
    );
    let handle = ClientHandle::new(api, poll_interval);
    let shutdown = handle.clone();

    let result = match args.command {
        Command::Discover {
            funder_id,
            links,
            depth,
            adopt,
        } => app::run_discover(handle, &funder_id, &links, depth, adopt),
        Command::Harvest {
            source_id,
            funder_id,
        } => app::run_harvest(handle, &source_id, &funder_id),
        Command::Sources { funder_id } => app::run_sources(handle, &funder_id),
    };

    shutdown.shutdown();
    result
}
