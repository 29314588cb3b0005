use clap::Parser;
use tracing::debug;

use crate::client::HttpStanCoreClient;
use crate::core::Shell;
use crate::opts::Opts;
use crate::session::{FileSessionStore, MemorySessionStore, NoClipboard};

mod client;
mod commands;
mod core;
mod opts;
mod session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = argfile::expand_args(argfile::parse_fromfile, argfile::PREFIX)?;

    let opts = Opts::parse_from(args);

    cli::tracing::configure_tracing(opts.trace.clone(), opts.verbose.clone())?;

    debug!("stan-core url: {}", opts.stan_core_url);
    let client = HttpStanCoreClient::new(&opts.stan_core_url);

    match opts.session_file {
        Some(path) => commands::run(Shell::new(client, FileSessionStore::new(path), NoClipboard), opts.command).await,
        None => commands::run(Shell::new(client, MemorySessionStore::default(), NoClipboard), opts.command).await,
    }
}
