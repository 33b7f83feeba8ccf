use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    chain::BlockHeight,
    client::HttpRestClient,
    explorer::{Explorer, HttpConnector, SharedExplorer},
    prefs::Preferences,
    registry::{ChainRegistry, Network, RegistrySource},
    shutdown::ShutdownManager,
    sync::decode_transactions,
};

pub use encdec::{DecodingError, DecodingResult};
pub use error::Error;

pub mod adapters;
pub mod chain;
pub mod client;
pub mod encdec;
mod error;
pub mod explorer;
pub mod prefs;
pub mod registry;
pub mod serve;
pub mod shutdown;
pub mod sync;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();

    let config = Config::new(&args.config)?;

    match args.command {
        Command::Run(_) => {
            info!("running explorer with config: {config:?}");

            let explorer = build_explorer(&config).await?;
            start_session(&explorer, &config).await?;

            let poller = tokio::spawn(sync::poller::run(
                explorer.clone(),
                config.sync.poll_interval(),
            ));

            if let Some(directory) = directory_client(&config)? {
                let explorer = explorer.clone();

                tokio::spawn(async move {
                    explorer::merge_community_endpoints(&explorer, &directory).await;
                });
            }

            let server = serve::run(explorer.clone(), config.serve.address());

            match ShutdownManager::new().run_until_shutdown(server).await {
                Some(Err(e)) => error!("api server stopped: {e}"),
                Some(Ok(())) | None => (),
            }

            poller.abort();
            explorer.write().await.end_session();
        }
        Command::Chains(_) => {
            let explorer = build_explorer(&config).await?;
            let explorer = explorer.read().await;

            let favorites = explorer.prefs().favorites();
            let selected = explorer
                .registry()
                .default_choice(&favorites)
                .map(str::to_string);

            for chain in explorer.registry().chains() {
                let marker = if selected.as_deref() == Some(chain.chain_name.as_str()) {
                    "*"
                } else {
                    " "
                };

                println!(
                    "{marker} {:<24} {:<28} sdk {:<10} {} rest endpoints",
                    chain.chain_name,
                    chain.pretty_name,
                    chain.versions.cosmos_sdk.as_deref().unwrap_or("?"),
                    chain.endpoints.rest.len()
                );
            }
        }
        Command::Block(BlockArgs { height }) => {
            let explorer = build_explorer(&config).await?;
            start_session(&explorer, &config).await?;

            print_block(&explorer, height).await?;
        }
        Command::Latest(_) => {
            let explorer = build_explorer(&config).await?;
            start_session(&explorer, &config).await?;

            let mut explorer = explorer.write().await;
            let Some(session) = explorer.session_mut() else {
                return Err(Error::config("no chain selected"));
            };

            let client = session.client();
            let blocks = session.blocks_mut();
            blocks.fetch_latest(client.as_ref()).await;

            match blocks.latest() {
                Some(latest) => println!(
                    "{} height {} hash {} at {} (connected: {})",
                    latest.chain_id(),
                    latest.height(),
                    latest.hash(),
                    latest.time().to_rfc3339(),
                    blocks.connected()
                ),
                None => println!("node unreachable (connected: {})", blocks.connected()),
            }
        }
    }

    Ok(())
}

async fn build_explorer(config: &Config) -> Result<SharedExplorer, Error> {
    let mut registry = ChainRegistry::new();

    match config.registry.source {
        RegistrySource::Local => {
            registry.load_local_dir(
                &config.registry.chains_dir(),
                config.registry.network,
                &config.registry.logo_context(),
            )?;
        }
        RegistrySource::Directory => {
            let url = config.registry.directory_url.as_deref().ok_or_else(|| {
                Error::config("registry.directory_url is required when loading from the directory")
            })?;

            let directory = HttpRestClient::from_address(url, config.sync.request_timeout())?;
            registry.load_directory(&directory).await?;
        }
    }

    let prefs = Preferences::open(config.prefs.path())?;
    let connector = HttpConnector::new(config.sync.request_timeout())?;

    Ok(Explorer::new(
        registry,
        prefs,
        config.registry.adapters.clone(),
        Arc::new(connector),
    )
    .into_shared())
}

/// Select the configured chain (or the default one) and learn its SDK version
async fn start_session(explorer: &SharedExplorer, config: &Config) -> Result<(), Error> {
    {
        let mut explorer = explorer.write().await;

        match &config.registry.chain {
            Some(name) => {
                explorer.select_chain(name)?;
            }
            None => {
                if explorer.select_default()?.is_none() {
                    return Err(Error::config("no chains loaded"));
                }
            }
        }
    }

    if let Err(e) = explorer::detect_sdk_version(explorer).await {
        warn!(error = %e, "could not detect node sdk version");
    }

    Ok(())
}

/// Community directory to merge extra endpoints from; chains loaded from the
/// directory already carry them
fn directory_client(config: &Config) -> Result<Option<HttpRestClient>, Error> {
    match (
        &config.registry.directory_url,
        config.registry.network,
        config.registry.source,
    ) {
        (Some(url), Network::Mainnet, RegistrySource::Local) => Ok(Some(HttpRestClient::from_address(
            url,
            config.sync.request_timeout(),
        )?)),
        _ => Ok(None),
    }
}

async fn print_block(explorer: &SharedExplorer, height: BlockHeight) -> Result<(), Error> {
    let explorer = explorer.read().await;

    let Some(session) = explorer.session() else {
        return Err(Error::config("no chain selected"));
    };

    let client = session.client();
    let block = session.blocks().fetch_block(client.as_ref(), height).await?;

    println!(
        "{} height {} hash {} at {} ({} signatures)",
        block.chain_id(),
        block.height(),
        block.hash(),
        block.time().to_rfc3339(),
        block.signature_count()
    );

    for record in decode_transactions(&block) {
        println!(
            "  {} [{}] {}",
            record.hash,
            record.tx.message_types().join(", "),
            record.tx.body.memo
        );
    }

    Ok(())
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll the selected chain and serve the explorer API
    Run(Args),
    /// List loaded chains, marking the default selection
    Chains(Args),
    /// Fetch one block and print its decoded transactions
    Block(BlockArgs),
    /// Fetch the latest block once
    Latest(Args),
}

#[derive(Debug, clap::Args)]
pub struct Args {}

#[derive(Debug, clap::Args)]
pub struct BlockArgs {
    height: BlockHeight,
}

#[derive(Debug, Parser)]
#[clap(name = "epix-explorer")]
#[clap(bin_name = "epix-explorer")]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    config: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: registry::Config,
    #[serde(default)]
    pub sync: sync::Config,
    #[serde(default)]
    pub serve: serve::ServerConfig,
    #[serde(default)]
    pub prefs: prefs::Config,
}

impl Config {
    pub fn new(config_path: &Option<PathBuf>) -> Result<Self, config::ConfigError> {
        let mut s = config::Config::builder();

        s = s.add_source(config::File::with_name("explorer.toml").required(false));

        if let Some(explicit) = config_path.as_ref().and_then(|x| x.to_str()) {
            s = s.add_source(config::File::with_name(explicit).required(true));
        }

        s = s.add_source(
            config::Environment::with_prefix("EXPLORER")
                .prefix_separator("_")
                .separator("__"),
        );

        s.build()?.try_deserialize()
    }
}
