//! Chain metadata, loaded from curated chain files and the community
//! directory, and the currently selected chain.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{adapters::Adapter, client::RestClient, error::Error};

pub mod normalize;
pub mod types;

pub use normalize::{ChainSource, LogoContext, normalize};
pub use types::{ChainConfig, Endpoint, Endpoints};

pub const DEFAULT_COIN_TYPE: &str = "118";
pub const UNKNOWN_PROVIDER: &str = "Unknown";

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

/// Where chain configs are loaded from
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegistrySource {
    /// Curated chain files under `chains_dir`
    #[default]
    Local,
    /// The full listing served at `directory_url`
    Directory,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: RegistrySource,
    /// Directory holding `mainnet/` and `testnet/` chain files
    pub chains_dir: Option<PathBuf>,
    #[serde(default)]
    pub network: Network,
    pub logo_base_url: Option<String>,
    #[serde(default)]
    pub local_dev: bool,
    /// Community directory to merge extra endpoints from, e.g.
    /// `https://chains.cosmos.directory`
    pub directory_url: Option<String>,
    /// Chain to select on startup instead of the favorites
    pub chain: Option<String>,
    /// Adapter overrides by chain name
    #[serde(default)]
    pub adapters: IndexMap<String, Adapter>,
}

impl Config {
    pub fn chains_dir(&self) -> PathBuf {
        self.chains_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("./chains"))
    }

    pub fn logo_context(&self) -> LogoContext {
        let mut ctx = LogoContext {
            local_dev: self.local_dev,
            ..Default::default()
        };

        if let Some(base) = &self.logo_base_url {
            ctx.logo_base_url = base.clone();
        }

        ctx
    }
}

#[derive(Debug, Default)]
pub struct ChainRegistry {
    chains: IndexMap<String, ChainConfig>,
    current: Option<String>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn chains(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.values()
    }

    pub fn get(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.get(name)
    }

    /// Add a chain; a chain already registered under the same name is replaced
    pub fn insert(&mut self, chain: ChainConfig) {
        let name = chain.chain_name.clone();

        if self.chains.insert(name.clone(), chain).is_some() {
            info!(chain = name, "replacing previously loaded chain config");
        }
    }

    /// Load every `*.json` under `dir/{network}`. Files that cannot be read or
    /// parsed are skipped.
    pub fn load_local_dir(
        &mut self,
        dir: &Path,
        network: Network,
        ctx: &LogoContext,
    ) -> Result<usize, Error> {
        let dir = dir.join(network.as_str());

        let mut paths = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect::<Vec<_>>();

        paths.sort();

        let mut loaded = 0;

        for path in paths {
            match read_local_chain(&path) {
                Ok(local) => {
                    let mut chain = normalize(ChainSource::Local(local), ctx);

                    if chain.network_type.is_empty() {
                        chain.network_type = network.as_str().to_string();
                    }

                    debug!(chain = chain.chain_name, path = %path.display(), "loaded chain config");

                    self.insert(chain);
                    loaded += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping malformed chain config")
                }
            }
        }

        info!(loaded, dir = %dir.display(), "loaded local chain configs");

        Ok(loaded)
    }

    /// Fetch the community directory's chain listing and load every entry
    pub async fn load_directory(&mut self, directory: &dyn RestClient) -> Result<usize, Error> {
        let listing = directory.request("/", &[]).await?;

        let loaded = self.load_directory_listing(&listing)?;

        info!(loaded, "loaded community directory chain configs");

        Ok(loaded)
    }

    /// Load a full community directory listing (`{"chains": [...]}`)
    pub fn load_directory_listing(&mut self, listing: &Value) -> Result<usize, Error> {
        let chains = listing
            .get("chains")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::config("directory listing has no chains array"))?;

        let mut loaded = 0;

        for entry in chains {
            match serde_json::from_value(entry.clone()) {
                Ok(dc) => {
                    self.insert(normalize(ChainSource::Directory(dc), &LogoContext::default()));
                    loaded += 1;
                }
                Err(e) => warn!(error = %e, "skipping malformed directory chain entry"),
            }
        }

        Ok(loaded)
    }

    /// Registered name matching `name`, ignoring case
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        self.chains
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Select a chain by name, ignoring case. Unknown names are kept as given
    /// so the selection can resolve once the chain is loaded.
    pub fn set_current(&mut self, name: &str) -> &str {
        let resolved = self.resolve_name(name).unwrap_or(name).to_string();

        if self.current.as_deref() != Some(resolved.as_str()) {
            info!(chain = resolved, "selected chain");
        }

        self.current.insert(resolved)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&ChainConfig> {
        self.current.as_ref().and_then(|n| self.chains.get(n))
    }

    /// The selected chain, else the first favorite that is loaded, else the
    /// first chain loaded. Nothing is selected by this.
    pub fn default_choice<'a>(&'a self, favorites: &'a IndexMap<String, bool>) -> Option<&'a str> {
        self.current_name().or_else(|| {
            favorites
                .iter()
                .find(|(name, fav)| **fav && self.chains.contains_key(*name))
                .map(|(name, _)| name.as_str())
                .or_else(|| self.chains.keys().next().map(String::as_str))
        })
    }

    /// Patch in a cosmos-sdk version detected or persisted for a chain
    pub fn apply_sdk_override(&mut self, name: &str, version: &str) {
        if let Some(chain) = self.chains.get_mut(name) {
            chain.versions.cosmos_sdk = Some(version.to_string());
        }
    }

    /// Append community endpoints from a directory chain response
    /// (`{"chain": {"apis": {...}}}`) that are not already known. Returns the
    /// number of endpoints added.
    pub fn merge_directory_endpoints(&mut self, name: &str, response: &Value) -> usize {
        let Some(chain) = self.chains.get_mut(name) else {
            return 0;
        };

        let Some(apis) = response.pointer("/chain/apis") else {
            return 0;
        };

        let added = merge_endpoints(&mut chain.endpoints.rest, apis.get("rest"))
            + merge_endpoints(&mut chain.endpoints.rpc, apis.get("rpc"));

        if added > 0 {
            debug!(chain = name, added, "merged community endpoints");
        }

        added
    }

    /// Whether the current chain enables an explorer module
    pub fn supports_module(&self, module: &str) -> bool {
        self.current()
            .and_then(|c| c.features.as_ref())
            .is_none_or(|features| features.iter().any(|f| f == module))
    }

    pub fn default_hd_path(&self) -> String {
        let coin_type = self
            .current()
            .and_then(|c| c.coin_type.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COIN_TYPE);

        format!("m/44'/{coin_type}/0'/0/0")
    }
}

fn read_local_chain(path: &Path) -> Result<types::LocalChainConfig, Error> {
    let raw = fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

fn merge_endpoints(existing: &mut Vec<Endpoint>, incoming: Option<&Value>) -> usize {
    let Some(incoming) = incoming.and_then(Value::as_array) else {
        return 0;
    };

    let mut added = 0;

    for item in incoming {
        let Some(address) = item
            .get("address")
            .and_then(Value::as_str)
            .filter(|a| !a.is_empty())
        else {
            continue;
        };

        let address = address.trim_end_matches('/');

        if existing
            .iter()
            .any(|e| e.address.trim_end_matches('/') == address)
        {
            continue;
        }

        let provider = item
            .get("provider")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .unwrap_or(UNKNOWN_PROVIDER);

        existing.push(Endpoint {
            address: address.to_string(),
            provider: provider.to_string(),
        });

        added += 1;
    }

    added
}
