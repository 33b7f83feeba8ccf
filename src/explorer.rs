//! The explorer's owned state: loaded chains, preferences and the session for
//! the selected chain.
//!
//! A session lives from chain selection until the next selection (or
//! shutdown). Switching chains drops the old session along with its block
//! cache. Each session has an id so that work started against an old session
//! can tell it has been superseded.

use std::{fmt::Debug, sync::Arc, time::Duration};

use indexmap::IndexMap;
use rand::seq::IndexedRandom;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    adapters::{Adapter, AdapterContext},
    client::{ChainClient, HttpRestClient, RestClient, http::default_http_client},
    error::Error,
    prefs::Preferences,
    registry::{ChainRegistry, Endpoint},
    sync::BlockCache,
};

pub type SharedExplorer = Arc<RwLock<Explorer>>;

/// Builds the transport for an endpoint address
pub trait Connector: Send + Sync + Debug {
    fn connect(&self, address: &str) -> Result<Arc<dyn RestClient>, Error>;
}

#[derive(Debug, Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            http: default_http_client(timeout)?,
        })
    }
}

impl Connector for HttpConnector {
    fn connect(&self, address: &str) -> Result<Arc<dyn RestClient>, Error> {
        Ok(Arc::new(HttpRestClient::new(self.http.clone(), address)?))
    }
}

#[derive(Debug)]
pub struct ExplorerSession {
    id: u64,
    chain: String,
    endpoint: Endpoint,
    client: Arc<ChainClient>,
    blocks: BlockCache,
}

impl ExplorerSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn client(&self) -> Arc<ChainClient> {
        self.client.clone()
    }

    pub fn blocks(&self) -> &BlockCache {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockCache {
        &mut self.blocks
    }
}

#[derive(Debug)]
pub struct Explorer {
    registry: ChainRegistry,
    prefs: Preferences,
    adapters: IndexMap<String, Adapter>,
    connector: Arc<dyn Connector>,
    session: Option<ExplorerSession>,
    next_session_id: u64,
}

impl Explorer {
    pub fn new(
        registry: ChainRegistry,
        prefs: Preferences,
        adapters: IndexMap<String, Adapter>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            registry,
            prefs,
            adapters,
            connector,
            session: None,
            next_session_id: 1,
        }
    }

    pub fn into_shared(self) -> SharedExplorer {
        Arc::new(RwLock::new(self))
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ChainRegistry {
        &mut self.registry
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut Preferences {
        &mut self.prefs
    }

    pub fn session(&self) -> Option<&ExplorerSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ExplorerSession> {
        self.session.as_mut()
    }

    /// The session with `id`, if it is still the active one
    pub fn session_if_current(&mut self, id: u64) -> Option<&mut ExplorerSession> {
        self.session.as_mut().filter(|s| s.id == id)
    }

    /// Select the favorite (or first) chain when nothing is selected yet
    pub fn select_default(&mut self) -> Result<Option<&ExplorerSession>, Error> {
        let favorites = self.prefs.favorites();

        let Some(name) = self.registry.default_choice(&favorites).map(str::to_string) else {
            return Ok(None);
        };

        self.select_chain(&name).map(Some)
    }

    /// Start a fresh session on `name`, replacing any current one. On error
    /// the current selection and session are left as they were.
    pub fn select_chain(&mut self, name: &str) -> Result<&ExplorerSession, Error> {
        let name = self
            .registry
            .resolve_name(name)
            .ok_or_else(|| Error::NotFound(format!("chain {name}")))?
            .to_string();

        let endpoint = match self.prefs.endpoint(&name) {
            Some(saved) => saved,
            None => self
                .registry
                .get(&name)
                .and_then(|c| c.endpoints.rest.choose(&mut rand::rng()).cloned())
                .ok_or_else(|| Error::config(format!("chain {name} has no REST endpoints")))?,
        };

        let rest = self.connector.connect(&endpoint.address)?;

        if let Some(version) = self.prefs.sdk_version(&name).map(str::to_string) {
            self.registry.apply_sdk_override(&name, &version);
        }

        self.registry.set_current(&name);

        self.open_session(name, endpoint, rest, BlockCache::new())
    }

    /// Point the current chain at another REST endpoint. Blocks already seen
    /// are kept; requests in flight against the old endpoint are discarded.
    pub fn set_endpoint(&mut self, endpoint: Endpoint) -> Result<&ExplorerSession, Error> {
        let rest = self.connector.connect(&endpoint.address)?;

        let Some(current) = self.session.take() else {
            return Err(Error::config("no chain selected"));
        };

        self.open_session(current.chain, endpoint, rest, current.blocks)
    }

    /// Persist a cosmos-sdk version reported by the node, re-resolving the
    /// adapter of the current session if it changes
    pub fn record_sdk_version(&mut self, version: &str) -> Result<(), Error> {
        let Some(chain) = self.session.as_ref().map(|s| s.chain.clone()) else {
            return Ok(());
        };

        let known = self
            .registry
            .get(&chain)
            .and_then(|c| c.versions.cosmos_sdk.as_deref());

        if known == Some(version) {
            return Ok(());
        }

        self.prefs.set_sdk_version(&chain, version)?;
        self.registry.apply_sdk_override(&chain, version);

        let adapter = Adapter::resolve(&chain, Some(version), &self.adapters);

        let previous = match self.session.take() {
            Some(session) if session.client.adapter() != adapter => session,
            other => {
                self.session = other;
                return Ok(());
            }
        };

        info!(chain, ?adapter, "sdk version changed adapter");

        let rest = previous.client.rest();
        self.open_session(chain, previous.endpoint, rest, previous.blocks)?;

        Ok(())
    }

    pub fn end_session(&mut self) -> Option<ExplorerSession> {
        let session = self.session.take();

        if let Some(s) = &session {
            info!(chain = s.chain, session = s.id, "ended session");
        }

        session
    }

    fn open_session(
        &mut self,
        chain: String,
        endpoint: Endpoint,
        rest: Arc<dyn RestClient>,
        blocks: BlockCache,
    ) -> Result<&ExplorerSession, Error> {
        let config = self
            .registry
            .get(&chain)
            .ok_or_else(|| Error::NotFound(format!("chain {chain}")))?;

        let adapter = Adapter::resolve(
            &chain,
            config.versions.cosmos_sdk.as_deref(),
            &self.adapters,
        );

        let ctx = AdapterContext {
            chain_name: chain.clone(),
            base_denom: config.assets.first().map(|a| a.base.clone()),
        };

        if let Err(e) = self.prefs.set_endpoint(&chain, &endpoint) {
            warn!(chain, error = %e, "failed to persist selected endpoint");
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        info!(
            chain,
            session = id,
            endpoint = endpoint.address,
            provider = endpoint.provider,
            ?adapter,
            "opened session"
        );

        let session = self.session.insert(ExplorerSession {
            id,
            chain,
            endpoint,
            client: Arc::new(ChainClient::new(rest, adapter, ctx)),
            blocks,
        });

        Ok(session)
    }
}

/// Ask the active session's node for its cosmos-sdk version and record it
pub async fn detect_sdk_version(explorer: &SharedExplorer) -> Result<Option<String>, Error> {
    let Some((id, client)) = explorer
        .read()
        .await
        .session()
        .map(|s| (s.id(), s.client()))
    else {
        return Ok(None);
    };

    let node_info = client.node_info().await?;

    let Some(version) = sdk_version_from_node_info(&node_info).map(str::to_string) else {
        return Ok(None);
    };

    let mut explorer = explorer.write().await;

    if explorer.session_if_current(id).is_some() {
        explorer.record_sdk_version(&version)?;
    }

    Ok(Some(version))
}

/// Merge endpoints listed by the community directory into every loaded
/// chain. Chains the directory does not know are left alone.
pub async fn merge_community_endpoints(explorer: &SharedExplorer, directory: &dyn RestClient) -> usize {
    let names = explorer
        .read()
        .await
        .registry()
        .chains()
        .map(|c| c.chain_name.clone())
        .collect::<Vec<_>>();

    let mut added = 0;

    for name in names {
        match directory.request(&format!("/{name}"), &[]).await {
            Ok(response) => {
                added += explorer
                    .write()
                    .await
                    .registry_mut()
                    .merge_directory_endpoints(&name, &response);
            }
            Err(e) => debug!(chain = name, error = %e, "no community endpoints"),
        }
    }

    info!(added, "merged community endpoints");

    added
}

/// `application_version.cosmos_sdk_version` from a node_info response
pub fn sdk_version_from_node_info(node_info: &Value) -> Option<&str> {
    node_info
        .pointer("/application_version/cosmos_sdk_version")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
}
