use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    adapters::types::ProposalStatus,
    chain::{Block, Coin, tx::TxRecord},
    registry::{ChainConfig, Endpoint},
};

// -- core types

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServeResponse<T> {
    pub data: T,
    pub explorer_info: ExplorerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExplorerInfo {
    /// Chain the explorer is currently showing
    pub chain: String,
    /// Most recent block seen on that chain, if any has been fetched yet
    pub chain_tip: Option<ChainTip>,
    /// Whether the last poll of the node succeeded
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChainTip {
    pub chain_id: String,
    pub block_hash: String,
    pub block_height: u64,
    /// RFC 3339 block time
    pub block_time: String,
}

impl From<&Block> for ChainTip {
    fn from(block: &Block) -> Self {
        Self {
            chain_id: block.chain_id().to_string(),
            block_hash: block.hash().to_string(),
            block_height: block.height(),
            block_time: block.time().to_rfc3339(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ProposalsParam {
    #[serde(default)]
    pub status: Option<ProposalStatus>,
}

#[derive(Deserialize, ToSchema)]
pub struct OffsetParam {
    /// Pagination offset into the validator set
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FavoriteRequest {
    pub favorite: bool,
}

/// Fields left out are not changed
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PreferencesUpdate {
    pub theme: Option<String>,
    /// Secondary display currency; `usd` clears it
    pub currency: Option<String>,
}

// -- endpoint types

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EndpointInfo {
    pub address: String,
    pub provider: String,
}

impl From<&Endpoint> for EndpointInfo {
    fn from(e: &Endpoint) -> Self {
        Self {
            address: e.address.clone(),
            provider: e.provider.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExplorerStatus {
    pub chain: String,
    /// Chain id reported by the node's latest block
    pub chain_id: Option<String>,
    pub endpoint: EndpointInfo,
    pub adapter: String,
    pub connected: bool,
    pub latest: Option<ChainTip>,
    /// Block the current observation window started at
    pub earliest: Option<ChainTip>,
    pub recent_blocks: usize,
    /// Average seconds per block over the observation window
    pub block_time_secs: f64,
    pub hd_path: String,
    pub theme: String,
}

impl From<EndpointInfo> for Endpoint {
    fn from(e: EndpointInfo) -> Self {
        Self {
            address: e.address,
            provider: e.provider,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreferencesView {
    pub theme: String,
    pub currency: Option<String>,
    pub favorites: Vec<String>,
}

impl From<&crate::prefs::Preferences> for PreferencesView {
    fn from(prefs: &crate::prefs::Preferences) -> Self {
        Self {
            theme: prefs.theme().to_string(),
            currency: prefs.currency().map(str::to_string),
            favorites: prefs
                .favorites()
                .into_iter()
                .filter_map(|(name, fav)| fav.then_some(name))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChainSummary {
    pub chain_name: String,
    pub pretty_name: String,
    pub chain_id: Option<String>,
    pub network_type: String,
    pub logo: String,
    pub cosmos_sdk: Option<String>,
    pub rest_endpoints: Vec<EndpointInfo>,
    /// Explorer modules the chain enables; absent means all of them
    pub modules: Option<Vec<String>>,
    pub favorite: bool,
    pub selected: bool,
}

impl ChainSummary {
    pub fn new(chain: &ChainConfig, favorite: bool, selected: bool) -> Self {
        Self {
            chain_name: chain.chain_name.clone(),
            pretty_name: chain.pretty_name.clone(),
            chain_id: chain.chain_id.clone(),
            network_type: chain.network_type.clone(),
            logo: chain.logo.clone(),
            cosmos_sdk: chain.versions.cosmos_sdk.clone(),
            rest_endpoints: chain.endpoints.rest.iter().map(EndpointInfo::from).collect(),
            modules: chain.features.clone(),
            favorite,
            selected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockSummary {
    pub height: u64,
    pub hash: String,
    pub chain_id: String,
    pub time: String,
    pub proposer_address: String,
    pub tx_count: usize,
    pub signatures: usize,
}

impl From<&Block> for BlockSummary {
    fn from(block: &Block) -> Self {
        Self {
            height: block.height(),
            hash: block.hash().to_string(),
            chain_id: block.chain_id().to_string(),
            time: block.time().to_rfc3339(),
            proposer_address: block.block.header.proposer_address.clone(),
            tx_count: block.txs().iter().filter(|t| !t.trim().is_empty()).count(),
            signatures: block.signature_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TxSummary {
    pub height: u64,
    /// Upper-case hex SHA-256 of the raw transaction
    pub hash: String,
    pub memo: String,
    pub messages: Vec<String>,
    pub fee: Vec<Coin>,
    pub gas_limit: u64,
}

impl From<&TxRecord> for TxSummary {
    fn from(record: &TxRecord) -> Self {
        let fee = record.tx.auth_info.fee.as_ref();

        Self {
            height: record.height,
            hash: record.hash.clone(),
            memo: record.tx.body.memo.clone(),
            messages: record
                .tx
                .message_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
            fee: fee.map(|f| f.amount.clone()).unwrap_or_default(),
            gas_limit: fee.map(|f| f.gas_limit).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockDetail {
    pub block: BlockSummary,
    pub transactions: Vec<TxSummary>,
}
