//! Blocks as returned by the Cosmos SDK REST gateway
//! (`/cosmos/base/tendermint/v1beta1/blocks/...`).

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub mod tx;

pub type BlockHeight = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub block_id: BlockId,
    pub block: BlockBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockId {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockBody {
    pub header: Header,
    #[serde(default)]
    pub data: BlockData,
    #[serde(default)]
    pub last_commit: Option<Commit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub chain_id: String,
    #[serde(deserialize_with = "from_str_or_num")]
    pub height: BlockHeight,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub proposer_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    /// base64 encoded `TxRaw` bytes
    #[serde(default, deserialize_with = "null_as_empty")]
    pub txs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub signatures: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// One page of the consensus validator set at a height
/// (`/cosmos/base/tendermint/v1beta1/validatorsets/...`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidatorSet {
    #[serde(deserialize_with = "from_str_or_num")]
    pub block_height: BlockHeight,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Validator {
    /// Consensus address (`...valcons1...`)
    pub address: String,
    #[serde(deserialize_with = "from_str_or_num")]
    pub voting_power: i64,
    #[serde(default, deserialize_with = "from_str_or_num")]
    pub proposer_priority: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    #[serde(default)]
    pub next_key: Option<String>,
    #[serde(default, deserialize_with = "from_str_or_num")]
    pub total: u64,
}

impl Block {
    pub fn hash(&self) -> &str {
        &self.block_id.hash
    }

    pub fn height(&self) -> BlockHeight {
        self.block.header.height
    }

    pub fn chain_id(&self) -> &str {
        &self.block.header.chain_id
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.block.header.time
    }

    pub fn txs(&self) -> &[String] {
        &self.block.data.txs
    }

    /// Number of validators that signed the previous block
    pub fn signature_count(&self) -> usize {
        self.block
            .last_commit
            .as_ref()
            .map(|c| c.signatures.len())
            .unwrap_or(0)
    }
}

// int64/uint64 are strings in the JSON gateway, but some nodes send numbers
fn from_str_or_num<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Num(T),
        Str(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
