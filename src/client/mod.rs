//! Access to a node's REST gateway.
//!
//! [`RestClient`] is the transport boundary: a path and query parameters in,
//! parsed JSON out. There are no retries here; a failed request is returned
//! as an error and the caller decides what to do about it.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    adapters::{
        Adapter, AdapterContext,
        types::{Inflation, Proposal, ProposalStatus, Tally},
    },
    chain::{Block, BlockHeight, Coin, ValidatorSet},
    error::Error,
    sync::BlockSource,
};

pub mod http;

pub use http::HttpRestClient;

pub const LATEST_BLOCK_PATH: &str = "/cosmos/base/tendermint/v1beta1/blocks/latest";
pub const NODE_INFO_PATH: &str = "/cosmos/base/tendermint/v1beta1/node_info";
pub const LATEST_VALIDATORSET_PATH: &str = "/cosmos/base/tendermint/v1beta1/validatorsets/latest";

#[async_trait]
pub trait RestClient: Send + Sync + Debug {
    async fn request(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, Error>;
}

/// REST access for one chain, with the chain's response adapter applied
#[derive(Debug, Clone)]
pub struct ChainClient {
    rest: Arc<dyn RestClient>,
    adapter: Adapter,
    ctx: AdapterContext,
}

impl ChainClient {
    pub fn new(rest: Arc<dyn RestClient>, adapter: Adapter, ctx: AdapterContext) -> Self {
        Self { rest, adapter, ctx }
    }

    pub fn adapter(&self) -> Adapter {
        self.adapter
    }

    pub fn rest(&self) -> Arc<dyn RestClient> {
        self.rest.clone()
    }

    pub fn chain_name(&self) -> &str {
        &self.ctx.chain_name
    }

    async fn get_block(&self, path: &str) -> Result<Block, Error> {
        let raw = self.rest.request(path, &[]).await?;
        Ok(serde_json::from_value(raw)?)
    }

    pub async fn latest_block(&self) -> Result<Block, Error> {
        self.get_block(LATEST_BLOCK_PATH).await
    }

    pub async fn block_at(&self, height: BlockHeight) -> Result<Block, Error> {
        self.get_block(&format!("/cosmos/base/tendermint/v1beta1/blocks/{height}"))
            .await
    }

    pub async fn node_info(&self) -> Result<Value, Error> {
        self.rest.request(NODE_INFO_PATH, &[]).await
    }

    pub async fn validatorset_latest(&self, offset: u64) -> Result<ValidatorSet, Error> {
        self.get_validatorset(LATEST_VALIDATORSET_PATH, offset).await
    }

    pub async fn validatorset_at(
        &self,
        height: BlockHeight,
        offset: u64,
    ) -> Result<ValidatorSet, Error> {
        self.get_validatorset(
            &format!("/cosmos/base/tendermint/v1beta1/validatorsets/{height}"),
            offset,
        )
        .await
    }

    async fn get_validatorset(&self, path: &str, offset: u64) -> Result<ValidatorSet, Error> {
        let offset = offset.to_string();
        let raw = self
            .rest
            .request(path, &[("pagination.offset", offset.as_str())])
            .await?;

        Ok(serde_json::from_value(raw)?)
    }

    pub async fn mint_inflation(&self) -> Result<Inflation, Error> {
        self.adapter.mint_inflation(self.rest.as_ref(), &self.ctx).await
    }

    pub async fn proposals(&self, status: ProposalStatus) -> Result<Vec<Proposal>, Error> {
        self.adapter
            .proposals(self.rest.as_ref(), &self.ctx, status)
            .await
    }

    pub async fn proposal_tally(&self, proposal_id: u64) -> Result<Tally, Error> {
        self.adapter
            .proposal_tally(self.rest.as_ref(), &self.ctx, proposal_id)
            .await
    }

    pub async fn community_pool(&self) -> Result<Vec<Coin>, Error> {
        self.adapter
            .community_pool(self.rest.as_ref(), &self.ctx)
            .await
    }
}

#[async_trait]
impl BlockSource for ChainClient {
    async fn latest_block(&self) -> Result<Block, Error> {
        ChainClient::latest_block(self).await
    }

    async fn block_at(&self, height: BlockHeight) -> Result<Block, Error> {
        ChainClient::block_at(self, height).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::HashMap, sync::Mutex};

    use super::*;

    /// Canned responses keyed by `path?k=v&k=v`; anything else is a 404
    #[derive(Debug, Default)]
    pub struct MockRest {
        responses: HashMap<String, Value>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockRest {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, key: &str, response: Value) -> Self {
            self.responses.insert(key.to_string(), response);
            self
        }
    }

    #[async_trait]
    impl RestClient for MockRest {
        async fn request(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, Error> {
            let key = if params.is_empty() {
                path.to_string()
            } else {
                let query = params
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&");
                format!("{path}?{query}")
            };

            if let Ok(mut log) = self.requests.lock() {
                log.push(key.clone());
            }

            self.responses
                .get(&key)
                .cloned()
                .ok_or(Error::NotFound(key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockRest;
    use super::*;
    use crate::chain::testing::block;
    use serde_json::json;

    fn client(rest: MockRest) -> ChainClient {
        ChainClient::new(
            Arc::new(rest),
            Adapter::Standard,
            AdapterContext {
                chain_name: "epix".into(),
                base_denom: Some("aepix".into()),
            },
        )
    }

    #[tokio::test]
    async fn fetches_blocks() {
        let latest = block("epix-1", 100, vec![]);
        let old = block("epix-1", 42, vec![]);

        let client = client(
            MockRest::new()
                .with(LATEST_BLOCK_PATH, serde_json::to_value(&latest).unwrap())
                .with(
                    "/cosmos/base/tendermint/v1beta1/blocks/42",
                    serde_json::to_value(&old).unwrap(),
                ),
        );

        assert_eq!(client.latest_block().await.unwrap(), latest);
        assert_eq!(client.block_at(42).await.unwrap(), old);

        let err = client.block_at(1).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn malformed_block_is_a_json_error() {
        let client = client(MockRest::new().with(LATEST_BLOCK_PATH, json!({ "block": 1 })));

        assert!(matches!(
            client.latest_block().await.unwrap_err(),
            Error::Json(_)
        ));
    }

    #[tokio::test]
    async fn validatorsets_are_paged() {
        let client = client(
            MockRest::new()
                .with(
                    "/cosmos/base/tendermint/v1beta1/validatorsets/latest?pagination.offset=100",
                    json!({ "block_height": "9", "validators": [] }),
                )
                .with(
                    "/cosmos/base/tendermint/v1beta1/validatorsets/7?pagination.offset=0",
                    json!({
                        "block_height": "7",
                        "validators": [{ "address": "a", "voting_power": "10" }]
                    }),
                ),
        );

        assert_eq!(client.validatorset_latest(100).await.unwrap().block_height, 9);

        let set = client.validatorset_at(7, 0).await.unwrap();
        assert_eq!(set.block_height, 7);
        assert_eq!(set.validators[0].voting_power, 10);

        assert!(client.validatorset_at(8, 0).await.unwrap_err().is_not_found());
    }
}
