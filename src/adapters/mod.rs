//! Per-chain response adapters.
//!
//! Chains disagree on where some data lives and what shape it comes back in.
//! Each [`Adapter`] variant knows which REST paths to hit for its chain and how
//! to reshape the payloads into the canonical types in [`types`]. The variant
//! is resolved once when a chain is selected.
//!
//! Parse failures are not fatal: the adapter logs a warning naming the chain
//! and path, then returns the zero value for the type. Transport failures are
//! still returned to the caller.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::{chain::Coin, client::RestClient, error::Error};

pub mod gov;
pub mod mint;
pub mod types;

use types::{Inflation, Proposal, ProposalStatus, Tally};

pub const MINT_INFLATION_PATH: &str = "/cosmos/mint/v1beta1/inflation";
pub const MINT_ANNUAL_PROVISIONS_PATH: &str = "/cosmos/mint/v1beta1/annual_provisions";
pub const SUPPLY_BY_DENOM_PATH: &str = "/cosmos/bank/v1beta1/supply/by_denom";
pub const EPIX_INFLATION_RATE_PATH: &str = "/epix/inflation/v1/inflation_rate";
pub const COMMUNITY_POOL_PATH: &str = "/cosmos/distribution/v1beta1/community_pool";

/// First SDK release with gov v1
const GOV_V1_SDK: (u64, u64) = (0, 46);

#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adapter {
    /// Current Cosmos SDK gateway, gov v1
    Standard,
    /// SDK before 0.46, gov v1beta1 only
    Legacy,
    /// EPIX custom inflation module reporting a percentage
    Epix,
    /// Chains without the mint `inflation` query, derived from provisions
    Provisions,
}

/// What an adapter needs to know about the chain it serves
#[derive(Debug, Clone, Default)]
pub struct AdapterContext {
    pub chain_name: String,
    /// Staking/base denom, used for supply lookups
    pub base_denom: Option<String>,
}

impl Adapter {
    /// Explicit override, then chain name, then SDK version
    pub fn resolve(
        chain_name: &str,
        cosmos_sdk: Option<&str>,
        overrides: &IndexMap<String, Adapter>,
    ) -> Adapter {
        if let Some(adapter) = overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(chain_name))
            .map(|(_, a)| *a)
        {
            return adapter;
        }

        if chain_name.eq_ignore_ascii_case("epix") {
            return Adapter::Epix;
        }

        match cosmos_sdk.and_then(parse_sdk_version) {
            Some(version) if version < GOV_V1_SDK => Adapter::Legacy,
            _ => Adapter::Standard,
        }
    }

    fn gov_v1(&self) -> bool {
        !matches!(self, Adapter::Legacy)
    }

    fn gov_prefix(&self) -> &'static str {
        if self.gov_v1() {
            "/cosmos/gov/v1"
        } else {
            "/cosmos/gov/v1beta1"
        }
    }

    pub async fn mint_inflation(
        &self,
        rest: &dyn RestClient,
        ctx: &AdapterContext,
    ) -> Result<Inflation, Error> {
        match self {
            Adapter::Standard | Adapter::Legacy => {
                let raw = rest.request(MINT_INFLATION_PATH, &[]).await?;
                Ok(degrade(
                    mint::reshape_standard_inflation(&raw),
                    ctx,
                    MINT_INFLATION_PATH,
                ))
            }
            Adapter::Epix => {
                let raw = rest.request(EPIX_INFLATION_RATE_PATH, &[]).await?;
                Ok(degrade(
                    mint::reshape_percentage_inflation(&raw),
                    ctx,
                    EPIX_INFLATION_RATE_PATH,
                ))
            }
            Adapter::Provisions => {
                let Some(denom) = ctx.base_denom.as_deref() else {
                    warn!(
                        chain = ctx.chain_name,
                        "no base denom known, cannot derive inflation from provisions"
                    );
                    return Ok(Inflation::default());
                };

                let provisions = rest.request(MINT_ANNUAL_PROVISIONS_PATH, &[]).await?;
                let supply = rest
                    .request(SUPPLY_BY_DENOM_PATH, &[("denom", denom)])
                    .await?;

                Ok(degrade(
                    mint::reshape_provisions_inflation(&provisions, &supply),
                    ctx,
                    MINT_ANNUAL_PROVISIONS_PATH,
                ))
            }
        }
    }

    pub async fn proposals(
        &self,
        rest: &dyn RestClient,
        ctx: &AdapterContext,
        status: ProposalStatus,
    ) -> Result<Vec<Proposal>, Error> {
        let path = format!("{}/proposals", self.gov_prefix());
        let code = status.code().to_string();

        let raw = rest
            .request(
                &path,
                &[
                    ("proposal_status", code.as_str()),
                    ("pagination.reverse", "true"),
                ],
            )
            .await?;

        let reshaped = if self.gov_v1() {
            gov::reshape_proposals_v1(&raw)
        } else {
            gov::reshape_proposals_v1beta1(&raw)
        };

        Ok(degrade(reshaped, ctx, &path))
    }

    pub async fn proposal_tally(
        &self,
        rest: &dyn RestClient,
        ctx: &AdapterContext,
        proposal_id: u64,
    ) -> Result<Tally, Error> {
        let path = format!("{}/proposals/{proposal_id}/tally", self.gov_prefix());

        let raw = rest.request(&path, &[]).await?;

        Ok(degrade(gov::reshape_tally(&raw), ctx, &path))
    }

    pub async fn community_pool(
        &self,
        rest: &dyn RestClient,
        ctx: &AdapterContext,
    ) -> Result<Vec<Coin>, Error> {
        let raw = rest.request(COMMUNITY_POOL_PATH, &[]).await?;

        Ok(degrade(
            reshape_community_pool(&raw),
            ctx,
            COMMUNITY_POOL_PATH,
        ))
    }
}

/// Community pool balances with IBC-style long denoms dropped and the
/// fractional part of each amount truncated
pub fn reshape_community_pool(raw: &Value) -> Result<Vec<Coin>, AdapterError> {
    let pool = raw
        .get("pool")
        .and_then(Value::as_array)
        .ok_or(AdapterError::MissingField("pool"))?;

    Ok(pool
        .iter()
        .filter_map(|c| serde_json::from_value::<Coin>(c.clone()).ok())
        .filter(|c| c.denom.len() < 10)
        .map(|c| Coin {
            amount: integer_part(&c.amount),
            denom: c.denom,
        })
        .collect())
}

fn integer_part(amount: &str) -> String {
    let whole = amount.split('.').next().unwrap_or_default();
    let digits: String = whole.chars().take_while(char::is_ascii_digit).collect();
    let trimmed = digits.trim_start_matches('0');

    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `v0.47.5`, `0.45.16-ics` -> (major, minor)
fn parse_sdk_version(version: &str) -> Option<(u64, u64)> {
    let (major, minor) = version
        .trim()
        .trim_start_matches('v')
        .split(['.', '-'])
        .take(2)
        .map(|part| part.parse::<u64>().ok())
        .collect_tuple()?;

    Some((major?, minor?))
}

fn degrade<T: Default>(result: Result<T, AdapterError>, ctx: &AdapterContext, path: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(
                chain = ctx.chain_name,
                path,
                error = %e,
                "unexpected response shape, using empty value"
            );
            T::default()
        }
    }
}
