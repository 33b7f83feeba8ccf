use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical per-chain metadata, whichever source it was loaded from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_name: String,
    pub chain_id: Option<String>,
    pub pretty_name: String,
    pub network_type: String,
    pub bech32_prefix: String,
    pub bech32_consensus_prefix: String,
    pub coin_type: Option<String>,
    pub assets: Vec<Asset>,
    pub endpoints: Endpoints,
    pub versions: Versions,
    pub logo: String,
    /// Enabled explorer modules; `None` enables everything
    pub features: Option<Vec<String>>,
    pub provider_chain: Option<ProviderChain>,
    pub theme_color: Option<String>,
    pub faucet: Option<String>,
    pub keplr_features: Option<Vec<String>>,
    pub keplr_price_step: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub provider: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default)]
    pub rest: Vec<Endpoint>,
    #[serde(default)]
    pub rpc: Vec<Endpoint>,
    #[serde(default)]
    pub grpc: Vec<Endpoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versions {
    pub application: Option<String>,
    pub cosmos_sdk: Option<String>,
    pub tendermint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderChain {
    pub api: Vec<Endpoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub base: String,
    pub display: String,
    pub symbol: String,
    #[serde(default)]
    pub exponent: Option<u32>,
    #[serde(default)]
    pub denom_units: Vec<DenomUnit>,
    #[serde(default, rename = "logo_URIs")]
    pub logo_uris: LogoUris,
    #[serde(default)]
    pub coingecko_id: Option<String>,
    #[serde(default)]
    pub type_asset: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoUris {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jpeg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomUnit {
    pub denom: String,
    pub exponent: u32,
}

/// Curated chain file as kept under `chains/{mainnet,testnet}/*.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalChainConfig {
    pub chain_name: String,
    #[serde(default)]
    pub registry_name: Option<String>,
    #[serde(default)]
    pub pretty_name: Option<String>,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub network_type: Option<String>,
    #[serde(default)]
    pub sdk_version: Option<String>,
    #[serde(default)]
    pub addr_prefix: String,
    #[serde(default)]
    pub consensus_prefix: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub coin_type: Option<String>,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub api: Option<Value>,
    #[serde(default)]
    pub rpc: Option<Value>,
    #[serde(default)]
    pub grpc: Option<Value>,
    #[serde(default)]
    pub provider_chain: Option<LocalProviderChain>,
    #[serde(default)]
    pub assets: Vec<LocalAsset>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub theme_color: Option<String>,
    #[serde(default)]
    pub faucet: Option<String>,
    #[serde(default)]
    pub keplr_features: Option<Vec<String>>,
    #[serde(default)]
    pub keplr_price_step: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalProviderChain {
    #[serde(default)]
    pub api: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalAsset {
    pub base: String,
    pub symbol: String,
    #[serde(deserialize_with = "exponent_from_str_or_num")]
    pub exponent: u32,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub coingecko_id: Option<String>,
}

/// Entry of the community chain directory listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryChainConfig {
    pub chain_name: String,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub pretty_name: Option<String>,
    #[serde(default)]
    pub network_type: Option<String>,
    #[serde(default)]
    pub bech32_prefix: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub versions: Option<DirectoryVersions>,
    #[serde(default)]
    pub best_apis: Endpoints,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryVersions {
    #[serde(default)]
    pub application_version: Option<String>,
    #[serde(default)]
    pub cosmos_sdk_version: Option<String>,
    #[serde(default)]
    pub tendermint_version: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn exponent_from_str_or_num<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid exponent {n}"))),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "invalid exponent {other}"
        ))),
    }
}
