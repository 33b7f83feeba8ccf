//! Conversion of the two chain metadata shapes into [`ChainConfig`].

use serde_json::Value;
use tracing::warn;

use super::types::{
    Asset, ChainConfig, DenomUnit, DirectoryChainConfig, Endpoint, Endpoints, LocalChainConfig,
    LogoUris, ProviderChain, Versions,
};

const CHAIN_REGISTRY_RAW_PREFIX: &str = "https://raw.githubusercontent.com/cosmos/chain-registry/master";
const CHAIN_REGISTRY_MIRROR: &str = "https://registry.ping.pub";

pub const DEFAULT_LOGO_BASE_URL: &str = "https://explorer.epix.zone";

/// Where relative logo paths of curated chain files are served from
#[derive(Debug, Clone)]
pub struct LogoContext {
    /// Serve logos relative to the local host instead of the public base
    pub local_dev: bool,
    pub logo_base_url: String,
}

impl Default for LogoContext {
    fn default() -> Self {
        Self {
            local_dev: false,
            logo_base_url: DEFAULT_LOGO_BASE_URL.to_string(),
        }
    }
}

impl LogoContext {
    pub fn resolve(&self, logo: &str) -> String {
        if logo.starts_with("http") {
            logo.to_string()
        } else if self.local_dev {
            format!("/{}", logo.trim_start_matches('/'))
        } else {
            format!(
                "{}/{}",
                self.logo_base_url.trim_end_matches('/'),
                logo.trim_start_matches('/')
            )
        }
    }
}

pub enum ChainSource {
    Local(LocalChainConfig),
    Directory(DirectoryChainConfig),
}

pub fn normalize(source: ChainSource, ctx: &LogoContext) -> ChainConfig {
    match source {
        ChainSource::Local(lc) => convert_from_local(lc, ctx),
        ChainSource::Directory(dc) => convert_from_directory(dc),
    }
}

pub fn convert_from_local(lc: LocalChainConfig, ctx: &LogoContext) -> ChainConfig {
    let assets = lc
        .assets
        .into_iter()
        .map(|a| Asset {
            name: a.base.clone(),
            display: a.symbol.clone(),
            exponent: Some(a.exponent),
            denom_units: vec![
                DenomUnit {
                    denom: a.base.clone(),
                    exponent: 0,
                },
                DenomUnit {
                    denom: a.symbol.to_lowercase(),
                    exponent: a.exponent,
                },
            ],
            logo_uris: LogoUris {
                svg: a.logo,
                ..Default::default()
            },
            coingecko_id: a.coingecko_id,
            type_asset: Some("sdk.coin".to_string()),
            base: a.base,
            symbol: a.symbol,
        })
        .collect();

    let pretty_name = lc
        .pretty_name
        .filter(|s| !s.is_empty())
        .or(lc.registry_name.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| lc.chain_name.clone());

    ChainConfig {
        bech32_consensus_prefix: lc
            .consensus_prefix
            .unwrap_or_else(|| format!("{}valcons", lc.addr_prefix)),
        bech32_prefix: lc.addr_prefix,
        chain_id: lc.chain_id,
        pretty_name,
        network_type: lc.network_type.unwrap_or_default(),
        coin_type: lc.coin_type,
        assets,
        endpoints: Endpoints {
            rest: api_converter(lc.api.as_ref()),
            rpc: api_converter(lc.rpc.as_ref()),
            grpc: api_converter(lc.grpc.as_ref()),
        },
        versions: Versions {
            cosmos_sdk: lc.sdk_version,
            ..Default::default()
        },
        logo: ctx.resolve(&lc.logo),
        features: lc.features,
        provider_chain: lc.provider_chain.map(|p| ProviderChain {
            api: api_converter(p.api.as_ref()),
        }),
        theme_color: lc.theme_color,
        faucet: lc.faucet,
        keplr_features: lc.keplr_features,
        keplr_price_step: lc.keplr_price_step,
        chain_name: lc.chain_name,
    }
}

pub fn convert_from_directory(dc: DirectoryChainConfig) -> ChainConfig {
    let versions = dc.versions.unwrap_or_default();

    ChainConfig {
        pretty_name: dc.pretty_name.unwrap_or_else(|| dc.chain_name.clone()),
        bech32_consensus_prefix: format!("{}valcons", dc.bech32_prefix),
        bech32_prefix: dc.bech32_prefix,
        chain_id: dc.chain_id,
        network_type: dc.network_type.unwrap_or_default(),
        assets: dc.assets,
        endpoints: dc.best_apis,
        versions: Versions {
            application: Some(versions.application_version.unwrap_or_default()),
            cosmos_sdk: Some(versions.cosmos_sdk_version.unwrap_or_default()),
            tendermint: Some(versions.tendermint_version.unwrap_or_default()),
        },
        logo: path_convert(dc.image.as_deref()),
        chain_name: dc.chain_name,
        ..Default::default()
    }
}

/// Point chain registry image links at the mirror
pub fn path_convert(path: Option<&str>) -> String {
    path.map(|p| p.replace(CHAIN_REGISTRY_RAW_PREFIX, CHAIN_REGISTRY_MIRROR))
        .unwrap_or_default()
}

/// Accepts a single address, a list of addresses, or a list of
/// `{address, provider}` objects
pub fn api_converter(api: Option<&Value>) -> Vec<Endpoint> {
    match api {
        None | Some(Value::Null) => vec![],
        Some(Value::String(address)) => vec![endpoint_from_address(address)],
        Some(Value::Array(items)) => items.iter().filter_map(endpoint_from_value).collect(),
        Some(other) => {
            warn!(value = %other, "ignoring unrecognised endpoint list");
            vec![]
        }
    }
}

fn endpoint_from_value(value: &Value) -> Option<Endpoint> {
    match value {
        Value::String(address) => Some(endpoint_from_address(address)),
        Value::Object(obj) => {
            let address = obj.get("address").and_then(Value::as_str)?;

            let provider = obj
                .get("provider")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| infer_provider(address));

            Some(Endpoint {
                address: address.to_string(),
                provider,
            })
        }
        other => {
            warn!(value = %other, "ignoring unrecognised endpoint");
            None
        }
    }
}

fn endpoint_from_address(address: &str) -> Endpoint {
    Endpoint {
        address: address.to_string(),
        provider: infer_provider(address),
    }
}

/// `https://api.provider.com` -> `provider`
fn infer_provider(address: &str) -> String {
    let parts: Vec<&str> = address.split('.').collect();

    if parts.len() >= 2 {
        parts[parts.len() - 2].to_string()
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn local(value: Value) -> LocalChainConfig {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case("https://api.epix.zone", "epix")]
    #[case("https://rest.lavenderfive.com:443/epix", "lavenderfive")]
    #[case("localhost:1317", "localhost:1317")]
    fn provider_from_domain(#[case] address: &str, #[case] provider: &str) {
        assert_eq!(infer_provider(address), provider);
    }

    #[test]
    fn endpoint_shapes() {
        assert_eq!(
            api_converter(Some(&json!("https://api.epix.zone"))),
            vec![Endpoint {
                address: "https://api.epix.zone".into(),
                provider: "epix".into()
            }]
        );

        let mixed = api_converter(Some(&json!([
            "https://rest.node.io",
            { "address": "https://lcd.other.net", "provider": "Other" },
            { "address": "https://bare.host.org" },
            { "provider": "no address" },
            7
        ])));

        assert_eq!(
            mixed.iter().map(|e| e.provider.as_str()).collect::<Vec<_>>(),
            vec!["node", "Other", "host"]
        );

        assert!(api_converter(None).is_empty());
        assert!(api_converter(Some(&json!({ "address": "x" }))).is_empty());
    }

    #[test]
    fn local_config_normalized() {
        let lc = local(json!({
            "chain_name": "epix",
            "registry_name": "Epix Registry",
            "api": ["https://api.epix.zone"],
            "rpc": [{ "address": "https://rpc.epix.zone", "provider": "Epix" }],
            "sdk_version": "0.50.9",
            "coin_type": 60,
            "addr_prefix": "epix",
            "logo": "logos/epix.svg",
            "assets": [{
                "base": "aepix",
                "symbol": "EPIX",
                "exponent": "18",
                "coingecko_id": "epix",
                "logo": "logos/epix.svg"
            }]
        }));

        let conf = convert_from_local(lc, &LogoContext::default());

        assert_eq!(conf.pretty_name, "Epix Registry");
        assert_eq!(conf.bech32_consensus_prefix, "epixvalcons");
        assert_eq!(conf.coin_type.as_deref(), Some("60"));
        assert_eq!(conf.versions.cosmos_sdk.as_deref(), Some("0.50.9"));
        assert_eq!(conf.logo, "https://explorer.epix.zone/logos/epix.svg");
        assert_eq!(conf.endpoints.rest[0].provider, "epix");
        assert_eq!(conf.endpoints.rpc[0].provider, "Epix");
        assert!(conf.endpoints.grpc.is_empty());

        let asset = &conf.assets[0];
        assert_eq!(asset.type_asset.as_deref(), Some("sdk.coin"));
        assert_eq!(
            asset.denom_units,
            vec![
                DenomUnit {
                    denom: "aepix".into(),
                    exponent: 0
                },
                DenomUnit {
                    denom: "epix".into(),
                    exponent: 18
                }
            ]
        );
        assert_eq!(asset.logo_uris.svg.as_deref(), Some("logos/epix.svg"));
    }

    #[rstest]
    #[case(false, "https://cdn.example/x.svg", "https://cdn.example/x.svg")]
    #[case(true, "logos/x.svg", "/logos/x.svg")]
    #[case(false, "logos/x.svg", "https://explorer.epix.zone/logos/x.svg")]
    fn logo_resolution(#[case] local_dev: bool, #[case] logo: &str, #[case] expected: &str) {
        let ctx = LogoContext {
            local_dev,
            ..Default::default()
        };

        assert_eq!(ctx.resolve(logo), expected);
    }

    #[test]
    fn explicit_consensus_prefix_and_name_fallback() {
        let conf = convert_from_local(
            local(json!({
                "chain_name": "osmosis",
                "addr_prefix": "osmo",
                "consensus_prefix": "osmovalcons2",
                "logo": ""
            })),
            &LogoContext::default(),
        );

        assert_eq!(conf.pretty_name, "osmosis");
        assert_eq!(conf.bech32_consensus_prefix, "osmovalcons2");
        assert!(conf.provider_chain.is_none());
    }

    #[test]
    fn directory_config_normalized() {
        let dc: DirectoryChainConfig = serde_json::from_value(json!({
            "chain_name": "cosmoshub",
            "chain_id": "cosmoshub-4",
            "pretty_name": "Cosmos Hub",
            "network_type": "mainnet",
            "bech32_prefix": "cosmos",
            "image": "https://raw.githubusercontent.com/cosmos/chain-registry/master/cosmoshub/images/atom.png",
            "versions": { "cosmos_sdk_version": "v0.47.10" },
            "best_apis": {
                "rest": [{ "address": "https://rest.cosmos.directory/cosmoshub", "provider": "directory" }],
                "rpc": []
            }
        }))
        .unwrap();

        let conf = normalize(ChainSource::Directory(dc), &LogoContext::default());

        assert_eq!(conf.chain_id.as_deref(), Some("cosmoshub-4"));
        assert_eq!(conf.bech32_consensus_prefix, "cosmosvalcons");
        assert_eq!(conf.logo, "https://registry.ping.pub/cosmoshub/images/atom.png");
        assert_eq!(conf.versions.cosmos_sdk.as_deref(), Some("v0.47.10"));
        assert_eq!(conf.versions.tendermint.as_deref(), Some(""));
        assert_eq!(conf.endpoints.rest.len(), 1);
    }
}
