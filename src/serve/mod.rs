use std::net::SocketAddr;

use axum::{Json, Router, response::IntoResponse, routing::get};
use axum_server::Server;
use serde::Deserialize;
use tracing::info;
use utoipa::OpenApi;

use crate::{error::Error, explorer::SharedExplorer};

mod error;
mod openapi;
mod routes;
mod session;
mod types;

pub use openapi::APIDoc;

pub static DEFAULT_SERVE_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ServerConfig {
    pub address: Option<String>,
}

impl ServerConfig {
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_SERVE_ADDRESS)
    }
}

pub type AppState = SharedExplorer;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/openapi.json", get(openapi_json))
        .merge(routes::router())
        .with_state(state)
}

pub async fn run(explorer: SharedExplorer, address: &str) -> Result<(), Error> {
    let app = app(explorer);

    let addr = address
        .parse::<SocketAddr>()
        .map_err(|e| Error::config(format!("invalid server address '{address}': {e}")))?;

    info!("api listening on {}...", addr);

    Server::bind(addr).serve(app.into_make_service()).await?;

    Ok(())
}

async fn root() -> &'static str {
    "Epix Explorer API Server"
}

async fn openapi_json() -> impl IntoResponse {
    Json(APIDoc::openapi())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use indexmap::IndexMap;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        chain::{testing::block, tx::testing::encoded_tx},
        client::{LATEST_BLOCK_PATH, RestClient, testing::MockRest},
        explorer::{Connector, Explorer},
        prefs::Preferences,
        registry::{ChainConfig, ChainRegistry, Endpoint, Endpoints},
        sync::poller::poll_once,
    };

    #[derive(Debug)]
    struct Canned;

    impl Connector for Canned {
        fn connect(&self, address: &str) -> Result<Arc<dyn RestClient>, Error> {
            if !address.starts_with("http") {
                return Err(Error::config(format!("invalid endpoint address '{address}'")));
            }

            let rest = MockRest::new()
                .with(
                    LATEST_BLOCK_PATH,
                    serde_json::to_value(block("epix-1", 20, vec![encoded_tx("hello")])).unwrap(),
                )
                .with(
                    "/cosmos/base/tendermint/v1beta1/blocks/5",
                    serde_json::to_value(block("epix-1", 5, vec![encoded_tx("old")])).unwrap(),
                )
                .with(
                    "/epix/inflation/v1/inflation_rate",
                    json!({ "inflation_rate": "12.06" }),
                )
                .with(
                    "/cosmos/base/tendermint/v1beta1/validatorsets/latest?pagination.offset=100",
                    json!({
                        "block_height": "20",
                        "validators": [{ "address": "epixvalcons1abc", "voting_power": "5" }],
                        "pagination": { "total": "101" }
                    }),
                );

            Ok(Arc::new(rest))
        }
    }

    fn state(select: bool) -> AppState {
        let mut registry = ChainRegistry::new();
        registry.insert(ChainConfig {
            chain_name: "epix".into(),
            endpoints: Endpoints {
                rest: vec![Endpoint {
                    address: "https://api.epix.zone".into(),
                    provider: "epix".into(),
                }],
                ..Default::default()
            },
            ..Default::default()
        });
        registry.insert(ChainConfig {
            chain_name: "gated".into(),
            features: Some(vec!["blocks".into()]),
            endpoints: Endpoints {
                rest: vec![Endpoint {
                    address: "https://api.gated.io".into(),
                    provider: "gated".into(),
                }],
                ..Default::default()
            },
            ..Default::default()
        });

        let mut explorer = Explorer::new(
            registry,
            Preferences::in_memory(),
            IndexMap::new(),
            Arc::new(Canned),
        );

        if select {
            explorer.select_chain("epix").unwrap();
        }

        explorer.into_shared()
    }

    async fn get_json(state: &AppState, uri: &str) -> (StatusCode, Value) {
        send(state, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn send_json(state: &AppState, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        send(state, req).await
    }

    async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let res = app(state.clone()).oneshot(req).await.unwrap();

        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn no_session_is_unavailable() {
        let state = state(false);

        let (status, body) = get_json(&state, "/status").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "no chain selected");

        let (status, body) = get_json(&state, "/chains").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["chain_name"], "epix");
        assert_eq!(body[0]["favorite"], true);
    }

    #[tokio::test]
    async fn serves_polled_state() {
        let state = state(true);
        poll_once(&state).await;

        let (status, body) = get_json(&state, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["adapter"], "epix");
        assert_eq!(body["data"]["chain_id"], "epix-1");
        assert_eq!(body["data"]["recent_blocks"], 1);
        assert_eq!(body["explorer_info"]["chain_tip"]["block_height"], 20);

        let (_, body) = get_json(&state, "/blocks/recent").await;
        assert_eq!(body["data"][0]["height"], 20);

        let (_, body) = get_json(&state, "/txs/recent").await;
        assert_eq!(body["data"][0]["memo"], "hello");

        let (_, body) = get_json(&state, "/mint/inflation").await;
        assert_eq!(body["data"]["inflation"], "0.1206");
    }

    #[tokio::test]
    async fn block_lookup() {
        let state = state(true);

        let (status, body) = get_json(&state, "/blocks/5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["transactions"][0]["memo"], "old");

        let (status, _) = get_json(&state, "/blocks/6").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_json(&state, "/blocks/tall").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // nothing polled yet
        let (status, _) = get_json(&state, "/blocks/latest").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn failed_select_keeps_selection() {
        let state = state(true);

        let (status, _) = send_json(&state, "POST", "/chains/nope/select", Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get_json(&state, "/chains").await;
        assert_eq!(body[0]["chain_name"], "epix");
        assert_eq!(body[0]["selected"], true);
        assert_eq!(body[1]["selected"], false);

        let (_, body) = get_json(&state, "/status").await;
        assert_eq!(body["data"]["chain"], "epix");
    }

    #[tokio::test]
    async fn validator_sets_follow_chain_modules() {
        let state = state(true);

        let (status, body) = get_json(&state, "/validatorsets/latest?offset=100").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["block_height"], 20);
        assert_eq!(body["data"]["validators"][0]["voting_power"], 5);

        let (status, _) = get_json(&state, "/validatorsets/tall").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send_json(&state, "POST", "/chains/gated/select", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["modules"], json!(["blocks"]));

        let (status, body) = get_json(&state, "/validatorsets/latest?offset=100").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "module uptime is not enabled for this chain");

        let (status, _) = get_json(&state, "/gov/proposals").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn preferences_are_written() {
        let state = state(true);

        let (status, body) = get_json(&state, "/preferences").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "dark");
        assert_eq!(body["favorites"], json!(["epix"]));

        let (status, body) = send_json(
            &state,
            "PUT",
            "/preferences",
            json!({ "theme": "light", "currency": "eur" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "light");
        assert_eq!(body["currency"], "eur");

        let (_, body) = send_json(&state, "PUT", "/preferences", json!({ "currency": "USD" })).await;
        assert_eq!(body["currency"], Value::Null);
        assert_eq!(body["theme"], "light");

        let (status, _) = send_json(&state, "PUT", "/preferences", json!({ "theme": " " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send_json(&state, "PUT", "/chains/GATED/favorite", json!({ "favorite": true })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorites"], json!(["epix", "gated"]));

        let (status, _) =
            send_json(&state, "PUT", "/chains/nope/favorite", json!({ "favorite": true })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get_json(&state, "/chains/gated").await;
        assert_eq!(body["favorite"], true);
    }

    #[tokio::test]
    async fn endpoint_switch() {
        let (status, _) = send_json(
            &state(false),
            "PUT",
            "/endpoint",
            json!({ "address": "https://rpc.epix.io", "provider": "io" }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let state = state(true);
        poll_once(&state).await;

        let (status, body) = send_json(
            &state,
            "PUT",
            "/endpoint",
            json!({ "address": "https://rpc.epix.io", "provider": "io" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["address"], "https://rpc.epix.io");
        assert_eq!(body["explorer_info"]["chain_tip"]["block_height"], 20);

        let (status, _) = send_json(
            &state,
            "PUT",
            "/endpoint",
            json!({ "address": "ftp://rpc.epix.io", "provider": "io" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = get_json(&state, "/status").await;
        assert_eq!(body["data"]["endpoint"]["address"], "https://rpc.epix.io");
    }

    #[tokio::test]
    async fn openapi_document() {
        let (status, body) = get_json(&state(false), "/openapi.json").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/blocks/{height}"].is_object());
        assert!(body["paths"]["/validatorsets/{height}"].is_object());
        assert!(body["paths"]["/preferences"]["put"].is_object());
    }
}
