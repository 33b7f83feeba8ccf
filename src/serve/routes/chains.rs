use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    explorer::Explorer,
    registry::ChainConfig,
    serve::{AppState, error::ServeError, types::ChainSummary},
};

fn find_chain<'a>(explorer: &'a Explorer, name: &str) -> Option<&'a ChainConfig> {
    explorer
        .registry()
        .chains()
        .find(|c| c.chain_name.eq_ignore_ascii_case(name))
}

fn summarize(explorer: &Explorer, chain: &ChainConfig) -> ChainSummary {
    let favorite = explorer
        .prefs()
        .favorites()
        .get(&chain.chain_name)
        .copied()
        .unwrap_or(false);

    let selected = explorer.registry().current_name() == Some(chain.chain_name.as_str());

    ChainSummary::new(chain, favorite, selected)
}

#[utoipa::path(
    tag = "Chains",
    get,
    path = "/chains",
    responses(
        (status = 200, description = "Loaded chains in load order", body = Vec<ChainSummary>),
    )
)]
/// List Chains
pub async fn chains_list(State(state): State<AppState>) -> impl IntoResponse {
    let explorer = state.read().await;

    let chains = explorer
        .registry()
        .chains()
        .map(|c| summarize(&explorer, c))
        .collect::<Vec<_>>();

    (StatusCode::OK, Json(chains))
}

#[utoipa::path(
    tag = "Chains",
    get,
    path = "/chains/{name}",
    params(
        ("name" = String, Path, description = "Chain name, case-insensitive", example = "epix"),
    ),
    responses(
        (status = 200, description = "Requested chain", body = ChainSummary),
        (status = 404, description = "Chain not loaded"),
    )
)]
/// Chain Info
pub async fn chains_chain_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ServeError> {
    let explorer = state.read().await;

    let chain = find_chain(&explorer, &name).ok_or(ServeError::NotFound)?;

    Ok((StatusCode::OK, Json(summarize(&explorer, chain))))
}

#[utoipa::path(
    tag = "Chains",
    post,
    path = "/chains/{name}/select",
    params(
        ("name" = String, Path, description = "Chain name, case-insensitive", example = "epix"),
    ),
    responses(
        (status = 200, description = "Chain selected, a new session was started", body = ChainSummary),
        (status = 404, description = "Chain not loaded"),
    )
)]
/// Select Chain
///
/// Switches the explorer to another chain. The block cache starts over.
pub async fn chains_select(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ServeError> {
    let mut explorer = state.write().await;

    let selected = explorer.select_chain(&name)?.chain().to_string();

    let chain = explorer
        .registry()
        .get(&selected)
        .ok_or(ServeError::NotFound)?;

    Ok((StatusCode::OK, Json(summarize(&explorer, chain))))
}
