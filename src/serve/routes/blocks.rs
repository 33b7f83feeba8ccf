use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    chain::BlockHeight,
    serve::{
        AppState,
        error::ServeError,
        session::{ServeSessionHelper, explorer_info},
        types::{BlockDetail, BlockSummary, ServeResponse, TxSummary},
    },
    sync::decode_transactions,
};

#[utoipa::path(
    tag = "Blocks",
    get,
    path = "/blocks/latest",
    responses(
        (status = 200, description = "Most recently polled block", body = ServeResponse<BlockSummary>),
        (status = 404, description = "No block fetched yet"),
        (status = 503, description = "No chain selected"),
    )
)]
/// Latest Block
pub async fn blocks_latest(State(state): State<AppState>) -> Result<impl IntoResponse, ServeError> {
    let explorer = state.read().await;

    let info = explorer_info(&explorer)?;

    let latest = explorer
        .session()
        .and_then(|s| s.blocks().latest())
        .map(BlockSummary::from)
        .ok_or(ServeError::NotFound)?;

    let out = ServeResponse {
        data: latest,
        explorer_info: info,
    };

    Ok((StatusCode::OK, Json(out)))
}

#[utoipa::path(
    tag = "Blocks",
    get,
    path = "/blocks/recent",
    responses(
        (status = 200, description = "Recent block window, newest first", body = ServeResponse<Vec<BlockSummary>>),
        (status = 503, description = "No chain selected"),
    )
)]
/// Recent Blocks
pub async fn blocks_recent(State(state): State<AppState>) -> Result<impl IntoResponse, ServeError> {
    let explorer = state.read().await;

    let session = explorer.session().ok_or(ServeError::NoChainSelected)?;

    let blocks = session
        .blocks()
        .recents()
        .iter()
        .rev()
        .map(BlockSummary::from)
        .collect::<Vec<_>>();

    let out = ServeResponse {
        data: blocks,
        explorer_info: explorer_info(&explorer)?,
    };

    Ok((StatusCode::OK, Json(out)))
}

#[utoipa::path(
    tag = "Blocks",
    get,
    path = "/blocks/{height}",
    params(
        ("height" = u64, Path, description = "Block height", example = 1204588),
    ),
    responses(
        (status = 200, description = "Block with its decoded transactions", body = ServeResponse<BlockDetail>),
        (status = 400, description = "Malformed height"),
        (status = 404, description = "Height not retained by the node"),
        (status = 502, description = "Node unreachable"),
    )
)]
/// Block by Height
///
/// Fetched from the node on every request; the block cache is not touched.
pub async fn blocks_by_height(
    State(state): State<AppState>,
    Path(height): Path<String>,
) -> Result<impl IntoResponse, ServeError> {
    let height: BlockHeight = height
        .parse()
        .map_err(|_| ServeError::malformed_request("invalid block height"))?;

    let (client, explorer_info) = state.start_session().await?;

    let block = client.block_at(height).await?;

    let transactions = decode_transactions(&block)
        .iter()
        .map(TxSummary::from)
        .collect();

    let out = ServeResponse {
        data: BlockDetail {
            block: BlockSummary::from(&block),
            transactions,
        },
        explorer_info,
    };

    Ok((StatusCode::OK, Json(out)))
}
