use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    chain::{BlockHeight, ValidatorSet},
    serve::{
        AppState,
        error::ServeError,
        session::ServeSessionHelper,
        types::{OffsetParam, ServeResponse},
    },
};

const UPTIME_MODULE: &str = "uptime";

#[utoipa::path(
    tag = "Validators",
    get,
    path = "/validatorsets/latest",
    params(
        ("offset" = inline(Option<u64>), Query, description = "Pagination offset", example = 100),
    ),
    responses(
        (status = 200, description = "Page of the current validator set", body = ServeResponse<ValidatorSet>),
        (status = 404, description = "Uptime not enabled for this chain"),
        (status = 502, description = "Node unreachable"),
        (status = 503, description = "No chain selected"),
    )
)]
/// Latest Validator Set
pub async fn validatorsets_latest(
    State(state): State<AppState>,
    Query(params): Query<OffsetParam>,
) -> Result<impl IntoResponse, ServeError> {
    let (client, explorer_info) = state.start_module_session(UPTIME_MODULE).await?;

    let out = ServeResponse {
        data: client.validatorset_latest(params.offset).await?,
        explorer_info,
    };

    Ok((StatusCode::OK, Json(out)))
}

#[utoipa::path(
    tag = "Validators",
    get,
    path = "/validatorsets/{height}",
    params(
        ("height" = u64, Path, description = "Block height", example = 1204588),
        ("offset" = inline(Option<u64>), Query, description = "Pagination offset", example = 0),
    ),
    responses(
        (status = 200, description = "Page of the validator set at the height", body = ServeResponse<ValidatorSet>),
        (status = 400, description = "Malformed height"),
        (status = 404, description = "Height not retained by the node, or uptime not enabled"),
        (status = 502, description = "Node unreachable"),
    )
)]
/// Validator Set by Height
pub async fn validatorsets_by_height(
    State(state): State<AppState>,
    Path(height): Path<String>,
    Query(params): Query<OffsetParam>,
) -> Result<impl IntoResponse, ServeError> {
    let height: BlockHeight = height
        .parse()
        .map_err(|_| ServeError::malformed_request("invalid block height"))?;

    let (client, explorer_info) = state.start_module_session(UPTIME_MODULE).await?;

    let out = ServeResponse {
        data: client.validatorset_at(height, params.offset).await?,
        explorer_info,
    };

    Ok((StatusCode::OK, Json(out)))
}
