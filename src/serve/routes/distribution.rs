use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    chain::Coin,
    serve::{AppState, error::ServeError, session::ServeSessionHelper, types::ServeResponse},
};

#[utoipa::path(
    tag = "Distribution",
    get,
    path = "/community-pool",
    responses(
        (status = 200, description = "Community pool balances in base denoms, whole units", body = ServeResponse<Vec<Coin>>),
        (status = 502, description = "Node unreachable"),
        (status = 503, description = "No chain selected"),
    )
)]
/// Community Pool
pub async fn community_pool(State(state): State<AppState>) -> Result<impl IntoResponse, ServeError> {
    let (client, explorer_info) = state.start_session().await?;

    let out = ServeResponse {
        data: client.community_pool().await?,
        explorer_info,
    };

    Ok((StatusCode::OK, Json(out)))
}
