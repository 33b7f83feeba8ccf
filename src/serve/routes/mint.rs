use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    adapters::types::Inflation,
    serve::{AppState, error::ServeError, session::ServeSessionHelper, types::ServeResponse},
};

#[utoipa::path(
    tag = "Mint",
    get,
    path = "/mint/inflation",
    responses(
        (
            status = 200,
            description = "Annual inflation as a decimal fraction",
            body = ServeResponse<Inflation>,
            example = json!({
                "data": { "inflation": "0.1206" },
                "explorer_info": { "chain": "epix", "chain_tip": null, "connected": true }
            })
        ),
        (status = 502, description = "Node unreachable"),
        (status = 503, description = "No chain selected"),
    )
)]
/// Inflation
///
/// Chains report inflation in different places and units; this is always a
/// fraction ("0.1206" for 12.06%). An unreadable response yields "0".
pub async fn mint_inflation(State(state): State<AppState>) -> Result<impl IntoResponse, ServeError> {
    let (client, explorer_info) = state.start_session().await?;

    let out = ServeResponse {
        data: client.mint_inflation().await?,
        explorer_info,
    };

    Ok((StatusCode::OK, Json(out)))
}
