use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::serve::{
    AppState,
    error::ServeError,
    session::explorer_info,
    types::{ServeResponse, TxSummary},
};

#[utoipa::path(
    tag = "Transactions",
    get,
    path = "/txs/recent",
    responses(
        (status = 200, description = "Transactions in the recent block window, highest block first", body = ServeResponse<Vec<TxSummary>>),
        (status = 503, description = "No chain selected"),
    )
)]
/// Recent Transactions
///
/// Undecodable transactions are left out.
pub async fn txs_recent(State(state): State<AppState>) -> Result<impl IntoResponse, ServeError> {
    let mut explorer = state.write().await;

    let txs = explorer
        .session_mut()
        .ok_or(ServeError::NoChainSelected)?
        .blocks_mut()
        .transactions_in_recents();

    let out = ServeResponse {
        data: txs.iter().map(TxSummary::from).collect::<Vec<_>>(),
        explorer_info: explorer_info(&explorer)?,
    };

    Ok((StatusCode::OK, Json(out)))
}
