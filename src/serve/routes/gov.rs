use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    adapters::types::{Proposal, Tally},
    serve::{
        AppState,
        error::ServeError,
        session::ServeSessionHelper,
        types::{ProposalsParam, ServeResponse},
    },
};

const GOVERNANCE_MODULE: &str = "governance";

#[utoipa::path(
    tag = "Governance",
    get,
    path = "/gov/proposals",
    params(
        ("status" = inline(Option<String>), Query, description = "Proposal status filter (defaults to voting_period)", example = "passed"),
    ),
    responses(
        (status = 200, description = "Proposals, newest first", body = ServeResponse<Vec<Proposal>>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Governance not enabled for this chain"),
        (status = 502, description = "Node unreachable"),
        (status = 503, description = "No chain selected"),
    )
)]
/// Proposals
pub async fn gov_proposals(
    State(state): State<AppState>,
    Query(params): Query<ProposalsParam>,
) -> Result<impl IntoResponse, ServeError> {
    let (client, explorer_info) = state.start_module_session(GOVERNANCE_MODULE).await?;

    let proposals = client
        .proposals(params.status.unwrap_or_default())
        .await?;

    let out = ServeResponse {
        data: proposals,
        explorer_info,
    };

    Ok((StatusCode::OK, Json(out)))
}

#[utoipa::path(
    tag = "Governance",
    get,
    path = "/gov/proposals/{id}/tally",
    params(
        ("id" = u64, Path, description = "Proposal id", example = 42),
    ),
    responses(
        (status = 200, description = "Current tally", body = ServeResponse<Tally>),
        (status = 400, description = "Malformed proposal id"),
        (status = 404, description = "Unknown proposal, or governance not enabled for this chain"),
        (status = 502, description = "Node unreachable"),
    )
)]
/// Proposal Tally
pub async fn gov_proposal_tally(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServeError> {
    let id: u64 = id
        .parse()
        .map_err(|_| ServeError::malformed_request("invalid proposal id"))?;

    let (client, explorer_info) = state.start_module_session(GOVERNANCE_MODULE).await?;

    let out = ServeResponse {
        data: client.proposal_tally(id).await?,
        explorer_info,
    };

    Ok((StatusCode::OK, Json(out)))
}
