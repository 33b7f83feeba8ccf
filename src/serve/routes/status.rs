use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::serve::{
    AppState,
    error::ServeError,
    session::explorer_info,
    types::{ChainTip, EndpointInfo, ExplorerStatus, ServeResponse},
};

#[utoipa::path(
    tag = "Explorer",
    get,
    path = "/status",
    responses(
        (
            status = 200,
            description = "Current session and block cache state",
            body = ServeResponse<ExplorerStatus>,
            example = json!(EXAMPLE_RESPONSE)
        ),
        (status = 503, description = "No chain selected"),
    )
)]
/// Explorer Status
///
/// Selected chain and endpoint, node connectivity, and the observation window
/// of the block cache. An unreachable node is reported here, not as an error.
pub async fn explorer_status(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServeError> {
    let explorer = state.read().await;

    let session = explorer.session().ok_or(ServeError::NoChainSelected)?;
    let blocks = session.blocks();

    let status = ExplorerStatus {
        chain: session.chain().to_string(),
        chain_id: blocks.current_chain_id().map(str::to_string),
        endpoint: EndpointInfo::from(session.endpoint()),
        adapter: format!("{:?}", session.client().adapter()).to_lowercase(),
        connected: blocks.connected(),
        latest: blocks.latest().map(ChainTip::from),
        earliest: blocks.earliest().map(ChainTip::from),
        recent_blocks: blocks.recents().len(),
        block_time_secs: blocks.blocktime().as_secs_f64(),
        hd_path: explorer.registry().default_hd_path(),
        theme: explorer.prefs().theme().to_string(),
    };

    let out = ServeResponse {
        data: status,
        explorer_info: explorer_info(&explorer)?,
    };

    Ok((StatusCode::OK, Json(out)))
}

static EXAMPLE_RESPONSE: &str = r##"{
  "data": {
    "chain": "epix",
    "chain_id": "epix_1916-1",
    "endpoint": { "address": "https://api.epix.zone", "provider": "epix" },
    "adapter": "epix",
    "connected": true,
    "latest": {
      "chain_id": "epix_1916-1",
      "block_hash": "6B1F3D0C6A3A7E8F2E1C1D6F4A5B9C0D1E2F3A4B5C6D7E8F9A0B1C2D3E4F5A6B",
      "block_height": 1204588,
      "block_time": "2025-03-02T11:04:12.512Z"
    },
    "earliest": {
      "chain_id": "epix_1916-1",
      "block_hash": "0D5C1A7E4B2F9E3D6C8A1B0F7E2D4C6A8B0E1F3D5C7A9B1E3F5D7C9A1B3E5F7D",
      "block_height": 1204520,
      "block_time": "2025-03-02T10:57:24.104Z"
    },
    "recent_blocks": 50,
    "block_time_secs": 6.0,
    "hd_path": "m/44'/60/0'/0/0",
    "theme": "dark"
  },
  "explorer_info": {
    "chain": "epix",
    "chain_tip": {
      "chain_id": "epix_1916-1",
      "block_hash": "6B1F3D0C6A3A7E8F2E1C1D6F4A5B9C0D1E2F3A4B5C6D7E8F9A0B1C2D3E4F5A6B",
      "block_height": 1204588,
      "block_time": "2025-03-02T11:04:12.512Z"
    },
    "connected": true
  }
}"##;
