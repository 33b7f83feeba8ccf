pub mod blocks;
pub mod chains;
pub mod distribution;
pub mod gov;
pub mod mint;
pub mod preferences;
pub mod status;
pub mod txs;
pub mod validators;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::serve::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::explorer_status))
        .route("/chains", get(chains::chains_list))
        .route("/chains/{name}", get(chains::chains_chain_info))
        .route("/chains/{name}/select", post(chains::chains_select))
        .route("/chains/{name}/favorite", put(preferences::chains_favorite))
        .route(
            "/preferences",
            get(preferences::preferences_get).put(preferences::preferences_update),
        )
        .route("/endpoint", put(preferences::endpoint_update))
        .route("/blocks/latest", get(blocks::blocks_latest))
        .route("/blocks/recent", get(blocks::blocks_recent))
        .route("/blocks/{height}", get(blocks::blocks_by_height))
        .route("/txs/recent", get(txs::txs_recent))
        .route("/mint/inflation", get(mint::mint_inflation))
        .route("/gov/proposals", get(gov::gov_proposals))
        .route("/gov/proposals/{id}/tally", get(gov::gov_proposal_tally))
        .route("/community-pool", get(distribution::community_pool))
        .route("/validatorsets/latest", get(validators::validatorsets_latest))
        .route("/validatorsets/{height}", get(validators::validatorsets_by_height))
}
