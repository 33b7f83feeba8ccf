use utoipa::OpenApi;

use super::{routes::*, types::*};
use crate::{
    adapters::types::{Inflation, Proposal, ProposalStatus, Tally},
    chain::{Coin, Pagination, Validator, ValidatorSet},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Epix Explorer",
        version = "v0.1.0",
        description = "Headless Cosmos chain explorer. Polls a node's REST gateway for new blocks, keeps a window of recent blocks with their decoded transactions, and normalizes chain-specific REST responses (inflation, governance, community pool) into one shape.",
        license(
            name = "Apache 2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.txt"
        )
    ),
    paths(
        status::explorer_status,
        chains::chains_list,
        chains::chains_chain_info,
        chains::chains_select,
        blocks::blocks_latest,
        blocks::blocks_recent,
        blocks::blocks_by_height,
        txs::txs_recent,
        mint::mint_inflation,
        gov::gov_proposals,
        gov::gov_proposal_tally,
        distribution::community_pool,
        validators::validatorsets_latest,
        validators::validatorsets_by_height,
        preferences::preferences_get,
        preferences::preferences_update,
        preferences::chains_favorite,
        preferences::endpoint_update,
    ),
    components(schemas(
        ExplorerInfo,
        ChainTip,
        EndpointInfo,
        // --
        ServeResponse<ExplorerStatus>,
        ServeResponse<BlockSummary>,
        ServeResponse<Vec<BlockSummary>>,
        ServeResponse<BlockDetail>,
        ServeResponse<Vec<TxSummary>>,
        ServeResponse<Inflation>,
        ServeResponse<Vec<Proposal>>,
        ServeResponse<Tally>,
        ServeResponse<Vec<Coin>>,
        ServeResponse<ValidatorSet>,
        ServeResponse<EndpointInfo>,
        // ---
        ExplorerStatus,
        ChainSummary,
        BlockSummary,
        BlockDetail,
        TxSummary,
        Inflation,
        Proposal,
        ProposalStatus,
        Tally,
        Coin,
        ValidatorSet,
        Validator,
        Pagination,
        PreferencesView,
        PreferencesUpdate,
        FavoriteRequest,
    )),
)]
pub struct APIDoc;
