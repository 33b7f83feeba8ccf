use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Annual inflation as a decimal fraction string ("0.13" for 13%)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Inflation {
    pub inflation: String,
}

impl Default for Inflation {
    fn default() -> Self {
        Self {
            inflation: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tally {
    pub yes: String,
    pub no: String,
    pub abstain: String,
    pub no_with_veto: String,
}

impl Default for Tally {
    fn default() -> Self {
        let zero = || "0".to_string();
        Self {
            yes: zero(),
            no: zero(),
            abstain: zero(),
            no_with_veto: zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Proposal {
    pub proposal_id: u64,
    pub title: String,
    pub summary: String,
    pub status: String,
    pub submit_time: Option<String>,
    pub voting_end_time: Option<String>,
    pub final_tally_result: Tally,
    pub message_types: Vec<String>,
}

/// Filter accepted by the gov proposal listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Unspecified,
    DepositPeriod,
    VotingPeriod,
    Passed,
    Rejected,
    Failed,
}

impl ProposalStatus {
    /// Numeric enum value used in the `proposal_status` query parameter
    pub fn code(&self) -> u8 {
        match self {
            ProposalStatus::Unspecified => 0,
            ProposalStatus::DepositPeriod => 1,
            ProposalStatus::VotingPeriod => 2,
            ProposalStatus::Passed => 3,
            ProposalStatus::Rejected => 4,
            ProposalStatus::Failed => 5,
        }
    }
}

impl Default for ProposalStatus {
    fn default() -> Self {
        ProposalStatus::VotingPeriod
    }
}
