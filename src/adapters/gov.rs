use serde_json::Value;
use tracing::warn;

use super::{
    AdapterError,
    types::{Proposal, Tally},
};

/// Tally object in either gov v1 (`yes_count`) or v1beta1 (`yes`) naming.
/// Missing options count as zero.
pub fn reshape_tally_object(raw: &Value) -> Result<Tally, AdapterError> {
    if !raw.is_object() {
        return Err(AdapterError::MissingField("tally"));
    }

    let pick = |v1: &str, legacy: &str| -> String {
        raw.get(v1)
            .or_else(|| raw.get(legacy))
            .and_then(scalar_string)
            .unwrap_or_else(|| "0".to_string())
    };

    Ok(Tally {
        yes: pick("yes_count", "yes"),
        no: pick("no_count", "no"),
        abstain: pick("abstain_count", "abstain"),
        no_with_veto: pick("no_with_veto_count", "no_with_veto"),
    })
}

/// `/cosmos/gov/{v1,v1beta1}/proposals/{id}/tally`: `{"tally": {...}}`
pub fn reshape_tally(raw: &Value) -> Result<Tally, AdapterError> {
    raw.get("tally")
        .ok_or(AdapterError::MissingField("tally"))
        .and_then(reshape_tally_object)
}

/// `/cosmos/gov/v1/proposals`. Individual proposals that cannot be read are
/// dropped with a warning rather than failing the listing.
pub fn reshape_proposals_v1(raw: &Value) -> Result<Vec<Proposal>, AdapterError> {
    reshape_listing(raw, reshape_proposal_v1)
}

/// `/cosmos/gov/v1beta1/proposals`
pub fn reshape_proposals_v1beta1(raw: &Value) -> Result<Vec<Proposal>, AdapterError> {
    reshape_listing(raw, reshape_proposal_v1beta1)
}

fn reshape_listing(
    raw: &Value,
    item: fn(&Value) -> Result<Proposal, AdapterError>,
) -> Result<Vec<Proposal>, AdapterError> {
    let list = raw
        .get("proposals")
        .and_then(Value::as_array)
        .ok_or(AdapterError::MissingField("proposals"))?;

    Ok(list
        .iter()
        .filter_map(|p| match item(p) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(error = %e, "skipping unreadable proposal");
                None
            }
        })
        .collect())
}

pub fn reshape_proposal_v1(raw: &Value) -> Result<Proposal, AdapterError> {
    let proposal_id = id_field(raw, "id")?;

    let messages = raw
        .get("messages")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    // proposals submitted through MsgExecLegacyContent carry their title in
    // the wrapped content on SDK 0.46, which had no top level title
    let legacy_content = messages.iter().find_map(|m| m.get("content"));

    let title = string_field(raw, "title")
        .filter(|t| !t.is_empty())
        .or_else(|| legacy_content.and_then(|c| string_field(c, "title")))
        .unwrap_or_default();

    let summary = string_field(raw, "summary")
        .filter(|t| !t.is_empty())
        .or_else(|| legacy_content.and_then(|c| string_field(c, "description")))
        .unwrap_or_default();

    Ok(Proposal {
        proposal_id,
        title,
        summary,
        status: string_field(raw, "status").unwrap_or_default(),
        submit_time: string_field(raw, "submit_time"),
        voting_end_time: string_field(raw, "voting_end_time"),
        final_tally_result: tally_or_zero(raw),
        message_types: messages
            .iter()
            .filter_map(|m| string_field(m, "@type"))
            .collect(),
    })
}

pub fn reshape_proposal_v1beta1(raw: &Value) -> Result<Proposal, AdapterError> {
    let proposal_id = id_field(raw, "proposal_id")?;

    let content = raw.get("content");

    Ok(Proposal {
        proposal_id,
        title: content
            .and_then(|c| string_field(c, "title"))
            .unwrap_or_default(),
        summary: content
            .and_then(|c| string_field(c, "description"))
            .unwrap_or_default(),
        status: string_field(raw, "status").unwrap_or_default(),
        submit_time: string_field(raw, "submit_time"),
        voting_end_time: string_field(raw, "voting_end_time"),
        final_tally_result: tally_or_zero(raw),
        message_types: content
            .and_then(|c| string_field(c, "@type"))
            .into_iter()
            .collect(),
    })
}

fn tally_or_zero(raw: &Value) -> Tally {
    raw.get("final_tally_result")
        .and_then(|t| reshape_tally_object(t).ok())
        .unwrap_or_default()
}

fn id_field(raw: &Value, name: &'static str) -> Result<u64, AdapterError> {
    let value = raw.get(name).ok_or(AdapterError::MissingField(name))?;

    scalar_string(value)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AdapterError::InvalidNumber(value.to_string()))
}

fn string_field(raw: &Value, name: &str) -> Option<String> {
    raw.get(name).and_then(Value::as_str).map(str::to_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tally_in_both_namings() {
        let v1 = reshape_tally(&json!({
            "tally": { "yes_count": "10", "no_count": "2", "abstain_count": "1", "no_with_veto_count": "0" }
        }))
        .unwrap();
        let legacy = reshape_tally(&json!({
            "tally": { "yes": "10", "no": "2", "abstain": "1", "no_with_veto": "0" }
        }))
        .unwrap();

        assert_eq!(v1, legacy);
        assert_eq!(v1.yes, "10");
        assert_eq!(v1.no_with_veto, "0");
    }

    #[test]
    fn tally_missing_options_are_zero() {
        let tally = reshape_tally(&json!({ "tally": { "yes_count": 5 } })).unwrap();

        assert_eq!(tally.yes, "5");
        assert_eq!(tally.no, "0");
        assert_eq!(tally.abstain, "0");
    }

    #[test]
    fn tally_missing_entirely_is_an_error() {
        assert!(matches!(
            reshape_tally(&json!({ "code": 5 })),
            Err(AdapterError::MissingField("tally"))
        ));
    }

    #[test]
    fn v1_proposals() {
        let raw = json!({
            "proposals": [
                {
                    "id": "7",
                    "messages": [{ "@type": "/cosmos.gov.v1.MsgExecLegacyContent",
                                   "content": { "title": "Legacy title", "description": "Legacy desc" } }],
                    "status": "PROPOSAL_STATUS_VOTING_PERIOD",
                    "final_tally_result": { "yes_count": "1", "no_count": "0", "abstain_count": "0", "no_with_veto_count": "0" },
                    "submit_time": "2024-05-01T00:00:00Z",
                    "voting_end_time": "2024-05-03T00:00:00Z",
                    "title": "",
                    "summary": ""
                },
                {
                    "id": "8",
                    "messages": [{ "@type": "/cosmos.upgrade.v1beta1.MsgSoftwareUpgrade" }],
                    "status": "PROPOSAL_STATUS_PASSED",
                    "title": "Upgrade v2",
                    "summary": "Moves to v2"
                },
                { "title": "no id, dropped" }
            ],
            "pagination": { "next_key": null, "total": "3" }
        });

        let proposals = reshape_proposals_v1(&raw).unwrap();

        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].proposal_id, 7);
        assert_eq!(proposals[0].title, "Legacy title");
        assert_eq!(proposals[0].summary, "Legacy desc");
        assert_eq!(proposals[0].final_tally_result.yes, "1");
        assert_eq!(
            proposals[0].voting_end_time.as_deref(),
            Some("2024-05-03T00:00:00Z")
        );
        assert_eq!(proposals[1].title, "Upgrade v2");
        assert_eq!(
            proposals[1].message_types,
            vec!["/cosmos.upgrade.v1beta1.MsgSoftwareUpgrade"]
        );
        assert_eq!(proposals[1].final_tally_result, Tally::default());
    }

    #[test]
    fn v1beta1_proposals() {
        let raw = json!({
            "proposals": [{
                "proposal_id": "3",
                "content": { "@type": "/cosmos.gov.v1beta1.TextProposal", "title": "Signal", "description": "Text" },
                "status": "PROPOSAL_STATUS_REJECTED",
                "final_tally_result": { "yes": "1", "no": "9", "abstain": "0", "no_with_veto": "0" }
            }]
        });

        let proposals = reshape_proposals_v1beta1(&raw).unwrap();

        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].proposal_id, 3);
        assert_eq!(proposals[0].title, "Signal");
        assert_eq!(proposals[0].final_tally_result.no, "9");
        assert_eq!(
            proposals[0].message_types,
            vec!["/cosmos.gov.v1beta1.TextProposal"]
        );
    }

    #[test]
    fn listing_without_proposals_is_an_error() {
        assert!(reshape_proposals_v1(&json!({ "message": "Not Implemented" })).is_err());
    }
}
