//! Test fixtures and sample API payloads

use ace_core::{DateRange, FilterCriteria, RawContact, SavedFilterSummary, types::StartTime};
use serde_json::{Value, json};

/// Saved filter payloads
pub struct SavedFilterFixtures;

impl SavedFilterFixtures {
    /// `get_saved_filters` response with names out of order
    pub fn response() -> Value {
        json!({
            "filters": {
                "searches": [
                    {"key": 12, "name": "weekly escalations", "owner": "sup1"},
                    {"key": "7", "name": "Angry callers"},
                    {"key": 3, "name": "Billing"}
                ]
            }
        })
    }

    /// Summaries in the order the session shows them
    pub fn sorted() -> Vec<SavedFilterSummary> {
        [("7", "Angry callers"), ("3", "Billing"), ("12", "weekly escalations")]
            .into_iter()
            .map(|(key, name)| SavedFilterSummary {
                key: key.to_string(),
                name: name.to_string(),
            })
            .collect()
    }
}

/// Org hierarchy payloads
pub struct OrgFixtures;

impl OrgFixtures {
    /// `get_org` response mixing numeric and textual ids
    pub fn response() -> Value {
        json!({
            "groups": [
                {"id": 2, "name": "Support", "parentGroupId": null},
                {"id": 1, "name": "billing", "parentGroupId": null}
            ],
            "teams": [
                {"id": 20, "name": "Tier 2", "groupId": 900, "parentGroupId": 2},
                {"id": 10, "name": "Invoices", "groupId": 901, "parentGroupId": "1"},
                {"id": 21, "name": "Tier 1", "groupId": 902, "parentGroupId": 2}
            ],
            "agents": [
                {"id": 501, "displayId": "zoe", "firstName": "Zoe", "lastName": "Ng", "groupId": 21},
                {"id": 500, "displayId": "Adam", "firstName": "Adam", "lastName": "Ito", "groupId": 10},
                {"id": 502, "displayId": "max", "groupId": 20}
            ]
        })
    }
}

/// Contact payloads
pub struct ContactFixtures;

impl ContactFixtures {
    /// One fully populated contact record
    pub fn record() -> Value {
        json!({
            "id": 1001,
            "evalStateId": 2,
            "startTime": 1_710_512_730_000_i64,
            "callDuration": 3_661_000,
            "agent": {"firstName": "Ada", "lastName": "Lovelace"},
            "group": {"name": "Support"},
            "team": {"name": "Tier 1"},
            "ani": "5551234",
            "dnis": "8000",
            "tz": "America/Chicago"
        })
    }

    /// `get_contacts` response in contact mode
    pub fn page() -> Value {
        json!({ "contacts": [Self::record()] })
    }

    /// `get_contacts` response in stats mode
    pub fn count(count: u64) -> Value {
        json!({ "count": count })
    }

    /// The record as a typed value
    pub fn raw(id: u64, eval_state_id: i64) -> RawContact {
        RawContact {
            id: id.into(),
            eval_state_id: Some(eval_state_id),
            start_time: Some(StartTime::Millis(1_710_512_730_000)),
            call_duration: 3_661_000,
            ..RawContact::default()
        }
    }
}

/// Criteria used across scenarios
pub struct CriteriaFixtures;

impl CriteriaFixtures {
    /// Today's calls shorter than thirty seconds
    pub fn short_calls_today() -> FilterCriteria {
        FilterCriteria {
            date_range: Some(DateRange::Today),
            duration_seconds: Some(30),
            ..FilterCriteria::default()
        }
    }

    /// A single contact
    pub fn contact(id: u64) -> FilterCriteria {
        FilterCriteria {
            contact_id: Some(id),
            ..FilterCriteria::default()
        }
    }
}
