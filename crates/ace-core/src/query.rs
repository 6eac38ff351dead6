//! Query string construction for the contact endpoint
//!
//! The contact listing and the result count share one builder so that a filter
//! field can never reach one query and miss the other.

use crate::{
    Error, Result,
    types::{BaseSelector, EntityId, FilterCriteria},
};

/// Which answer the contact endpoint should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Contact records
    Contacts,
    /// Only the number of matching contacts
    Stats,
}

/// Build the `params` string sent to the contact endpoint.
///
/// Fields appear in a fixed order: base selector, phone number, search scope,
/// evaluation state, group, team, agent, duration expression, evaluator first
/// and last name. Values are percent-encoded. [`QueryMode::Stats`] appends
/// `searchStats=true`.
///
/// # Errors
///
/// Returns [`Error::MissingRequiredSelector`] if the criteria have neither a
/// positive contact id nor a date range.
pub fn build_query(criteria: &FilterCriteria, mode: QueryMode) -> Result<String> {
    let mut params = Vec::with_capacity(11);

    match criteria.base_selector().ok_or(Error::MissingRequiredSelector)? {
        BaseSelector::ContactId(id) => params.push(pair("contactId", &id.to_string())),
        BaseSelector::Range(range) => params.push(pair("range", range.key())),
    }

    if let Some(phone) = non_blank(criteria.phone_number.as_deref()) {
        params.push(pair("phoneNumber", phone));
    }
    if let Some(scope) = criteria.search_scope {
        params.push(pair("searchScope", scope.key()));
    }
    if let Some(state) = criteria.eval_state {
        params.push(pair("evalState", state.key()));
    }
    for (key, id) in [
        ("group", &criteria.group),
        ("team", &criteria.team),
        ("agent", &criteria.agent),
    ] {
        if let Some(id) = selected(id.as_ref()) {
            params.push(pair(key, id.as_str()));
        }
    }
    if let Some(seconds) = criteria.duration_seconds {
        params.push(pair("expr", &format!("duration~lessThan~{seconds}")));
    }
    if let Some(first) = non_blank(criteria.evaluator_first_name.as_deref()) {
        params.push(pair("evaluatorFirstName", first));
    }
    if let Some(last) = non_blank(criteria.evaluator_last_name.as_deref()) {
        params.push(pair("evaluatorLastName", last));
    }

    if mode == QueryMode::Stats {
        params.push("searchStats=true".to_string());
    }

    Ok(params.join("&"))
}

fn pair(key: &str, value: &str) -> String {
    format!("{key}={}", urlencoding::encode(value))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn selected(id: Option<&EntityId>) -> Option<&EntityId> {
    id.filter(|id| !id.is_all())
}
