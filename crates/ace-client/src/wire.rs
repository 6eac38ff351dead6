//! Request and response envelopes of the contact/organization API

use ace_core::{FilterCriteria, RawContact, SavedFilterSummary, types::parse_number};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /api/ace/get_saved_filters` response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SavedFiltersEnvelope {
    #[serde(default)]
    pub(crate) filters: Option<SavedFilterSearches>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SavedFilterSearches {
    #[serde(default)]
    pub(crate) searches: Option<Vec<SavedFilterSummary>>,
}

impl SavedFiltersEnvelope {
    pub(crate) fn into_searches(self) -> Vec<SavedFilterSummary> {
        self.filters
            .and_then(|filters| filters.searches)
            .unwrap_or_default()
    }
}

/// `GET /api/ace/get_filter` response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FilterEnvelope {
    #[serde(default)]
    pub(crate) filters: Option<FilterCriteria>,
}

/// `POST /api/ace/get_contacts` body
#[derive(Debug, Serialize)]
pub(crate) struct ContactQuery<'a> {
    pub(crate) count_max: u32,
    pub(crate) count_min: u32,
    pub(crate) params: &'a str,
}

/// `POST /api/ace/get_contacts` response in contact mode
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContactsEnvelope {
    #[serde(default)]
    pub(crate) contacts: Option<Vec<RawContact>>,
}

/// `POST /api/ace/get_contacts` response in stats mode
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CountEnvelope {
    #[serde(default)]
    pub(crate) count: Option<Value>,
}

impl CountEnvelope {
    pub(crate) fn count(&self) -> Option<u64> {
        match self.count.as_ref()? {
            Value::Number(number) => number
                .as_u64()
                .or_else(|| parse_number(&number.to_string())),
            Value::String(text) => parse_number(text),
            _ => None,
        }
    }
}

/// Recent search response: `null`, `{}` and an empty body all mean "none"
pub(crate) fn recent_search_from(value: Value) -> serde_json::Result<Option<FilterCriteria>> {
    if value.is_null() {
        return Ok(None);
    }
    let criteria: FilterCriteria = serde_json::from_value(value)?;
    Ok((!criteria.is_empty()).then_some(criteria))
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_saved_filters_envelope() {
        let envelope: SavedFiltersEnvelope = serde_json::from_value(json!({
            "filters": {"searches": [{"key": 3, "name": "Escalations", "owner": "me"}]}
        }))
        .unwrap();
        let searches = envelope.into_searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].key, "3");

        let empty: SavedFiltersEnvelope = serde_json::from_value(json!({"filters": null})).unwrap();
        assert!(empty.into_searches().is_empty());
    }

    #[test]
    fn test_count_envelope_variants() {
        let number: CountEnvelope = serde_json::from_value(json!({"count": 17})).unwrap();
        assert_eq!(number.count(), Some(17));
        let text: CountEnvelope = serde_json::from_value(json!({"count": "23"})).unwrap();
        assert_eq!(text.count(), Some(23));
        let missing: CountEnvelope = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.count(), None);
    }

    #[test]
    fn test_contact_query_body() {
        let body = ContactQuery {
            count_max: 49,
            count_min: 0,
            params: "contactId=42",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"count_max": 49, "count_min": 0, "params": "contactId=42"})
        );
    }

    #[test]
    fn test_recent_search_emptiness() {
        assert_eq!(recent_search_from(Value::Null).unwrap(), None);
        assert_eq!(recent_search_from(json!({})).unwrap(), None);
        assert_eq!(recent_search_from(json!({"phoneNumber": ""})).unwrap(), None);
        let restored = recent_search_from(json!({"contactId": 42})).unwrap().unwrap();
        assert_eq!(restored.contact_id, Some(42));
    }
}
