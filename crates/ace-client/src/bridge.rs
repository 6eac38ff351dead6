//! Session persistence bridge
//!
//! Wraps a [`ContactSearchApi`] with the shaping the filter session relies on:
//! sorted saved filters, a sorted org hierarchy with "All" entries, the
//! persisted form of the most recent search, and query building.

use crate::api::ContactSearchApi;
use ace_core::{
    FilterCriteria, OrgEntity, OrgHierarchy, QueryMode, RawContact, Result, SavedFilterSummary,
    build_query,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Contacts and count produced by one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Contact records, in server order
    pub contacts: Vec<RawContact>,
    /// Total number of matching contacts
    pub count: u64,
}

/// Sort entities by display name, ignoring case, and put the "All" entry first
fn with_sentinel<T: OrgEntity>(mut entities: Vec<T>) -> Vec<T> {
    entities.retain(|entity| !entity.id().is_all());
    entities.sort_by_cached_key(|entity| entity.display_name().to_lowercase());
    entities.insert(0, T::sentinel());
    entities
}

/// Persistence and query operations on top of a [`ContactSearchApi`]
#[derive(Clone)]
pub struct SessionBridge {
    api: Arc<dyn ContactSearchApi>,
}

impl std::fmt::Debug for SessionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBridge").finish_non_exhaustive()
    }
}

impl SessionBridge {
    /// Create a bridge over `api`
    #[must_use]
    pub fn new(api: Arc<dyn ContactSearchApi>) -> Self {
        Self { api }
    }

    /// Saved filters sorted case-insensitively by name
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn fetch_saved_filters(&self) -> Result<Vec<SavedFilterSummary>> {
        let mut filters = self.api.saved_filters().await?;
        filters.sort_by_cached_key(|filter| filter.name.to_lowercase());
        debug!(count = filters.len(), "Loaded saved filters");
        Ok(filters)
    }

    /// Criteria of the saved filter `key`
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn fetch_filter_details(&self, key: &str) -> Result<FilterCriteria> {
        self.api.filter(key).await
    }

    /// Org hierarchy with every list sorted by display name and led by its
    /// "All" entry
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn fetch_org_hierarchy(&self) -> Result<OrgHierarchy> {
        let org = self.api.org().await?;
        debug!(
            groups = org.groups.len(),
            teams = org.teams.len(),
            agents = org.agents.len(),
            "Loaded org hierarchy"
        );
        Ok(OrgHierarchy {
            groups: with_sentinel(org.groups),
            teams: with_sentinel(org.teams),
            agents: with_sentinel(org.agents),
        })
    }

    /// Most recent search, if the server has a non-empty one
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn fetch_most_recent_search(&self) -> Result<Option<FilterCriteria>> {
        Ok(self
            .api
            .recent_search()
            .await?
            .filter(|criteria| !criteria.is_empty()))
    }

    /// Store `criteria` as the most recent search, keeping only its
    /// non-empty fields and governing selector
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self, criteria))]
    pub async fn save_most_recent_search(&self, criteria: &FilterCriteria) -> Result<FilterCriteria> {
        let payload = criteria.persisted();
        self.api.save_recent_search(&payload).await?;
        debug!("Saved most recent search");
        Ok(payload)
    }

    /// Run the contact query and the count query for `criteria` concurrently
    ///
    /// # Errors
    ///
    /// Returns [`ace_core::Error::MissingRequiredSelector`] without issuing a
    /// request when the criteria have neither a contact id nor a date range.
    /// When both queries fail, an unauthorized failure wins over the other.
    #[instrument(skip(self, criteria))]
    pub async fn search(&self, criteria: &FilterCriteria) -> Result<SearchResults> {
        let contact_params = build_query(criteria, QueryMode::Contacts)?;
        let count_params = build_query(criteria, QueryMode::Stats)?;
        debug!(params = %contact_params, "Searching contacts");

        let (contacts, count) = tokio::join!(
            self.api.contacts(&contact_params),
            self.api.contact_count(&count_params)
        );
        match (contacts, count) {
            (Ok(contacts), Ok(count)) => {
                info!(contacts = contacts.len(), count, "Search completed");
                Ok(SearchResults { contacts, count })
            }
            (Err(err), Ok(_)) | (Ok(_), Err(err)) => Err(err),
            (Err(contacts_err), Err(count_err)) => {
                if count_err.is_unauthorized() && !contacts_err.is_unauthorized() {
                    warn!(error = %contacts_err, "Contact query also failed");
                    Err(count_err)
                } else {
                    warn!(error = %count_err, "Count query also failed");
                    Err(contacts_err)
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockContactSearchApi};
    use ace_core::{Agent, DateRange, Error, Group, Team};
    use pretty_assertions::assert_eq;

    fn summary(key: &str, name: &str) -> SavedFilterSummary {
        SavedFilterSummary {
            key: key.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_saved_filters_sorted_case_insensitively() {
        let api = MockContactSearchApi::new().with_saved_filters(vec![
            summary("1", "zeta"),
            summary("2", "Alpha"),
            summary("3", "beta"),
        ]);
        let bridge = SessionBridge::new(Arc::new(api));

        let names: Vec<_> = bridge
            .fetch_saved_filters()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
    }

    #[tokio::test]
    async fn test_org_sorted_then_prefixed_with_sentinels() {
        let api = MockContactSearchApi::new().with_org(OrgHierarchy {
            groups: vec![
                Group {
                    id: "2".into(),
                    name: "support".to_string(),
                    ..Group::default()
                },
                Group {
                    id: "1".into(),
                    name: "Billing".to_string(),
                    ..Group::default()
                },
            ],
            teams: vec![Team {
                id: "9".into(),
                name: "Tier 1".to_string(),
                ..Team::default()
            }],
            agents: vec![
                Agent {
                    id: "5".into(),
                    display_id: "zed".to_string(),
                    ..Agent::default()
                },
                Agent {
                    id: "4".into(),
                    display_id: "Amy".to_string(),
                    ..Agent::default()
                },
            ],
        });
        let org = SessionBridge::new(Arc::new(api))
            .fetch_org_hierarchy()
            .await
            .unwrap();

        let groups: Vec<_> = org.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(groups, vec!["All", "Billing", "support"]);
        let agents: Vec<_> = org.agents.iter().map(|a| a.display_id.as_str()).collect();
        assert_eq!(agents, vec!["All", "Amy", "zed"]);
        assert!(org.teams[0].id.is_all());
    }

    #[tokio::test]
    async fn test_save_sends_persisted_payload() {
        let api = Arc::new(MockContactSearchApi::new());
        let bridge = SessionBridge::new(api.clone());

        let criteria = FilterCriteria {
            contact_id: Some(42),
            date_range: Some(DateRange::Today),
            phone_number: Some(String::new()),
            ..FilterCriteria::default()
        };
        let payload = bridge.save_most_recent_search(&criteria).await.unwrap();
        assert_eq!(payload.date_range, None);
        assert_eq!(api.calls(), vec![MockCall::SaveRecentSearch(payload.clone())]);

        let restored = bridge.fetch_most_recent_search().await.unwrap();
        assert_eq!(restored, Some(payload));
    }

    #[tokio::test]
    async fn test_search_without_selector_issues_no_request() {
        let api = Arc::new(MockContactSearchApi::new());
        let bridge = SessionBridge::new(api.clone());

        let err = bridge.search(&FilterCriteria::default()).await.unwrap_err();
        assert!(matches!(err, Error::MissingRequiredSelector));
        assert!(api.calls().is_empty());
    }
}
