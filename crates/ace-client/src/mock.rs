//! In-memory contact search API for testing

use crate::api::{ContactSearchApi, Endpoint};
use ace_core::{Error, FilterCriteria, OrgHierarchy, RawContact, Result, SavedFilterSummary};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::HashMap, time::Duration};
use tokio::time::sleep;

/// A call received by [`MockContactSearchApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// Saved filter list
    SavedFilters,
    /// One saved filter, by key
    Filter(String),
    /// Org hierarchy
    Org,
    /// Most recent search read
    RecentSearch,
    /// Most recent search write, with the payload sent
    SaveRecentSearch(FilterCriteria),
    /// Contact query, with its query string
    Contacts(String),
    /// Count query, with its query string
    Count(String),
}

/// How a mocked endpoint fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// HTTP 401
    Unauthorized,
    /// Any other HTTP status
    Status(u16),
    /// Request timed out
    Timeout,
}

impl MockFailure {
    fn into_error(self, endpoint: Endpoint) -> Error {
        match self {
            Self::Unauthorized => Error::unauthorized(format!("{endpoint} answered 401")),
            Self::Status(status) => Error::upstream(
                endpoint.path(),
                Some(status),
                format!("API returned error: {status}"),
            ),
            Self::Timeout => Error::Timeout {
                endpoint: endpoint.path().to_string(),
                seconds: 30,
            },
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    saved_filters: Vec<SavedFilterSummary>,
    filters: HashMap<String, FilterCriteria>,
    org: OrgHierarchy,
    recent_search: Option<FilterCriteria>,
    contacts: Vec<RawContact>,
    count: u64,
    failures: HashMap<Endpoint, MockFailure>,
    calls: Vec<MockCall>,
}

/// Mock contact search API.
///
/// Serves canned data, records every call and can be told to fail or delay.
/// Saving a recent search stores it, so a later read returns it.
#[derive(Debug, Default)]
pub struct MockContactSearchApi {
    state: Mutex<MockState>,
    delay: Option<Duration>,
}

impl MockContactSearchApi {
    /// Create a mock with no data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these saved filters
    #[must_use]
    pub fn with_saved_filters(self, filters: Vec<SavedFilterSummary>) -> Self {
        self.state.lock().saved_filters = filters;
        self
    }

    /// Serve `criteria` for saved filter `key`
    #[must_use]
    pub fn with_filter(self, key: impl Into<String>, criteria: FilterCriteria) -> Self {
        self.state.lock().filters.insert(key.into(), criteria);
        self
    }

    /// Serve this org hierarchy
    #[must_use]
    pub fn with_org(self, org: OrgHierarchy) -> Self {
        self.state.lock().org = org;
        self
    }

    /// Serve this most recent search
    #[must_use]
    pub fn with_recent_search(self, criteria: FilterCriteria) -> Self {
        self.state.lock().recent_search = Some(criteria);
        self
    }

    /// Answer contact queries with these records and count queries with `count`
    #[must_use]
    pub fn with_contacts(self, contacts: Vec<RawContact>, count: u64) -> Self {
        {
            let mut state = self.state.lock();
            state.contacts = contacts;
            state.count = count;
        }
        self
    }

    /// Make every call to `endpoint` fail
    #[must_use]
    pub fn with_failure(self, endpoint: Endpoint, failure: MockFailure) -> Self {
        self.state.lock().failures.insert(endpoint, failure);
        self
    }

    /// Delay every call
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change the contacts served from now on
    pub fn set_contacts(&self, contacts: Vec<RawContact>, count: u64) {
        let mut state = self.state.lock();
        state.contacts = contacts;
        state.count = count;
    }

    /// Stop failing calls to `endpoint`
    pub fn clear_failure(&self, endpoint: Endpoint) {
        self.state.lock().failures.remove(&endpoint);
    }

    /// Every call received so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Query strings of the contact queries received so far
    #[must_use]
    pub fn contact_queries(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Contacts(params) => Some(params.clone()),
                _ => None,
            })
            .collect()
    }

    /// Query strings of the count queries received so far
    #[must_use]
    pub fn count_queries(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Count(params) => Some(params.clone()),
                _ => None,
            })
            .collect()
    }

    /// Currently stored most recent search
    #[must_use]
    pub fn stored_recent_search(&self) -> Option<FilterCriteria> {
        self.state.lock().recent_search.clone()
    }

    /// Record `call` and return the configured failure for `endpoint`, if any
    async fn enter(&self, endpoint: Endpoint, call: MockCall) -> Result<()> {
        let failure = {
            let mut state = self.state.lock();
            state.calls.push(call);
            state.failures.get(&endpoint).copied()
        };
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        failure.map_or(Ok(()), |failure| Err(failure.into_error(endpoint)))
    }
}

#[async_trait]
impl ContactSearchApi for MockContactSearchApi {
    async fn saved_filters(&self) -> Result<Vec<SavedFilterSummary>> {
        self.enter(Endpoint::SavedFilters, MockCall::SavedFilters).await?;
        Ok(self.state.lock().saved_filters.clone())
    }

    async fn filter(&self, key: &str) -> Result<FilterCriteria> {
        self.enter(Endpoint::Filter, MockCall::Filter(key.to_string()))
            .await?;
        Ok(self.state.lock().filters.get(key).cloned().unwrap_or_default())
    }

    async fn org(&self) -> Result<OrgHierarchy> {
        self.enter(Endpoint::Org, MockCall::Org).await?;
        Ok(self.state.lock().org.clone())
    }

    async fn recent_search(&self) -> Result<Option<FilterCriteria>> {
        self.enter(Endpoint::RecentSearch, MockCall::RecentSearch).await?;
        Ok(self.state.lock().recent_search.clone())
    }

    async fn save_recent_search(&self, criteria: &FilterCriteria) -> Result<FilterCriteria> {
        self.enter(
            Endpoint::RecentSearch,
            MockCall::SaveRecentSearch(criteria.clone()),
        )
        .await?;
        self.state.lock().recent_search = Some(criteria.clone());
        Ok(criteria.clone())
    }

    async fn contacts(&self, params: &str) -> Result<Vec<RawContact>> {
        self.enter(Endpoint::Contacts, MockCall::Contacts(params.to_string()))
            .await?;
        Ok(self.state.lock().contacts.clone())
    }

    async fn contact_count(&self, params: &str) -> Result<u64> {
        self.enter(Endpoint::Contacts, MockCall::Count(params.to_string()))
            .await?;
        Ok(self.state.lock().count)
    }
}
