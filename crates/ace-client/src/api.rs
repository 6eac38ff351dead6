//! Seam between the filter session and the remote contact/organization API

use ace_core::{FilterCriteria, OrgHierarchy, RawContact, Result, SavedFilterSummary};
use async_trait::async_trait;
use std::fmt;

/// Remote endpoints used by the filter session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /api/ace/get_saved_filters`
    SavedFilters,
    /// `GET /api/ace/get_filter?key=...`
    Filter,
    /// `GET /api/ace/get_org`
    Org,
    /// `GET` and `POST /api/ace/recent_contact_search`
    RecentSearch,
    /// `POST /api/ace/get_contacts`
    Contacts,
}

impl Endpoint {
    /// Request path, without query string
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SavedFilters => "/api/ace/get_saved_filters",
            Self::Filter => "/api/ace/get_filter",
            Self::Org => "/api/ace/get_org",
            Self::RecentSearch => "/api/ace/recent_contact_search",
            Self::Contacts => "/api/ace/get_contacts",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Raw operations of the remote API.
///
/// Implementations report HTTP 401 as [`ace_core::Error::Unauthorized`] and
/// every other failure as an upstream or timeout error. Ordering, sentinels and
/// payload shaping are left to [`crate::SessionBridge`].
#[async_trait]
pub trait ContactSearchApi: Send + Sync {
    /// Saved filters, in server order
    async fn saved_filters(&self) -> Result<Vec<SavedFilterSummary>>;

    /// Criteria of one saved filter
    async fn filter(&self, key: &str) -> Result<FilterCriteria>;

    /// Groups, teams and agents, in server order and without sentinels
    async fn org(&self) -> Result<OrgHierarchy>;

    /// Most recent search; `None` when the server has none
    async fn recent_search(&self) -> Result<Option<FilterCriteria>>;

    /// Store the most recent search and return what the server echoes
    async fn save_recent_search(&self, criteria: &FilterCriteria) -> Result<FilterCriteria>;

    /// Contacts matching a query string built in contact mode
    async fn contacts(&self, params: &str) -> Result<Vec<RawContact>>;

    /// Number of contacts matching a query string built in stats mode
    async fn contact_count(&self, params: &str) -> Result<u64>;
}
