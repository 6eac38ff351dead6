//! HTTP client for the ACE contact search API

use crate::{
    api::{ContactSearchApi, Endpoint},
    wire::{
        ContactQuery, ContactsEnvelope, CountEnvelope, FilterEnvelope, SavedFiltersEnvelope,
        recent_search_from,
    },
};
use ace_core::{
    Error, FilterCriteria, OrgHierarchy, RawContact, Result, SavedFilterSummary,
    config::ApiConfig,
};
use async_trait::async_trait;
use http::{
    StatusCode,
    header::{ACCEPT, COOKIE, HeaderMap, HeaderName, HeaderValue},
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// API client for the contact, saved filter and organization endpoints
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    count_max: u32,
    count_min: u32,
}

impl HttpApiClient {
    /// Create a client for `base_url` with default settings
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        })
    }

    /// Create a client from API configuration.
    ///
    /// The session cookie and API key, when configured, are sent with every
    /// request.
    ///
    /// # Errors
    ///
    /// Returns an error if a header value is not valid or the underlying HTTP
    /// client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = &config.session_cookie {
            headers.insert(COOKIE, header_value("session cookie", cookie)?);
        }
        if let Some(api_key) = &config.api_key {
            headers.insert(HeaderName::from_static("x-api-key"), header_value("API key", api_key)?);
        }

        let timeout = config.timeout();
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            count_max: config.count_max,
            count_min: config.count_min,
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Send a request and decode its JSON body; an empty body decodes as `null`
    async fn send<T: DeserializeOwned>(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, &e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(%endpoint, "Session is not authorized");
            return Err(Error::unauthorized(format!("{endpoint} answered {status}")));
        }
        if !status.is_success() {
            return Err(Error::upstream(
                endpoint.path(),
                Some(status.as_u16()),
                format!("API returned error: {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, &e))?;
        debug!(%endpoint, bytes = body.len(), "Received response");

        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).map_err(|e| parse_error(endpoint, status, &e))?
        };
        serde_json::from_value(value).map_err(|e| parse_error(endpoint, status, &e))
    }

    fn transport_error(&self, endpoint: Endpoint, error: &reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout {
                endpoint: endpoint.path().to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            Error::upstream(
                endpoint.path(),
                error.status().map(|s| s.as_u16()),
                format!("Request failed: {error}"),
            )
        }
    }
}

fn header_value(what: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::configuration(format!("Invalid {what} header value: {e}")))
}

fn parse_error(endpoint: Endpoint, status: StatusCode, error: &serde_json::Error) -> Error {
    Error::upstream(
        endpoint.path(),
        Some(status.as_u16()),
        format!("Failed to parse response: {error}"),
    )
}

#[async_trait]
impl ContactSearchApi for HttpApiClient {
    #[instrument(skip(self))]
    async fn saved_filters(&self) -> Result<Vec<SavedFilterSummary>> {
        let endpoint = Endpoint::SavedFilters;
        let envelope: Option<SavedFiltersEnvelope> =
            self.send(endpoint, self.client.get(self.url(endpoint))).await?;
        Ok(envelope.unwrap_or_default().into_searches())
    }

    #[instrument(skip(self))]
    async fn filter(&self, key: &str) -> Result<FilterCriteria> {
        let endpoint = Endpoint::Filter;
        let url = format!("{}?key={}", self.url(endpoint), urlencoding::encode(key));
        let envelope: Option<FilterEnvelope> = self.send(endpoint, self.client.get(url)).await?;
        Ok(envelope.and_then(|e| e.filters).unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn org(&self) -> Result<OrgHierarchy> {
        let endpoint = Endpoint::Org;
        let org: Option<OrgHierarchy> =
            self.send(endpoint, self.client.get(self.url(endpoint))).await?;
        Ok(org.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn recent_search(&self) -> Result<Option<FilterCriteria>> {
        let endpoint = Endpoint::RecentSearch;
        let value: Value = self.send(endpoint, self.client.get(self.url(endpoint))).await?;
        recent_search_from(value).map_err(|e| parse_error(endpoint, StatusCode::OK, &e))
    }

    #[instrument(skip(self, criteria))]
    async fn save_recent_search(&self, criteria: &FilterCriteria) -> Result<FilterCriteria> {
        let endpoint = Endpoint::RecentSearch;
        let request = self.client.post(self.url(endpoint)).json(criteria);
        let echoed: Option<FilterCriteria> = self.send(endpoint, request).await?;
        Ok(echoed.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn contacts(&self, params: &str) -> Result<Vec<RawContact>> {
        let endpoint = Endpoint::Contacts;
        let body = ContactQuery {
            count_max: self.count_max,
            count_min: self.count_min,
            params,
        };
        let envelope: Option<ContactsEnvelope> = self
            .send(endpoint, self.client.post(self.url(endpoint)).json(&body))
            .await?;
        Ok(envelope.and_then(|e| e.contacts).unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn contact_count(&self, params: &str) -> Result<u64> {
        let endpoint = Endpoint::Contacts;
        let body = ContactQuery {
            count_max: self.count_max,
            count_min: self.count_min,
            params,
        };
        let envelope: Option<CountEnvelope> = self
            .send(endpoint, self.client.post(self.url(endpoint)).json(&body))
            .await?;
        envelope
            .as_ref()
            .and_then(CountEnvelope::count)
            .ok_or_else(|| Error::upstream(endpoint.path(), None, "Response carries no count"))
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HttpApiClient::new("http://ace.example.test/").unwrap();
        assert_eq!(client.base_url(), "http://ace.example.test");
        assert_eq!(
            client.url(Endpoint::Org),
            "http://ace.example.test/api/ace/get_org"
        );
    }

    #[test]
    fn test_invalid_cookie_is_configuration_error() {
        let config = ApiConfig {
            session_cookie: Some("bad\ncookie".to_string()),
            ..ApiConfig::default()
        };
        let err = HttpApiClient::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
