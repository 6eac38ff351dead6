//! Filter session and API client for ACE contact search
//!
//! [`FilterSession`] holds the search criteria, keeps the team and agent
//! options consistent with the selected group and team, talks to the remote
//! API through a [`ContactSearchApi`] and publishes [`SessionEvent`]s for its
//! host. [`HttpApiClient`] is the reqwest implementation of the API;
//! [`mock::MockContactSearchApi`] serves canned data for tests.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api;
pub mod bridge;
pub mod client;
pub mod events;
pub mod mock;
pub mod session;
pub mod store;
mod wire;

pub use api::{ContactSearchApi, Endpoint};
pub use bridge::{SearchResults, SessionBridge};
pub use client::HttpApiClient;
pub use events::{EventBus, SessionEvent, SpinnerGuard};
pub use session::FilterSession;
pub use store::{FilterStore, StoreChange};
