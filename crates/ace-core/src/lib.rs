//! Core types and pure logic for ACE contact search
//!
//! Filter criteria, org hierarchy and contact types, the query builder shared by
//! the contact and count queries, the group → team → agent option resolver and
//! the projection of contact records into display rows.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod options;
pub mod projector;
pub mod query;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::{
    Config, EmptyResultsPolicy, LoggingConfig, StaleSelectionPolicy, UnknownStatePolicy,
};
pub use error::{Boundary, Error, Result};
pub use options::SelectableOptions;
pub use projector::ProjectorOptions;
pub use query::{QueryMode, build_query};
pub use types::{
    Agent, ContactRow, DateRange, EntityId, EvalState, FilterCriteria, Group, OrgEntity,
    OrgHierarchy, RawContact, SavedFilterSummary, SearchScope, Team,
};

/// Initialize the logging system
///
/// `RUST_LOG` overrides the configured level. A `format` of `json` selects
/// structured output, anything else a human-readable one.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {e}")))
}
