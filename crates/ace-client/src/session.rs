//! Filter session
//!
//! Ties the filter store, the persistence bridge and the result projector
//! together. Three operations talk to the remote API: [`FilterSession::mount`],
//! [`FilterSession::select_saved_filter`] and [`FilterSession::apply`]. Only one
//! of them may be outstanding at a time; a second one fails with
//! [`Error::Busy`]. Failures are reported to the host as events at the
//! operation boundary and also returned to the caller.

use crate::{
    api::ContactSearchApi,
    bridge::{SearchResults, SessionBridge},
    events::{EventBus, SessionEvent},
    store::{FilterStore, StoreChange},
};
use ace_core::{
    Boundary, Config, ContactRow, EmptyResultsPolicy, Error, FilterCriteria, OrgHierarchy,
    ProjectorOptions, QueryMode, Result, SavedFilterSummary, SelectableOptions, build_query,
    config::SessionConfig, projector::project_contacts,
};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

/// Marks an operation as outstanding until dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(Self(flag))
        } else {
            Err(Error::Busy)
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
struct Results {
    rows: Vec<ContactRow>,
    count: Option<u64>,
}

/// A contact search session
#[derive(Debug)]
pub struct FilterSession {
    bridge: SessionBridge,
    store: Mutex<FilterStore>,
    saved_filters: Mutex<Vec<SavedFilterSummary>>,
    results: Mutex<Results>,
    events: EventBus,
    in_flight: AtomicBool,
    epoch: AtomicU64,
    config: SessionConfig,
    projector: ProjectorOptions,
}

impl FilterSession {
    /// Create a session over `api`
    #[must_use]
    pub fn new(api: Arc<dyn ContactSearchApi>, config: &Config) -> Self {
        Self {
            bridge: SessionBridge::new(api),
            store: Mutex::new(FilterStore::new(config.session.stale_selection)),
            saved_filters: Mutex::new(Vec::new()),
            results: Mutex::new(Results::default()),
            events: EventBus::new(config.session.event_capacity),
            in_flight: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            config: config.session.clone(),
            projector: ProjectorOptions {
                zone: config.display.zone(),
                unknown_state: config.session.unknown_eval_state,
            },
        }
    }

    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current criteria
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        self.store.lock().snapshot().clone()
    }

    /// Store generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.store.lock().generation()
    }

    /// Teams and agents offered for the current criteria
    #[must_use]
    pub fn selectable_options(&self) -> SelectableOptions {
        self.store.lock().options().clone()
    }

    /// Loaded org hierarchy
    #[must_use]
    pub fn org(&self) -> OrgHierarchy {
        self.store.lock().org().clone()
    }

    /// Loaded saved filters, sorted by name
    #[must_use]
    pub fn saved_filters(&self) -> Vec<SavedFilterSummary> {
        self.saved_filters.lock().clone()
    }

    /// Highlighted saved filter
    #[must_use]
    pub fn selected_filter(&self) -> Option<SavedFilterSummary> {
        self.store.lock().selected_filter().cloned()
    }

    /// Rows on display
    #[must_use]
    pub fn rows(&self) -> Vec<ContactRow> {
        self.results.lock().rows.clone()
    }

    /// Count from the last completed search; `None` before the first one
    #[must_use]
    pub fn result_count(&self) -> Option<u64> {
        self.results.lock().count
    }

    /// Whether a remote operation is outstanding
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Edit the criteria through one of the [`FilterStore`] setters and
    /// publish the change
    pub fn edit(&self, edit: impl FnOnce(&mut FilterStore) -> StoreChange) -> StoreChange {
        let change = edit(&mut *self.store.lock());
        self.publish_change(&change);
        change
    }

    /// Clear every field and the highlighted saved filter.
    ///
    /// Results of an outstanding operation are discarded when it completes.
    pub fn cancel(&self) {
        self.next_epoch();
        let change = {
            let mut store = self.store.lock();
            store.select_filter(None);
            store.reset_fields()
        };
        self.events.publish(SessionEvent::SelectedFilterChanged(None));
        self.publish_change(&change);
        info!("Filter criteria cleared");
    }

    /// Load saved filters, the org hierarchy and the most recent search, and
    /// run the most recent search if it has a base selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if another operation is outstanding, otherwise
    /// the first failure, which is also reported to the host.
    #[instrument(skip(self))]
    pub async fn mount(&self) -> Result<()> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;
        let epoch = self.next_epoch();
        let _spinner = self.events.spinner();

        let result = self.run_mount(epoch).await;
        self.finish(Boundary::Data, result)
    }

    async fn run_mount(&self, epoch: u64) -> Result<()> {
        let saved_filters = self.bridge.fetch_saved_filters().await?;
        self.saved_filters.lock().clone_from(&saved_filters);
        self.events
            .publish(SessionEvent::SavedFiltersLoaded(saved_filters));

        let org = self.bridge.fetch_org_hierarchy().await?;
        let change = self.store.lock().set_org(org.clone());
        self.events.publish(SessionEvent::OrgLoaded(org));
        self.publish_change(&change);

        let Some(recent) = self.bridge.fetch_most_recent_search().await? else {
            info!("No recent search to restore");
            return Ok(());
        };
        if !self.is_current(epoch) {
            return Ok(());
        }
        let change = self.store.lock().replace(recent);
        self.publish_change(&change);

        if change.criteria.base_selector().is_none() {
            warn!("Recent search has neither contact id nor date range; not running it");
            return Ok(());
        }
        let results = self.bridge.search(&change.criteria).await?;
        self.show_results(epoch, results)
    }

    /// Load the saved filter `key` into the store.
    ///
    /// The criteria are cleared first; the filter's criteria replace them once
    /// they arrive. No search is run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if another operation is outstanding, otherwise
    /// the API failure, which is also reported to the host.
    #[instrument(skip(self))]
    pub async fn select_saved_filter(&self, key: &str) -> Result<()> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;
        let epoch = self.next_epoch();
        let _spinner = self.events.spinner();

        let selected = self
            .saved_filters
            .lock()
            .iter()
            .find(|filter| filter.key == key)
            .cloned();
        let change = {
            let mut store = self.store.lock();
            store.select_filter(selected.clone());
            store.reset_fields()
        };
        self.events
            .publish(SessionEvent::SelectedFilterChanged(selected));
        self.publish_change(&change);

        let result = async {
            let criteria = self.bridge.fetch_filter_details(key).await?;
            if self.is_current(epoch) {
                let change = self.store.lock().replace(criteria);
                self.publish_change(&change);
            } else {
                debug!(key, "Discarding superseded saved filter");
            }
            Ok(())
        }
        .await;
        self.finish(Boundary::Filter, result)
    }

    /// Run the contact and count queries for the current criteria, show the
    /// results, and store the criteria as the most recent search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredSelector`] without issuing a request
    /// when the criteria have neither a contact id nor a date range,
    /// [`Error::Busy`] if another operation is outstanding, and otherwise the
    /// search failure. Everything but `Busy` is also reported to the host.
    #[instrument(skip(self))]
    pub async fn apply(&self) -> Result<()> {
        let criteria = self.criteria();
        if let Err(err) = build_query(&criteria, QueryMode::Contacts) {
            return self.finish(Boundary::Contacts, Err(err));
        }

        let _in_flight = InFlight::acquire(&self.in_flight)?;
        let epoch = self.next_epoch();
        let _spinner = self.events.spinner();

        let result = async {
            let results = self.bridge.search(&criteria).await?;
            self.show_results(epoch, results)
        }
        .await;
        self.finish(Boundary::Contacts, result)?;

        if !self.is_current(epoch) {
            debug!(epoch, "Search superseded; not saving it as the most recent search");
            return Ok(());
        }
        match self.bridge.save_most_recent_search(&criteria).await {
            Ok(_) => {}
            Err(err) if err.is_unauthorized() => self.redirect_to_login(),
            Err(err) => warn!(error = %err, "Failed to save most recent search"),
        }
        Ok(())
    }

    fn show_results(&self, epoch: u64, results: SearchResults) -> Result<()> {
        if !self.is_current(epoch) {
            debug!(epoch, "Discarding stale search results");
            return Ok(());
        }
        let rows = project_contacts(&results.contacts, self.projector)?;

        let publish_rows = !rows.is_empty() || self.config.empty_results == EmptyResultsPolicy::Clear;
        {
            let mut shown = self.results.lock();
            if publish_rows {
                shown.rows.clone_from(&rows);
            }
            shown.count = Some(results.count);
        }
        if publish_rows {
            self.events.publish(SessionEvent::ContactsChanged(rows));
        } else {
            debug!("Empty result set; keeping previous rows");
        }
        self.events.publish(SessionEvent::ResultCount(results.count));
        Ok(())
    }

    /// Report the outcome of an operation to the host and hand it back
    fn finish(&self, boundary: Boundary, result: Result<()>) -> Result<()> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                self.redirect_to_login();
            } else if let Some(message) = err.alert_text(boundary) {
                error!(%boundary, error = %err, "Operation failed");
                self.events.publish(SessionEvent::Alert(message));
            }
        }
        result
    }

    fn redirect_to_login(&self) {
        warn!(path = %self.config.login_path, "Session unauthorized; redirecting to login");
        self.events.publish(SessionEvent::NavigateToLogin {
            path: self.config.login_path.clone(),
        });
    }

    fn publish_change(&self, change: &StoreChange) {
        self.events.publish(SessionEvent::CriteriaChanged {
            generation: change.generation,
            criteria: change.criteria.clone(),
            options: change.options.clone(),
        });
    }

    fn next_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::Acquire) == epoch
    }
}
