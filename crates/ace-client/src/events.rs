//! Notifications the filter session publishes to its host

use ace_core::{
    ContactRow, FilterCriteria, OrgHierarchy, SavedFilterSummary, SelectableOptions,
};
use tokio::sync::broadcast;
use tracing::trace;

/// A change in filter session state
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The criteria were edited, replaced or reset
    CriteriaChanged {
        /// Store generation after the change
        generation: u64,
        /// The new criteria
        criteria: FilterCriteria,
        /// Teams and agents now offered for selection
        options: SelectableOptions,
    },
    /// Saved filters were loaded, sorted by name
    SavedFiltersLoaded(Vec<SavedFilterSummary>),
    /// The org hierarchy was loaded, sorted and with sentinels
    OrgLoaded(OrgHierarchy),
    /// The highlighted saved filter changed
    SelectedFilterChanged(Option<SavedFilterSummary>),
    /// New result rows are on display
    ContactsChanged(Vec<ContactRow>),
    /// Number of contacts matching the last applied criteria
    ResultCount(u64),
    /// Work started (`true`) or finished (`false`)
    SpinnerChanged(bool),
    /// The session is not authorized; the host should navigate to `path`
    NavigateToLogin {
        /// Login page path
        path: String,
    },
    /// A message to show the user
    Alert(String),
}

/// Broadcast channel of [`SessionEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; having no subscribers is not an error
    pub fn publish(&self, event: SessionEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            trace!(?event, "No subscribers for session event");
        }
    }

    /// Turn the spinner on until the returned guard is dropped
    #[must_use]
    pub fn spinner(&self) -> SpinnerGuard {
        self.publish(SessionEvent::SpinnerChanged(true));
        SpinnerGuard { bus: self.clone() }
    }
}

/// Keeps the spinner on while alive
#[derive(Debug)]
pub struct SpinnerGuard {
    bus: EventBus,
}

impl Drop for SpinnerGuard {
    fn drop(&mut self) {
        self.bus.publish(SessionEvent::SpinnerChanged(false));
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_spinner_guard_turns_spinner_off_on_drop() {
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        {
            let _spinner = bus.spinner();
            assert_eq!(events.try_recv().unwrap(), SessionEvent::SpinnerChanged(true));
        }
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SpinnerChanged(false));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(0);
        bus.publish(SessionEvent::Alert("nobody listens".to_string()));
        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }
}
