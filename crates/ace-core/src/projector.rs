//! Projection of raw contact records into display rows

use crate::{
    Error, Result,
    config::UnknownStatePolicy,
    types::{ContactRow, EvalState, RawContact},
    utils::{DisplayZone, format_contact_date, format_contact_time, format_duration_millis},
};
use tracing::warn;

/// Label shown for an evaluation state id with no known state
pub const UNKNOWN_STATE_LABEL: &str = "Unknown";

/// Settings that shape projected rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectorOptions {
    /// Zone for dates and times
    pub zone: DisplayZone,
    /// Handling of unknown evaluation state ids
    pub unknown_state: UnknownStatePolicy,
}

impl Default for ProjectorOptions {
    fn default() -> Self {
        Self {
            zone: DisplayZone::Local,
            unknown_state: UnknownStatePolicy::Fallback,
        }
    }
}

/// Label for an evaluation state id.
///
/// # Errors
///
/// Returns [`Error::StateIndexOutOfRange`] for an unknown id under
/// [`UnknownStatePolicy::Reject`].
pub fn eval_state_label(id: Option<i64>, policy: UnknownStatePolicy) -> Result<&'static str> {
    match id.and_then(EvalState::from_id) {
        Some(state) => Ok(state.label()),
        None => match policy {
            UnknownStatePolicy::Fallback => {
                warn!(eval_state_id = ?id, "Unknown evaluation state id");
                Ok(UNKNOWN_STATE_LABEL)
            }
            UnknownStatePolicy::Reject => Err(Error::StateIndexOutOfRange {
                id: id.unwrap_or(-1),
            }),
        },
    }
}

/// Project one contact record
///
/// # Errors
///
/// Fails only when the evaluation state is rejected.
pub fn project_contact(contact: &RawContact, options: ProjectorOptions) -> Result<ContactRow> {
    let state = eval_state_label(contact.eval_state_id, options.unknown_state)?;
    let started = contact.start_time.as_ref().and_then(|start| start.to_utc());
    if started.is_none() {
        warn!(contact_id = %contact.id, "Contact has no readable start time");
    }
    let agent = contact.agent.clone().unwrap_or_default();

    Ok(ContactRow {
        state: state.to_string(),
        id: contact.id.clone(),
        first_name: agent.first_name,
        last_name: agent.last_name,
        group: contact
            .group
            .as_ref()
            .map(|g| g.name.clone())
            .unwrap_or_default(),
        team: contact
            .team
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default(),
        ani: contact.ani.clone(),
        dnis: contact.dnis.clone(),
        date: started
            .map(|at| format_contact_date(at, options.zone))
            .unwrap_or_default(),
        time: started
            .map(|at| format_contact_time(at, options.zone))
            .unwrap_or_default(),
        tz: contact.tz.clone(),
        call_duration: format_duration_millis(contact.call_duration),
    })
}

/// Project contact records, preserving their order
///
/// # Errors
///
/// Fails on the first rejected evaluation state.
pub fn project_contacts(contacts: &[RawContact], options: ProjectorOptions) -> Result<Vec<ContactRow>> {
    contacts
        .iter()
        .map(|contact| project_contact(contact, options))
        .collect()
}
