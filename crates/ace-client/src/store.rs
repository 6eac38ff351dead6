//! Filter state store
//!
//! Holds the current criteria together with the org hierarchy they are
//! resolved against. Every change produces a new criteria value and a new
//! generation; the dependent team and agent options are recomputed each time.

use ace_core::{
    DateRange, EntityId, EvalState, FilterCriteria, OrgHierarchy, SavedFilterSummary,
    SearchScope, SelectableOptions, StaleSelectionPolicy, options::reconcile,
    types::parse_number,
};
use tracing::debug;

/// Outcome of a store mutation, ready to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    /// Generation after the change
    pub generation: u64,
    /// Criteria after the change
    pub criteria: FilterCriteria,
    /// Options the criteria resolve to
    pub options: SelectableOptions,
}

/// Current filter criteria and everything derived from them
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    criteria: FilterCriteria,
    generation: u64,
    org: OrgHierarchy,
    options: SelectableOptions,
    selected_filter: Option<SavedFilterSummary>,
    policy: StaleSelectionPolicy,
}

impl FilterStore {
    /// Create an empty store
    #[must_use]
    pub fn new(policy: StaleSelectionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Current criteria
    #[must_use]
    pub const fn snapshot(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Number of changes applied so far
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Org hierarchy the options are resolved against
    #[must_use]
    pub const fn org(&self) -> &OrgHierarchy {
        &self.org
    }

    /// Teams and agents offered for the current criteria
    #[must_use]
    pub const fn options(&self) -> &SelectableOptions {
        &self.options
    }

    /// Teams offered for the selected group
    #[must_use]
    pub fn selectable_teams(&self) -> &[ace_core::Team] {
        &self.options.teams
    }

    /// Agents offered for the selected team
    #[must_use]
    pub fn selectable_agents(&self) -> &[ace_core::Agent] {
        &self.options.agents
    }

    /// Saved filter currently highlighted
    #[must_use]
    pub const fn selected_filter(&self) -> Option<&SavedFilterSummary> {
        self.selected_filter.as_ref()
    }

    /// Highlight a saved filter, or none
    pub fn select_filter(&mut self, filter: Option<SavedFilterSummary>) {
        self.selected_filter = filter;
    }

    /// Install the org hierarchy and re-resolve the current criteria against it
    pub fn set_org(&mut self, org: OrgHierarchy) -> StoreChange {
        self.org = org;
        let criteria = self.criteria.clone();
        self.commit(criteria)
    }

    /// Apply an arbitrary edit to the criteria
    pub fn update(&mut self, edit: impl FnOnce(&mut FilterCriteria)) -> StoreChange {
        let mut criteria = self.criteria.clone();
        edit(&mut criteria);
        self.commit(criteria)
    }

    /// Replace the whole criteria, as when restoring a saved or recent search
    pub fn replace(&mut self, criteria: FilterCriteria) -> StoreChange {
        self.commit(criteria)
    }

    /// Clear every field
    pub fn reset_fields(&mut self) -> StoreChange {
        self.commit(FilterCriteria::default())
    }

    /// Set or clear the contact id
    pub fn set_contact_id(&mut self, contact_id: Option<u64>) -> StoreChange {
        self.update(|c| c.contact_id = contact_id)
    }

    /// Set the contact id from form input; anything that is not a positive
    /// number clears it
    pub fn set_contact_id_input(&mut self, input: &str) -> StoreChange {
        let contact_id = parse_number(input).filter(|id| *id > 0);
        self.set_contact_id(contact_id)
    }

    /// Set or clear the date range
    pub fn set_date_range(&mut self, range: Option<DateRange>) -> StoreChange {
        self.update(|c| c.date_range = range)
    }

    /// Set or clear the phone number
    pub fn set_phone_number(&mut self, phone_number: Option<String>) -> StoreChange {
        self.update(|c| c.phone_number = phone_number)
    }

    /// Set or clear the search scope
    pub fn set_search_scope(&mut self, scope: Option<SearchScope>) -> StoreChange {
        self.update(|c| c.search_scope = scope)
    }

    /// Set or clear the evaluation state
    pub fn set_eval_state(&mut self, state: Option<EvalState>) -> StoreChange {
        self.update(|c| c.eval_state = state)
    }

    /// Select a group; the team and agent options follow
    pub fn set_group(&mut self, group: Option<EntityId>) -> StoreChange {
        self.update(|c| c.group = group)
    }

    /// Select a team; the agent options follow
    pub fn set_team(&mut self, team: Option<EntityId>) -> StoreChange {
        self.update(|c| c.team = team)
    }

    /// Select an agent
    pub fn set_agent(&mut self, agent: Option<EntityId>) -> StoreChange {
        self.update(|c| c.agent = agent)
    }

    /// Set or clear the maximum call duration in seconds
    pub fn set_duration_seconds(&mut self, seconds: Option<u64>) -> StoreChange {
        self.update(|c| c.duration_seconds = seconds)
    }

    /// Set or clear the evaluator first name
    pub fn set_evaluator_first_name(&mut self, name: Option<String>) -> StoreChange {
        self.update(|c| c.evaluator_first_name = name)
    }

    /// Set or clear the evaluator last name
    pub fn set_evaluator_last_name(&mut self, name: Option<String>) -> StoreChange {
        self.update(|c| c.evaluator_last_name = name)
    }

    fn commit(&mut self, criteria: FilterCriteria) -> StoreChange {
        let (criteria, options) = reconcile(&self.org, criteria, self.policy);
        self.criteria = criteria;
        self.options = options;
        self.generation += 1;
        debug!(generation = self.generation, "Filter criteria changed");

        StoreChange {
            generation: self.generation,
            criteria: self.criteria.clone(),
            options: self.options.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use ace_core::{Agent, OrgEntity, Team};
    use pretty_assertions::assert_eq;

    fn org() -> OrgHierarchy {
        OrgHierarchy {
            groups: Vec::new(),
            teams: vec![
                Team::sentinel(),
                Team {
                    id: "t1".into(),
                    name: "Billing".to_string(),
                    group_id: EntityId::all(),
                    parent_group_id: "g1".into(),
                },
                Team {
                    id: "t2".into(),
                    name: "Claims".to_string(),
                    group_id: EntityId::all(),
                    parent_group_id: "g2".into(),
                },
            ],
            agents: vec![
                Agent::sentinel(),
                Agent {
                    id: "a1".into(),
                    display_id: "ada".to_string(),
                    group_id: "t1".into(),
                    ..Agent::default()
                },
                Agent {
                    id: "a2".into(),
                    display_id: "bob".to_string(),
                    group_id: "t2".into(),
                    ..Agent::default()
                },
            ],
        }
    }

    #[test]
    fn test_every_change_bumps_generation() {
        let mut store = FilterStore::new(StaleSelectionPolicy::Clear);
        assert_eq!(store.generation(), 0);

        let change = store.set_date_range(Some(DateRange::Today));
        assert_eq!(change.generation, 1);
        assert_eq!(change.criteria.date_range, Some(DateRange::Today));

        store.set_phone_number(Some("5551234".to_string()));
        assert_eq!(store.generation(), 2);
        assert_eq!(store.snapshot().date_range, Some(DateRange::Today));
    }

    #[test]
    fn test_contact_id_input_parsing() {
        let mut store = FilterStore::default();
        assert_eq!(store.set_contact_id_input("42").criteria.contact_id, Some(42));
        assert_eq!(store.set_contact_id_input("12.7").criteria.contact_id, Some(12));
        assert_eq!(store.set_contact_id_input("-3").criteria.contact_id, None);
        assert_eq!(store.set_contact_id_input("0").criteria.contact_id, None);
        assert_eq!(store.set_contact_id_input("").criteria.contact_id, None);
    }

    #[test]
    fn test_group_change_filters_teams_and_clears_stale_team() {
        let mut store = FilterStore::new(StaleSelectionPolicy::Clear);
        store.set_org(org());
        store.set_team(Some("t1".into()));
        store.set_agent(Some("a1".into()));

        let change = store.set_group(Some("g2".into()));
        let team_ids: Vec<_> = change.options.teams.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(team_ids, vec!["", "t2"]);
        assert_eq!(change.criteria.team, None);
        // With the team cleared every agent is offered again, so a1 survives
        assert_eq!(change.criteria.agent, Some("a1".into()));
        assert_eq!(store.selectable_agents().len(), 3);
    }

    #[test]
    fn test_team_change_clears_stale_agent() {
        let mut store = FilterStore::new(StaleSelectionPolicy::Clear);
        store.set_org(org());
        store.set_team(Some("t1".into()));
        store.set_agent(Some("a1".into()));

        let change = store.set_team(Some("t2".into()));
        assert_eq!(change.criteria.agent, None);
        assert!(change.options.offers_agent(&"a2".into()));
    }

    #[test]
    fn test_preserve_policy_keeps_hidden_selection() {
        let mut store = FilterStore::new(StaleSelectionPolicy::Preserve);
        store.set_org(org());
        store.set_team(Some("t1".into()));

        let change = store.set_group(Some("g2".into()));
        assert_eq!(change.criteria.team, Some("t1".into()));
        assert!(!change.options.offers_team(&"t1".into()));
    }

    #[test]
    fn test_team_selection_narrows_agents() {
        let mut store = FilterStore::new(StaleSelectionPolicy::Clear);
        store.set_org(org());
        store.set_team(Some("t2".into()));
        let agents: Vec<_> = store
            .selectable_agents()
            .iter()
            .map(|a| a.display_id.as_str())
            .collect();
        assert_eq!(agents, vec!["All", "bob"]);
    }

    #[test]
    fn test_reset_and_replace() {
        let mut store = FilterStore::default();
        store.set_eval_state(Some(EvalState::Scored));
        store.select_filter(Some(SavedFilterSummary {
            key: "1".to_string(),
            name: "Mine".to_string(),
        }));

        let change = store.reset_fields();
        assert_eq!(change.criteria, FilterCriteria::default());
        assert_eq!(store.selected_filter().unwrap().key, "1");

        let restored = FilterCriteria {
            contact_id: Some(42),
            ..FilterCriteria::default()
        };
        assert_eq!(store.replace(restored.clone()).criteria, restored);
    }
}
