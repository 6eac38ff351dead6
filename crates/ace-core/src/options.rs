//! Dependent option resolution for the group → team → agent cascade

use crate::{
    config::StaleSelectionPolicy,
    types::{Agent, EntityId, FilterCriteria, OrgHierarchy, Team},
};

/// Teams and agents currently offered for selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectableOptions {
    /// Teams under the selected group
    pub teams: Vec<Team>,
    /// Agents under the selected team
    pub agents: Vec<Agent>,
}

impl SelectableOptions {
    /// Whether `team` is offered
    #[must_use]
    pub fn offers_team(&self, team: &EntityId) -> bool {
        self.teams.iter().any(|t| t.id == *team)
    }

    /// Whether `agent` is offered
    #[must_use]
    pub fn offers_agent(&self, agent: &EntityId) -> bool {
        self.agents.iter().any(|a| a.id == *agent)
    }
}

fn unfiltered(selected: Option<&EntityId>) -> bool {
    selected.is_none_or(EntityId::is_all)
}

/// Teams whose parent group is `group`, plus the "All" entry.
///
/// With no group (or the "All" group) every team is returned unchanged.
#[must_use]
pub fn selectable_teams(teams: &[Team], group: Option<&EntityId>) -> Vec<Team> {
    teams
        .iter()
        .filter(|team| {
            unfiltered(group) || team.id.is_all() || Some(&team.parent_group_id) == group
        })
        .cloned()
        .collect()
}

/// Agents whose team is `team`, plus the "All" entry.
///
/// With no team (or the "All" team) every agent is returned unchanged.
#[must_use]
pub fn selectable_agents(agents: &[Agent], team: Option<&EntityId>) -> Vec<Agent> {
    agents
        .iter()
        .filter(|agent| unfiltered(team) || agent.id.is_all() || Some(&agent.group_id) == team)
        .cloned()
        .collect()
}

/// Options for the current criteria
#[must_use]
pub fn resolve(org: &OrgHierarchy, criteria: &FilterCriteria) -> SelectableOptions {
    SelectableOptions {
        teams: selectable_teams(&org.teams, criteria.group.as_ref()),
        agents: selectable_agents(&org.agents, criteria.team.as_ref()),
    }
}

/// Apply the stale-selection policy and return the criteria together with the
/// options they resolve to.
///
/// Under [`StaleSelectionPolicy::Clear`] a team that the selected group no
/// longer offers is dropped, and then an agent that the (possibly dropped)
/// team no longer offers. Nothing is dropped before the hierarchy is loaded.
#[must_use]
pub fn reconcile(
    org: &OrgHierarchy,
    mut criteria: FilterCriteria,
    policy: StaleSelectionPolicy,
) -> (FilterCriteria, SelectableOptions) {
    if policy == StaleSelectionPolicy::Preserve || !org.is_loaded() {
        let options = resolve(org, &criteria);
        return (criteria, options);
    }

    let teams = selectable_teams(&org.teams, criteria.group.as_ref());
    if criteria
        .team
        .as_ref()
        .is_some_and(|team| !team.is_all() && !teams.iter().any(|t| t.id == *team))
    {
        tracing::debug!(team = ?criteria.team, group = ?criteria.group, "Clearing stale team selection");
        criteria.team = None;
    }

    let agents = selectable_agents(&org.agents, criteria.team.as_ref());
    if criteria
        .agent
        .as_ref()
        .is_some_and(|agent| !agent.is_all() && !agents.iter().any(|a| a.id == *agent))
    {
        tracing::debug!(agent = ?criteria.agent, team = ?criteria.team, "Clearing stale agent selection");
        criteria.agent = None;
    }

    (criteria, SelectableOptions { teams, agents })
}
