//! Plain-text rendering of search results and reference data

use ace_core::{ContactRow, OrgHierarchy, SavedFilterSummary};
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct ContactLine<'a> {
    #[tabled(rename = "State")]
    state: &'a str,
    #[tabled(rename = "Contact")]
    id: &'a str,
    #[tabled(rename = "First Name")]
    first_name: &'a str,
    #[tabled(rename = "Last Name")]
    last_name: &'a str,
    #[tabled(rename = "Group")]
    group: &'a str,
    #[tabled(rename = "Team")]
    team: &'a str,
    #[tabled(rename = "ANI")]
    ani: &'a str,
    #[tabled(rename = "DNIS")]
    dnis: &'a str,
    #[tabled(rename = "Date")]
    date: &'a str,
    #[tabled(rename = "Time")]
    time: &'a str,
    #[tabled(rename = "TZ")]
    tz: &'a str,
    #[tabled(rename = "Duration")]
    duration: &'a str,
}

impl<'a> From<&'a ContactRow> for ContactLine<'a> {
    fn from(row: &'a ContactRow) -> Self {
        Self {
            state: &row.state,
            id: row.id.as_str(),
            first_name: &row.first_name,
            last_name: &row.last_name,
            group: &row.group,
            team: &row.team,
            ani: &row.ani,
            dnis: &row.dnis,
            date: &row.date,
            time: &row.time,
            tz: &row.tz,
            duration: &row.call_duration,
        }
    }
}

#[derive(Tabled)]
struct SavedFilterLine<'a> {
    #[tabled(rename = "Key")]
    key: &'a str,
    #[tabled(rename = "Name")]
    name: &'a str,
}

#[derive(Tabled)]
struct OrgLine<'a> {
    #[tabled(rename = "Id")]
    id: &'a str,
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Parent")]
    parent: &'a str,
}

fn render<T: Tabled>(lines: impl IntoIterator<Item = T>) -> String {
    let mut rendered = Table::new(lines).with(Style::blank()).to_string();
    rendered.push('\n');
    rendered
}

/// Contact rows followed by the total count
pub fn contacts(rows: &[ContactRow], count: Option<u64>) -> String {
    let mut out = render(rows.iter().map(ContactLine::from));
    match count {
        Some(count) => out.push_str(&format!("\n{} of {count} contacts shown\n", rows.len())),
        None => out.push_str("\nNo search was run\n"),
    }
    out
}

/// Saved filters, one per line
pub fn saved_filters(filters: &[SavedFilterSummary]) -> String {
    render(filters.iter().map(|f| SavedFilterLine {
        key: &f.key,
        name: &f.name,
    }))
}

/// Groups, teams and agents in three sections
pub fn org(org: &OrgHierarchy) -> String {
    let groups = org.groups.iter().map(|g| OrgLine {
        id: g.id.as_str(),
        name: &g.name,
        parent: g.parent_group_id.as_str(),
    });
    let teams = org.teams.iter().map(|t| OrgLine {
        id: t.id.as_str(),
        name: &t.name,
        parent: t.parent_group_id.as_str(),
    });
    let agents = org.agents.iter().map(|a| OrgLine {
        id: a.id.as_str(),
        name: &a.display_id,
        parent: a.group_id.as_str(),
    });

    format!(
        "Groups\n{}\nTeams\n{}\nAgents\n{}",
        render(groups),
        render(teams),
        render(agents)
    )
}
