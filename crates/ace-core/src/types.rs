//! Core data types for ACE contact search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{convert::Infallible, fmt, str::FromStr};
use thiserror::Error;

/// Identifier of a remote entity (group, team, agent, contact).
///
/// The remote API is inconsistent about ids: the same id can arrive as a JSON
/// number or a string. Ids are kept in their textual form so that `7` and `"7"`
/// compare equal. The empty id is the "All" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id from any textual form
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The "All" sentinel id
    #[must_use]
    pub const fn all() -> Self {
        Self(String::new())
    }

    /// Whether this is the "All" sentinel
    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.0.is_empty()
    }

    /// Textual form of the id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<lenient::Scalar>::deserialize(deserializer)?
            .map_or_else(Self::all, |scalar| Self::new(scalar.into_text())))
    }
}

/// Decoding helpers for loosely typed API payloads
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer, de};
    use std::{fmt, str::FromStr};

    /// Any JSON scalar
    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(crate) enum Scalar {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    impl Scalar {
        pub(crate) fn into_text(self) -> String {
            match self {
                Self::Text(text) => text,
                Self::Number(number) => number.to_string(),
                Self::Flag(flag) => flag.to_string(),
            }
        }
    }

    /// Optional value parsed from its textual form; blank text is absent
    pub(crate) fn optional_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(scalar) = Option::<Scalar>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let text = scalar.into_text();
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        text.parse().map(Some).map_err(de::Error::custom)
    }

    /// Required text; null becomes the empty string
    pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?
            .map(Scalar::into_text)
            .unwrap_or_default())
    }

    /// Optional keyed value; blank text is absent and an unrecognised key is
    /// dropped with a warning
    pub(crate) fn optional_key<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(scalar) = Option::<Scalar>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let text = scalar.into_text();
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        match text.parse() {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(%err, "Ignoring unrecognised filter value");
                Ok(None)
            }
        }
    }

    /// Optional signed number from a JSON number or numeric text; fractions
    /// are truncated and unparseable input is absent
    pub(crate) fn optional_signed<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?
            .and_then(|scalar| parse_signed(&scalar.into_text())))
    }

    /// Signed number where null or unparseable input counts as zero
    pub(crate) fn signed_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional_signed(deserializer)?.unwrap_or_default())
    }

    #[allow(clippy::cast_precision_loss)]
    fn parse_signed(input: &str) -> Option<i64> {
        let input = input.trim();
        if let Ok(value) = input.parse::<i64>() {
            return Some(value);
        }
        let value = input.parse::<f64>().ok()?;
        if value.is_finite() && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
            #[allow(clippy::cast_possible_truncation)]
            Some(value.trunc() as i64)
        } else {
            None
        }
    }

    /// Optional non-negative number from a JSON number or numeric text.
    ///
    /// Unparseable input is treated as absent rather than rejected.
    pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?
            .and_then(|scalar| super::parse_number(&scalar.into_text())))
    }
}

/// Parse a non-negative whole number the way the filter form accepts it.
///
/// Fractions are truncated; negative, non-finite and non-numeric input yields `None`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn parse_number(input: &str) -> Option<u64> {
    let input = input.trim();
    if let Ok(value) = input.parse::<u64>() {
        return Some(value);
    }
    let value = input.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(value.trunc() as u64)
    } else {
        None
    }
}

/// A key that does not name any variant of a keyed enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} key: {key}")]
pub struct UnknownKey {
    /// Enumeration name
    pub kind: &'static str,
    /// Rejected key
    pub key: String,
}

/// Declares an enumeration whose wire form is a fixed key and which carries a
/// display label.
macro_rules! keyed_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => ($key:literal, $label:literal),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every variant, in display order
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Wire key
            #[must_use]
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }

            /// Display label
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKey;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok(Self::$variant),)+
                    other => Err(UnknownKey {
                        kind: $kind,
                        key: other.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.key())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let key = String::deserialize(deserializer)?;
                key.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

keyed_enum! {
    /// Relative date window a search covers
    DateRange as "date range" {
        /// Today
        Today => ("date_range_today", "Today"),
        /// Yesterday
        Yesterday => ("date_range_yesterday", "Yesterday"),
        /// Past seven days
        PastWeek => ("date_range_in_the_past_week", "In the past week"),
        /// Past month
        PastMonth => ("date_range_in_the_past_month", "In the past month"),
        /// Past year
        PastYear => ("date_range_in_the_past_year", "In the past year"),
    }
}

keyed_enum! {
    /// Visibility class of the evaluations searched
    SearchScope as "search scope" {
        /// Every evaluation the user can see
        AllEvaluations => ("allEvaluations", "All Evaluations"),
        /// Evaluations performed by the user
        MyEvaluations => ("myEvaluations", "My Evaluations"),
        /// Calibrations waiting on the user
        MyCalibrations => ("myCalibrations", "My Pending Calibrations"),
    }
}

keyed_enum! {
    /// Lifecycle status of an evaluation
    EvalState as "evaluation state" {
        /// Not yet scored
        Unscored => ("unscored", "Unscored"),
        /// Scored
        Scored => ("scored", "Scored"),
        /// Scoring started but not finished
        InProgress => ("in_progress", "In Progress"),
        /// Scored, waiting for approval
        NeedsApproval => ("needs_approval", "Needs Approval"),
        /// Marked as impossible to score
        CannotScore => ("cannot_score", "Cannot Score"),
        /// Cannot-score marking waiting for approval
        NeedsCannotScoreApproval => ("needs_cannot_score_approval", "Needs Cannot Score Approval"),
    }
}

impl EvalState {
    /// Numeric state id used by contact records
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Unscored => 0,
            Self::Scored => 1,
            Self::InProgress => 2,
            Self::NeedsApproval => 3,
            Self::CannotScore => 4,
            Self::NeedsCannotScoreApproval => 5,
        }
    }

    /// State for a numeric id, if the id is known
    #[must_use]
    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|state| state.id() == id)
    }
}

/// Selector that governs the base of a contact query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseSelector {
    /// A single contact by id
    ContactId(u64),
    /// All contacts in a date window
    Range(DateRange),
}

/// Complete set of search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Contact id; only a positive value selects a contact
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_number"
    )]
    pub contact_id: Option<u64>,

    /// Date window, used when no contact id is set
    #[serde(
        rename = "range",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_key"
    )]
    pub date_range: Option<DateRange>,

    /// Phone number (ANI or DNIS)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub phone_number: Option<String>,

    /// Search scope
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_key"
    )]
    pub search_scope: Option<SearchScope>,

    /// Evaluation state
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_key"
    )]
    pub eval_state: Option<EvalState>,

    /// Selected group
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub group: Option<EntityId>,

    /// Selected team
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub team: Option<EntityId>,

    /// Selected agent
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub agent: Option<EntityId>,

    /// Upper bound on call duration, in seconds
    #[serde(
        rename = "durationInSeconds",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_number"
    )]
    pub duration_seconds: Option<u64>,

    /// Evaluator first name
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub evaluator_first_name: Option<String>,

    /// Evaluator last name
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub evaluator_last_name: Option<String>,
}

impl FilterCriteria {
    /// Contact id, if it is positive
    #[must_use]
    pub fn effective_contact_id(&self) -> Option<u64> {
        self.contact_id.filter(|id| *id > 0)
    }

    /// The selector that governs the base query, contact id first
    #[must_use]
    pub fn base_selector(&self) -> Option<BaseSelector> {
        self.effective_contact_id()
            .map(BaseSelector::ContactId)
            .or_else(|| self.date_range.map(BaseSelector::Range))
    }

    /// Whether no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clone().normalized() == Self::default()
    }

    /// Same criteria with blank text, "All" ids and a zero contact id removed
    #[must_use]
    pub fn normalized(self) -> Self {
        fn text(value: Option<String>) -> Option<String> {
            value.and_then(|v| {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    None
                } else if trimmed.len() == v.len() {
                    Some(v)
                } else {
                    Some(trimmed.to_string())
                }
            })
        }
        fn id(value: Option<EntityId>) -> Option<EntityId> {
            value.filter(|id| !id.is_all())
        }

        Self {
            contact_id: self.contact_id.filter(|id| *id > 0),
            date_range: self.date_range,
            phone_number: text(self.phone_number),
            search_scope: self.search_scope,
            eval_state: self.eval_state,
            group: id(self.group),
            team: id(self.team),
            agent: id(self.agent),
            duration_seconds: self.duration_seconds,
            evaluator_first_name: text(self.evaluator_first_name),
            evaluator_last_name: text(self.evaluator_last_name),
        }
    }

    /// Payload stored as the most recent search.
    ///
    /// Only non-empty fields survive, and only the governing base selector is
    /// kept: a positive contact id drops the date range, otherwise the contact
    /// id is dropped.
    #[must_use]
    pub fn persisted(&self) -> Self {
        let mut payload = self.clone().normalized();
        if payload.contact_id.is_some() {
            payload.date_range = None;
        }
        payload
    }
}

/// Shared accessors of org hierarchy entities
pub trait OrgEntity {
    /// Entity id
    fn id(&self) -> &EntityId;

    /// Name shown in selection lists and used for sorting
    fn display_name(&self) -> &str;

    /// The "All" entry for this kind of entity
    fn sentinel() -> Self
    where
        Self: Sized;
}

/// An org group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group id
    #[serde(default)]
    pub id: EntityId,
    /// Group name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Parent group id
    #[serde(default)]
    pub parent_group_id: EntityId,
}

impl OrgEntity for Group {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn sentinel() -> Self {
        Self {
            id: EntityId::all(),
            name: "All".to_string(),
            parent_group_id: EntityId::all(),
        }
    }
}

/// A team inside a group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Team id
    #[serde(default)]
    pub id: EntityId,
    /// Team name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Group id as reported by the ACD
    #[serde(default)]
    pub group_id: EntityId,
    /// Id of the group that owns this team
    #[serde(default)]
    pub parent_group_id: EntityId,
}

impl OrgEntity for Team {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn sentinel() -> Self {
        Self {
            id: EntityId::all(),
            name: "All".to_string(),
            group_id: EntityId::all(),
            parent_group_id: EntityId::all(),
        }
    }
}

/// An agent, associated with a team through `group_id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Agent id
    #[serde(default)]
    pub id: EntityId,
    /// Name shown in selection lists
    #[serde(default, deserialize_with = "lenient::text")]
    pub display_id: String,
    /// First name
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub first_name: Option<String>,
    /// Last name
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub last_name: Option<String>,
    /// Id of the team the agent belongs to
    #[serde(default)]
    pub group_id: EntityId,
}

impl OrgEntity for Agent {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_id
    }

    fn sentinel() -> Self {
        Self {
            id: EntityId::all(),
            display_id: "All".to_string(),
            first_name: None,
            last_name: None,
            group_id: EntityId::all(),
        }
    }
}

/// Groups, teams and agents visible to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgHierarchy {
    /// Groups
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Teams
    #[serde(default)]
    pub teams: Vec<Team>,
    /// Agents
    #[serde(default)]
    pub agents: Vec<Agent>,
}

impl OrgHierarchy {
    /// Whether the hierarchy has been fetched
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !(self.groups.is_empty() && self.teams.is_empty() && self.agents.is_empty())
    }
}

/// A named saved filter as listed by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilterSummary {
    /// Lookup key
    #[serde(deserialize_with = "lenient::text")]
    pub key: String,
    /// Display name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
}

/// Start of a contact, as epoch milliseconds or an RFC 3339 string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartTime {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// RFC 3339 timestamp
    Text(String),
}

impl StartTime {
    /// The instant in UTC, if it can be interpreted
    #[must_use]
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(millis) => DateTime::from_timestamp_millis(*millis),
            Self::Text(text) => text
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .or_else(|| {
                    DateTime::parse_from_rfc3339(text.trim())
                        .ok()
                        .map(|dt| dt.with_timezone(&Utc))
                }),
        }
    }
}

/// Agent reference embedded in a contact record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRef {
    /// First name
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: String,
    /// Last name
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: String,
}

/// Group or team reference embedded in a contact record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
}

/// A contact record as returned by the contact query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
    /// Contact id
    #[serde(default)]
    pub id: EntityId,
    /// Evaluation state id
    #[serde(default, deserialize_with = "lenient::optional_signed")]
    pub eval_state_id: Option<i64>,
    /// Contact start
    #[serde(default)]
    pub start_time: Option<StartTime>,
    /// Call duration in milliseconds
    #[serde(default, deserialize_with = "lenient::signed_or_zero")]
    pub call_duration: i64,
    /// Handling agent
    #[serde(default)]
    pub agent: Option<AgentRef>,
    /// Agent's group
    #[serde(default)]
    pub group: Option<NamedRef>,
    /// Agent's team
    #[serde(default)]
    pub team: Option<NamedRef>,
    /// Calling number
    #[serde(default, deserialize_with = "lenient::text")]
    pub ani: String,
    /// Dialed number
    #[serde(default, deserialize_with = "lenient::text")]
    pub dnis: String,
    /// Time zone of the contact
    #[serde(default, deserialize_with = "lenient::text")]
    pub tz: String,
}

/// Display-ready result row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRow {
    /// Evaluation state label
    pub state: String,
    /// Contact id
    pub id: EntityId,
    /// Agent first name
    pub first_name: String,
    /// Agent last name
    pub last_name: String,
    /// Group name
    pub group: String,
    /// Team name
    pub team: String,
    /// Calling number
    pub ani: String,
    /// Dialed number
    pub dnis: String,
    /// Local date of the contact
    pub date: String,
    /// Local time of the contact
    pub time: String,
    /// Time zone of the contact
    pub tz: String,
    /// Call duration as `HH:MM:SS`
    pub call_duration: String,
}

#[cfg(test)]
#[allow(
    clippy::unreadable_literal,
    clippy::missing_panics_doc,
    clippy::unwrap_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_from_number_and_string_compare_equal() {
        let from_number: EntityId = serde_json::from_value(json!(7)).unwrap();
        let from_text: EntityId = serde_json::from_value(json!("7")).unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(from_number.as_str(), "7");
    }

    #[test]
    fn test_entity_id_null_is_sentinel() {
        let id: EntityId = serde_json::from_value(json!(null)).unwrap();
        assert!(id.is_all());
        assert_eq!(serde_json::to_value(EntityId::from(12u64)).unwrap(), json!("12"));
    }

    #[test]
    fn test_eval_state_ids_follow_display_order() {
        for (position, state) in EvalState::ALL.iter().enumerate() {
            assert_eq!(state.id(), i64::try_from(position).unwrap());
            assert_eq!(EvalState::from_id(state.id()), Some(*state));
        }
        assert_eq!(EvalState::from_id(2).unwrap().label(), "In Progress");
        assert_eq!(EvalState::from_id(6), None);
        assert_eq!(EvalState::from_id(-1), None);
    }

    #[test]
    fn test_keyed_enum_round_trip() {
        assert_eq!(
            "date_range_in_the_past_week".parse::<DateRange>().unwrap(),
            DateRange::PastWeek
        );
        assert_eq!(SearchScope::MyCalibrations.label(), "My Pending Calibrations");
        assert_eq!(
            serde_json::to_value(EvalState::NeedsApproval).unwrap(),
            json!("needs_approval")
        );
        let err = "date_range_forever".parse::<DateRange>().unwrap_err();
        assert_eq!(err.to_string(), "unknown date range key: date_range_forever");
    }

    #[test]
    fn test_criteria_wire_names() {
        let criteria = FilterCriteria {
            date_range: Some(DateRange::Today),
            duration_seconds: Some(30),
            evaluator_last_name: Some("Smith".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(
            serde_json::to_value(&criteria).unwrap(),
            json!({
                "range": "date_range_today",
                "durationInSeconds": 30,
                "evaluatorLastName": "Smith"
            })
        );
    }

    #[test]
    fn test_criteria_lenient_decoding() {
        let criteria: FilterCriteria = serde_json::from_value(json!({
            "contactId": "42",
            "range": "",
            "phoneNumber": "  ",
            "group": 17,
            "team": "",
            "durationInSeconds": "30",
            "name": "ignored extra field"
        }))
        .unwrap();

        assert_eq!(criteria.contact_id, Some(42));
        assert_eq!(criteria.date_range, None);
        assert_eq!(criteria.phone_number, None);
        assert_eq!(criteria.group, Some(EntityId::from("17")));
        assert_eq!(criteria.team, None);
        assert_eq!(criteria.duration_seconds, Some(30));
    }

    #[test]
    fn test_criteria_drops_unknown_keys() {
        let criteria: FilterCriteria = serde_json::from_value(json!({
            "range": "someday",
            "searchScope": "everything",
            "evalState": "archived",
            "phoneNumber": "5551234"
        }))
        .unwrap();
        assert_eq!(criteria.date_range, None);
        assert_eq!(criteria.search_scope, None);
        assert_eq!(criteria.eval_state, None);
        assert_eq!(criteria.phone_number.as_deref(), Some("5551234"));

        let known: FilterCriteria =
            serde_json::from_value(json!({"range": "date_range_yesterday"})).unwrap();
        assert_eq!(known.date_range, Some(DateRange::Yesterday));
    }

    #[test]
    fn test_base_selector_prefers_positive_contact_id() {
        let mut criteria = FilterCriteria {
            contact_id: Some(42),
            date_range: Some(DateRange::Yesterday),
            ..FilterCriteria::default()
        };
        assert_eq!(criteria.base_selector(), Some(BaseSelector::ContactId(42)));

        criteria.contact_id = Some(0);
        assert_eq!(
            criteria.base_selector(),
            Some(BaseSelector::Range(DateRange::Yesterday))
        );

        criteria.date_range = None;
        assert_eq!(criteria.base_selector(), None);
    }

    #[test]
    fn test_persisted_keeps_only_governing_selector() {
        let criteria = FilterCriteria {
            contact_id: Some(42),
            date_range: Some(DateRange::Today),
            group: Some(EntityId::all()),
            phone_number: Some(String::new()),
            ..FilterCriteria::default()
        };
        assert_eq!(
            criteria.persisted(),
            FilterCriteria {
                contact_id: Some(42),
                ..FilterCriteria::default()
            }
        );

        let by_range = FilterCriteria {
            contact_id: Some(0),
            date_range: Some(DateRange::Today),
            ..FilterCriteria::default()
        };
        assert_eq!(
            by_range.persisted(),
            FilterCriteria {
                date_range: Some(DateRange::Today),
                ..FilterCriteria::default()
            }
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(FilterCriteria::default().is_empty());
        assert!(
            FilterCriteria {
                team: Some(EntityId::all()),
                ..FilterCriteria::default()
            }
            .is_empty()
        );
        assert!(
            !FilterCriteria {
                eval_state: Some(EvalState::Scored),
                ..FilterCriteria::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_raw_contact_decoding() {
        let contact: RawContact = serde_json::from_value(json!({
            "id": 1001,
            "evalStateId": 2,
            "startTime": 1710512730000i64,
            "callDuration": 3661000,
            "agent": {"firstName": "Ada", "lastName": "Lovelace"},
            "group": {"name": "Support"},
            "team": {"name": "Tier 1"},
            "ani": "5551234",
            "dnis": "8000",
            "tz": "America/Chicago"
        }))
        .unwrap();

        assert_eq!(contact.id.as_str(), "1001");
        assert_eq!(contact.eval_state_id, Some(2));
        assert_eq!(contact.call_duration, 3_661_000);
        assert_eq!(contact.agent.unwrap().last_name, "Lovelace");
        assert_eq!(
            contact.start_time.unwrap().to_utc().unwrap().timestamp_millis(),
            1710512730000
        );
    }

    #[test]
    fn test_raw_contact_null_duration_is_zero() {
        let contact: RawContact =
            serde_json::from_value(json!({"id": 7, "evalStateId": 1, "callDuration": null}))
                .unwrap();
        assert_eq!(contact.call_duration, 0);
        assert_eq!(contact.eval_state_id, Some(1));
    }

    #[test]
    fn test_raw_contact_numeric_text_fields() {
        let contact: RawContact = serde_json::from_value(json!({
            "id": "7",
            "evalStateId": "2",
            "callDuration": "1500.9"
        }))
        .unwrap();
        assert_eq!(contact.eval_state_id, Some(2));
        assert_eq!(contact.call_duration, 1500);

        let unreadable: RawContact =
            serde_json::from_value(json!({"evalStateId": "n/a", "callDuration": "soon"})).unwrap();
        assert_eq!(unreadable.eval_state_id, None);
        assert_eq!(unreadable.call_duration, 0);
    }

    #[test]
    fn test_start_time_text_forms() {
        let rfc = StartTime::Text("2024-03-15T14:25:30Z".to_string());
        assert_eq!(rfc.to_utc().unwrap().timestamp(), 1710512730);
        let millis_text = StartTime::Text("1710512730000".to_string());
        assert_eq!(millis_text.to_utc().unwrap().timestamp(), 1710512730);
        assert!(StartTime::Text("yesterday".to_string()).to_utc().is_none());
    }

    #[test]
    fn test_org_sentinels() {
        assert!(Group::sentinel().id.is_all());
        assert_eq!(Team::sentinel().display_name(), "All");
        assert_eq!(Agent::sentinel().display_name(), "All");
        assert!(!OrgHierarchy::default().is_loaded());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number(" 30.9 "), Some(30));
        assert_eq!(parse_number("-5"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
    }

    proptest! {
        #[test]
        fn test_persisted_is_idempotent(
            contact_id in proptest::option::of(0u64..1000),
            range_index in proptest::option::of(0usize..5),
            phone in proptest::option::of("[0-9 ]{0,8}"),
            duration in proptest::option::of(0u64..7200),
        ) {
            let criteria = FilterCriteria {
                contact_id,
                date_range: range_index.map(|i| DateRange::ALL[i]),
                phone_number: phone,
                duration_seconds: duration,
                ..FilterCriteria::default()
            };
            let once = criteria.persisted();
            prop_assert_eq!(once.persisted(), once.clone());

            let json = serde_json::to_value(&once).unwrap();
            let back: FilterCriteria = serde_json::from_value(json).unwrap();
            prop_assert_eq!(back, once);
        }
    }
}
