//! Core domain types for the Gearfit system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Equipment identifiers and the canonical equipment set
//! - Training locations and raw equipment sources
//! - Questions, options and recorded answers
//! - Exercises and their equipment requirement

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Flat, case-sensitive equipment identifier (e.g. `"dumbbells"`)
pub type EquipmentId = String;

/// Requirement sentinel meaning "no equipment needed"
pub const NONE_SENTINEL: &str = "none";

/// Requirement sentinel meaning "bodyweight only"
pub const BODYWEIGHT_SENTINEL: &str = "bodyweight";

// ============================================================================
// Locations
// ============================================================================

/// Answer to the "where do you train" question
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrainingLocation {
    Home,
    Gym,
    Outdoor,
}

impl TrainingLocation {
    /// Parse a location option id, returning None for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "home" => Some(TrainingLocation::Home),
            "gym" => Some(TrainingLocation::Gym),
            "outdoor" | "outdoors" => Some(TrainingLocation::Outdoor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingLocation::Home => "home",
            TrainingLocation::Gym => "gym",
            TrainingLocation::Outdoor => "outdoor",
        }
    }
}

/// Stored `workout_location` value that selects one location-scoped list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkoutLocation {
    Gym,
    HomeEquipment,
    HomeBodyweight,
}

impl WorkoutLocation {
    /// Parse a stored `workout_location`; unknown values yield None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gym" => Some(WorkoutLocation::Gym),
            "home_equipment" => Some(WorkoutLocation::HomeEquipment),
            "home_bodyweight" => Some(WorkoutLocation::HomeBodyweight),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutLocation::Gym => "gym",
            WorkoutLocation::HomeEquipment => "home_equipment",
            WorkoutLocation::HomeBodyweight => "home_bodyweight",
        }
    }
}

// ============================================================================
// Questions and Answers
// ============================================================================

/// Extra data attached to an option
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionMetadata {
    /// Equipment implied by choosing the option
    #[serde(
        default,
        deserialize_with = "lenient_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub equipment: Option<Vec<EquipmentId>>,
}

impl OptionMetadata {
    pub fn with_equipment<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EquipmentId>,
    {
        Self {
            equipment: Some(ids.into_iter().map(Into::into).collect()),
        }
    }
}

/// Whether a question accepts one or several options
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Single,
    Multiple,
}

/// A selectable answer to a question
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub metadata: Option<OptionMetadata>,
}

/// A questionnaire question
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub selection: SelectionKind,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Look up an option by id
    pub fn option(&self, id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

/// One option picked by the user, with the metadata it carried at the time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedOption {
    #[serde(default, deserialize_with = "lenient_text")]
    pub option_id: String,
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: Option<OptionMetadata>,
}

impl SelectedOption {
    /// Equipment implied by this selection (empty when metadata is absent)
    pub fn implied_equipment(&self) -> &[EquipmentId] {
        self.metadata
            .as_ref()
            .and_then(|m| m.equipment.as_deref())
            .unwrap_or(&[])
    }
}

impl From<&QuestionOption> for SelectedOption {
    fn from(option: &QuestionOption) -> Self {
        Self {
            option_id: option.id.clone(),
            metadata: option.metadata.clone(),
        }
    }
}

/// An answered question (single- or multi-select)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub question_id: String,
    #[serde(default, deserialize_with = "lenient_selected")]
    pub selected: Vec<SelectedOption>,
}

// ============================================================================
// Equipment Sources
// ============================================================================

/// Every equipment declaration that may exist on one user record.
///
/// Fields come from different schema generations and any of them may be
/// absent, empty or duplicated. Only the resolver reads them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEquipmentSources {
    /// Legacy flat list
    #[serde(
        default,
        deserialize_with = "lenient_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub equipment: Option<Vec<EquipmentId>>,

    #[serde(
        default,
        deserialize_with = "lenient_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub home_equipment: Option<Vec<EquipmentId>>,

    #[serde(
        default,
        deserialize_with = "lenient_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub gym_equipment: Option<Vec<EquipmentId>>,

    #[serde(
        default,
        deserialize_with = "lenient_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub bodyweight_equipment: Option<Vec<EquipmentId>>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub workout_location: Option<String>,

    /// Answers from the dynamic questionnaire
    #[serde(
        default,
        deserialize_with = "lenient_answers",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub answer_metadata: Vec<AnswerRecord>,
}

/// Deduplicated set of equipment available to a user
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct CanonicalEquipmentSet(BTreeSet<EquipmentId>);

impl CanonicalEquipmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<EquipmentId>) -> bool {
        self.0.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<EquipmentId>> FromIterator<S> for CanonicalEquipmentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<EquipmentId>> Extend<S> for CanonicalEquipmentSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

// ============================================================================
// Exercises
// ============================================================================

/// An exercise from the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub equipment_requirement: Option<EquipmentId>,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
}

/// Narrowed form of `Exercise::equipment_requirement`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquipmentRequirement<'a> {
    /// `"none"` or `"bodyweight"`: always eligible
    Unrestricted,
    /// A specific piece of equipment
    Needs(&'a str),
    /// Absent or blank requirement
    Malformed,
}

impl Exercise {
    pub fn new(id: &str, name: &str, requirement: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            equipment_requirement: Some(requirement.into()),
            muscle_groups: vec![],
        }
    }

    pub fn requirement(&self) -> EquipmentRequirement<'_> {
        match self.equipment_requirement.as_deref() {
            None => EquipmentRequirement::Malformed,
            Some(raw) if raw.trim().is_empty() => EquipmentRequirement::Malformed,
            Some(NONE_SENTINEL) | Some(BODYWEIGHT_SENTINEL) => EquipmentRequirement::Unrestricted,
            Some(raw) => EquipmentRequirement::Needs(raw),
        }
    }
}

/// Ordered list of exercises
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: Vec<Exercise>,
}

// ============================================================================
// Profile
// ============================================================================

/// Persisted equipment profile of the local user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient_uuid")]
    pub id: Uuid,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_sources")]
    pub sources: RawEquipmentSources,
}

// ============================================================================
// Lenient field parsing
// ============================================================================

// Wrongly-typed values become None instead of failing the whole record.

fn lenient_ids<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<EquipmentId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Objects in an array that parse as `T`; everything else is skipped
fn objects_of<T: serde::de::DeserializeOwned>(value: Option<Value>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn lenient_answers<'de, D>(deserializer: D) -> std::result::Result<Vec<AnswerRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(objects_of(Option::<Value>::deserialize(deserializer)?))
}

fn lenient_selected<'de, D>(deserializer: D) -> std::result::Result<Vec<SelectedOption>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(objects_of(Option::<Value>::deserialize(deserializer)?))
}

fn lenient_metadata<'de, D>(deserializer: D) -> std::result::Result<Option<OptionMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn lenient_sources<'de, D>(deserializer: D) -> std::result::Result<RawEquipmentSources, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => RawEquipmentSources::default(),
    })
}

fn lenient_uuid<'de, D>(deserializer: D) -> std::result::Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?
        .and_then(|s| Uuid::parse_str(&s).ok())
        .unwrap_or_else(Uuid::new_v4))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now))
}
