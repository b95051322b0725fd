//! Normalized submission record shared by the extractor and the column mapper.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// A field value after extraction: a single string, a multi-choice list, or a
/// boolean sent directly by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl FieldValue {
    /// Empty string and empty list count as "not answered". A flag is always
    /// an answer, even `false`.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flag(_) => false,
            Self::Text(s) => s.is_empty(),
            Self::List(v) => v.is_empty(),
        }
    }

    /// Checkbox truthiness: `"Yes"`, `"true"`, `true`, or any non-empty list.
    pub fn is_affirmative(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => s == "Yes" || s == "true",
            Self::List(v) => !v.is_empty(),
        }
    }

    /// Single-string rendering. Lists are joined with `", "`.
    pub fn as_text(&self) -> String {
        match self {
            Self::Flag(b) => b.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(v) => v.join(", "),
        }
    }

    /// Multi-label rendering. A comma-separated string is split and trimmed,
    /// so `"Mon, Tue"` and `["Mon", "Tue"]` produce the same labels.
    pub fn to_labels(&self) -> Vec<String> {
        match self {
            Self::List(v) => v.clone(),
            Self::Text(s) if s.contains(',') => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            Self::Text(s) => vec![s.clone()],
            Self::Flag(b) => vec![b.to_string()],
        }
    }
}

/// Semantic fields of a submission. Both the question table and the column
/// table are expressed in terms of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionField {
    TaskName,
    Email,
    EventName,
    EventAddress,
    EventTiming,
    EventType,
    Organization,
    DaysToAttend,
    DietaryRestrictions,
    Acknowledgement,
}

/// One normalized form response, ready for column mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    #[serde(deserialize_with = "null_as_default")]
    pub task_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_timing: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub organization: String,
    #[serde(deserialize_with = "null_as_default")]
    pub days_to_attend: FieldValue,
    #[serde(deserialize_with = "null_as_default")]
    pub dietary_restrictions: String,
    #[serde(deserialize_with = "null_as_default")]
    pub acknowledgement: FieldValue,
}

/// Callers send `null` for unanswered fields; read it as the empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Submission {
    /// Read a field as a `FieldValue`.
    pub fn value(&self, field: SubmissionField) -> FieldValue {
        match field {
            SubmissionField::TaskName => FieldValue::Text(self.task_name.clone()),
            SubmissionField::Email => FieldValue::Text(self.email.clone()),
            SubmissionField::EventName => FieldValue::Text(self.event_name.clone()),
            SubmissionField::EventAddress => FieldValue::Text(self.event_address.clone()),
            SubmissionField::EventTiming => FieldValue::Text(self.event_timing.clone()),
            SubmissionField::EventType => FieldValue::Text(self.event_type.clone()),
            SubmissionField::Organization => FieldValue::Text(self.organization.clone()),
            SubmissionField::DaysToAttend => self.days_to_attend.clone(),
            SubmissionField::DietaryRestrictions => {
                FieldValue::Text(self.dietary_restrictions.clone())
            }
            SubmissionField::Acknowledgement => self.acknowledgement.clone(),
        }
    }

    /// Store a value. Scalar fields take the text rendering; the two
    /// multi-valued fields keep the value as-is.
    pub fn set(&mut self, field: SubmissionField, value: FieldValue) {
        match field {
            SubmissionField::TaskName => self.task_name = value.as_text(),
            SubmissionField::Email => self.email = value.as_text(),
            SubmissionField::EventName => self.event_name = value.as_text(),
            SubmissionField::EventAddress => self.event_address = value.as_text(),
            SubmissionField::EventTiming => self.event_timing = value.as_text(),
            SubmissionField::EventType => self.event_type = value.as_text(),
            SubmissionField::Organization => self.organization = value.as_text(),
            SubmissionField::DaysToAttend => self.days_to_attend = value,
            SubmissionField::DietaryRestrictions => self.dietary_restrictions = value.as_text(),
            SubmissionField::Acknowledgement => self.acknowledgement = value,
        }
    }

    /// A submission is only forwarded when it names the item to create.
    pub fn ensure_task_name(&self) -> Result<(), ValidationError> {
        if self.task_name.trim().is_empty() {
            return Err(ValidationError::MissingTaskName);
        }
        Ok(())
    }
}
