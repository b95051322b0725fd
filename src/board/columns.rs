//! Column mapping — `Submission` → column-value document for the board.
//!
//! The board schema lives in [`EVENT_BOARD_COLUMNS`]; remapping to a
//! different board is a change to that table only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::forms::{FieldValue, Submission, SubmissionField};

/// Column every new item's workflow state is written to.
pub const STATUS_COLUMN: &str = "status";

/// Workflow state of every newly created item.
pub const NEW_STATUS_LABEL: &str = "New";

/// Value shape a column type expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnShape {
    /// Plain string.
    Text,
    /// `{"email": ..., "text": ...}`
    Email,
    /// `{"label": ...}` (status/color columns).
    Label,
    /// `{"labels": [...]}` with comma-splitting of a single string.
    Dropdown,
    /// `{"labels": [...]}` holding exactly one label.
    DropdownSingle,
    /// `{"checked": "true"}` or `{}`.
    Checkbox,
}

impl ColumnShape {
    /// Build the column value, or `None` when the field is empty.
    pub fn build(self, value: &FieldValue) -> Option<Value> {
        if value.is_empty() {
            return None;
        }
        let built = match self {
            ColumnShape::Text => Value::String(value.as_text()),
            ColumnShape::Email => {
                let address = value.as_text();
                json!({ "email": address, "text": address })
            }
            ColumnShape::Label => json!({ "label": value.as_text() }),
            ColumnShape::Dropdown => {
                let labels = value.to_labels();
                if labels.is_empty() {
                    return None;
                }
                json!({ "labels": labels })
            }
            ColumnShape::DropdownSingle => json!({ "labels": [value.as_text()] }),
            ColumnShape::Checkbox => {
                if value.is_affirmative() {
                    json!({ "checked": "true" })
                } else {
                    json!({})
                }
            }
        };
        Some(built)
    }
}

/// One row of the board schema.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    pub field: SubmissionField,
    pub column_id: &'static str,
    pub shape: ColumnShape,
}

const fn column(field: SubmissionField, column_id: &'static str, shape: ColumnShape) -> ColumnMapping {
    ColumnMapping {
        field,
        column_id,
        shape,
    }
}

/// Columns of the event-registration board. The item name carries the event
/// name, so `EventName` has no column of its own.
pub const EVENT_BOARD_COLUMNS: &[ColumnMapping] = &[
    column(SubmissionField::Email, "email_col", ColumnShape::Email),
    column(SubmissionField::EventAddress, "text_addr", ColumnShape::Text),
    column(SubmissionField::EventTiming, "text_time", ColumnShape::Text),
    column(SubmissionField::EventType, "color_col", ColumnShape::Label),
    column(SubmissionField::Organization, "text_org", ColumnShape::Text),
    column(SubmissionField::DaysToAttend, "dropdown_days", ColumnShape::Dropdown),
    column(
        SubmissionField::DietaryRestrictions,
        "dropdown_diet",
        ColumnShape::DropdownSingle,
    ),
    column(SubmissionField::Acknowledgement, "boolean_col", ColumnShape::Checkbox),
];

/// Column id → column value. Keys are kept sorted so serialization is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnValues(BTreeMap<String, Value>);

impl ColumnValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column_id: impl Into<String>, value: Value) {
        self.0.insert(column_id.into(), value);
    }

    pub fn get(&self, column_id: &str) -> Option<&Value> {
        self.0.get(column_id)
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.0.contains_key(column_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The JSON string the board API expects for its `column_values` argument.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Map a submission through an arbitrary column table, then set the status.
pub fn map_with_table(table: &[ColumnMapping], submission: &Submission) -> ColumnValues {
    let mut columns = ColumnValues::new();
    for mapping in table {
        if let Some(value) = mapping.shape.build(&submission.value(mapping.field)) {
            columns.insert(mapping.column_id, value);
        }
    }
    columns.insert(STATUS_COLUMN, json!({ "label": NEW_STATUS_LABEL }));
    columns
}

/// Map a submission onto the event-registration board.
pub fn map_submission(submission: &Submission) -> ColumnValues {
    map_with_table(EVENT_BOARD_COLUMNS, submission)
}
