//! Form-data extraction: `RawAnswerSet` → `Submission`.

use serde::Deserialize;
use tracing::{debug, warn};

use super::answers::{AnswerValue, RawAnswerSet};
use super::submission::{FieldValue, Submission, SubmissionField};

/// Question key → submission fields it populates.
pub const QUESTION_FIELDS: &[(&str, &[SubmissionField])] = &[
    (
        "event_name",
        &[SubmissionField::TaskName, SubmissionField::EventName],
    ),
    ("email", &[SubmissionField::Email]),
    ("event_address", &[SubmissionField::EventAddress]),
    ("event_timing", &[SubmissionField::EventTiming]),
    ("event_type", &[SubmissionField::EventType]),
    ("organization", &[SubmissionField::Organization]),
    ("what_days_will_you_attend", &[SubmissionField::DaysToAttend]),
    ("dietary_restrictions", &[SubmissionField::DietaryRestrictions]),
    (
        "i_understand_that_i_will_have_to_pay_10_upon_arrival",
        &[SubmissionField::Acknowledgement],
    ),
];

fn fields_for(key: &str) -> Option<&'static [SubmissionField]> {
    QUESTION_FIELDS
        .iter()
        .find(|(question, _)| *question == key)
        .map(|(_, fields)| *fields)
}

/// Collapse an answer into the value a submission field stores.
pub fn answer_to_field_value(answer: &AnswerValue) -> FieldValue {
    match answer {
        AnswerValue::Text(s) | AnswerValue::Email(s) => FieldValue::Text(s.clone()),
        AnswerValue::Choice(choices) => match choices.as_slice() {
            [] => FieldValue::default(),
            [only] => FieldValue::Text(only.clone()),
            many => FieldValue::List(many.to_vec()),
        },
    }
}

/// Map every known question onto the submission. Unknown questions are
/// logged and ignored; this never fails.
pub fn extract_submission(answers: &RawAnswerSet) -> Submission {
    let mut submission = Submission::default();

    for (key, answer) in answers.iter() {
        let Some(fields) = fields_for(key) else {
            debug!(question = %key, "Ignoring unmapped question");
            continue;
        };
        let value = answer_to_field_value(answer);
        for field in fields {
            submission.set(*field, value.clone());
        }
    }

    debug!(task_name = %submission.task_name, "Extracted submission");
    submission
}

/// Producer metadata carried next to the answers. Logged, not forwarded.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormResponseMeta {
    pub response_id: Option<String>,
    pub form_id: Option<String>,
    pub form_title: Option<String>,
    pub create_time: Option<String>,
}

/// Read a webhook's `formResponse` object.
///
/// With an `answers` object, the answers are decoded and extracted. Without
/// one, the response is taken to be an already-flat submission.
pub fn submission_from_form_response(form_response: &serde_json::Value) -> Submission {
    let meta = FormResponseMeta::deserialize(form_response).unwrap_or_default();
    debug!(
        response_id = meta.response_id.as_deref().unwrap_or("-"),
        form_id = meta.form_id.as_deref().unwrap_or("-"),
        form_title = meta.form_title.as_deref().unwrap_or("-"),
        create_time = meta.create_time.as_deref().unwrap_or("-"),
        "Reading form response"
    );

    match form_response.get("answers").and_then(|a| a.as_object()) {
        Some(answers) => extract_submission(&RawAnswerSet::from_json(answers)),
        None => Submission::deserialize(form_response).unwrap_or_else(|e| {
            warn!(error = %e, "formResponse has no answers and is not a flat submission");
            Submission::default()
        }),
    }
}
