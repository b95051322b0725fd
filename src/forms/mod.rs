//! Form-data extraction — turns a forms-provider answer payload into a flat
//! `Submission`.

pub mod answers;
pub mod extract;
pub mod submission;

pub use answers::{AnswerValue, RawAnswerSet, question_key};
pub use extract::{extract_submission, submission_from_form_response};
pub use submission::{FieldValue, Submission, SubmissionField};
