//! Inbound answer payloads — the wire shapes the forms provider posts, and the
//! tagged `AnswerValue` they are decoded into.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

/// Normalize a question title into the key used by the question table:
/// lowercase, runs of non-alphanumerics become one `_`, no leading or
/// trailing `_`.
///
/// `"What days will you attend?"` → `"what_days_will_you_attend"`.
pub fn question_key(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_ALNUM_RUN
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// One answer, tagged by question kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Email(String),
    /// Selected options in order. A single selection is a one-element list.
    Choice(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct WireEntry {
    #[serde(default)]
    value: serde_json::Value,
}

impl WireEntry {
    fn into_string(self) -> String {
        match self.value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireAnswerList {
    #[serde(default)]
    answers: Vec<WireEntry>,
}

/// Externally tagged: `{"textAnswers": {...}}`, `{"email": "..."}`,
/// `{"choiceQuestions": {...}}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum WireAnswer {
    TextAnswers(WireAnswerList),
    Email(String),
    ChoiceQuestions(WireAnswerList),
}

impl From<WireAnswer> for AnswerValue {
    fn from(wire: WireAnswer) -> Self {
        match wire {
            WireAnswer::TextAnswers(list) => AnswerValue::Text(
                list.answers
                    .into_iter()
                    .next()
                    .map(WireEntry::into_string)
                    .unwrap_or_default(),
            ),
            WireAnswer::Email(address) => AnswerValue::Email(address),
            WireAnswer::ChoiceQuestions(list) => AnswerValue::Choice(
                list.answers
                    .into_iter()
                    .map(WireEntry::into_string)
                    .collect(),
            ),
        }
    }
}

/// Answers keyed by normalized question key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAnswerSet {
    answers: BTreeMap<String, AnswerValue>,
}

impl RawAnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; the key is normalized.
    pub fn with(mut self, key: &str, value: AnswerValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: AnswerValue) {
        self.answers.insert(question_key(key), value);
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.get(key)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.answers.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Decode the `answers` object of a form response. Entries that match no
    /// known answer shape are skipped.
    pub fn from_json(answers: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut set = Self::new();
        for (key, raw) in answers {
            match WireAnswer::deserialize(raw) {
                Ok(wire) => set.insert(key, wire.into()),
                Err(e) => {
                    warn!(question = %key, error = %e, "Skipping answer with unrecognized shape");
                }
            }
        }
        set
    }
}
