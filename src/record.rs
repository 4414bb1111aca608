//! Captured question/answer records.

use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint;
use crate::types::Fingerprint;

/// A captured question and its correct answer letters.
///
/// `question` is the prompt followed by the lettered choices, one per line
/// (`"A. ..."`). `answer` lists the correct letters in page order joined by
/// commas (`"A,C"`), or is empty when the page marks none.
///
/// Records are never edited after capture; a collection keeps the first
/// record seen for each fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Prompt and enumerated choices.
    pub question: String,

    /// Comma-joined correct letters.
    pub answer: String,
}

impl Record {
    /// Creates a record from its two fields.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Returns the dedup key of this record (derived from `question` only).
    #[inline]
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.question)
    }

    /// Returns the correct letters as a list.
    pub fn answer_letters(&self) -> Vec<&str> {
        if self.answer.is_empty() {
            Vec::new()
        } else {
            self.answer.split(',').collect()
        }
    }
}

/// Outcome of [`QuizVault::capture`](crate::QuizVault::capture).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    /// Fingerprint the record was filed under.
    pub fingerprint: Fingerprint,

    /// False when the collection already held this fingerprint.
    pub inserted: bool,
}
