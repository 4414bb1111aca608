//! Plain-text export of a collection.
//!
//! Each record becomes one block; a line of dashes separates its two fields
//! and a line of equals signs closes it:
//!
//! ```text
//! Q1
//! A. x
//! B. y
//! -------------------
//! A
//! ===================
//! ```
//!
//! Lines are joined with `\n` and the output has no trailing newline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::Record;
use crate::types::Fingerprint;

/// Separator between the two fields of a record.
pub const FIELD_SEPARATOR: &str = "-------------------";

/// Separator after each record.
pub const RECORD_SEPARATOR: &str = "===================";

/// Which field is written first in each block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportOrder {
    /// Question, then answer.
    #[default]
    QuestionFirst,

    /// Answer, then question (flashcard-style import).
    AnswerFirst,
}

/// Renders records as export text, in fingerprint order.
pub fn render_text(records: &BTreeMap<Fingerprint, Record>, order: ExportOrder) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(records.len() * 4);
    for record in records.values() {
        let (first, second) = match order {
            ExportOrder::QuestionFirst => (&record.question, &record.answer),
            ExportOrder::AnswerFirst => (&record.answer, &record.question),
        };
        lines.push(first);
        lines.push(FIELD_SEPARATOR);
        lines.push(second);
        lines.push(RECORD_SEPARATOR);
    }
    lines.join("\n")
}

/// Returns the export file name for a collection (`<name>.txt`).
///
/// Path separators in the name are replaced so the file always lands in the
/// target directory.
pub fn export_file_name(collection: &str) -> String {
    let safe: String = collection
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.txt", safe)
}

/// Writes rendered text to `<dir>/<collection>.txt`.
pub(crate) fn write_text(dir: &Path, collection: &str, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(collection));
    fs::write(&path, text)?;
    Ok(path)
}
