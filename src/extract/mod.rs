//! Record extraction from a rendered question page.
//!
//! Extraction is a pure function of [`PageContent`]: it never touches
//! storage. A page without a prompt yields `None`, which means "no question
//! displayed" rather than failure.
//!
//! # Normalization
//!
//! ```text
//! raw choice text      "A. Amazon S3 Most Voted"
//!   drop "A."      ->  " Amazon S3 Most Voted"  -> trim
//!   drop badge     ->  "Amazon S3 "             -> trim
//!   relabel        ->  "A. Amazon S3"
//! ```

mod page;

pub use page::{Choice, DiscussionLink, PageContent};

use crate::record::Record;

/// Badge the site appends to the community's favourite choice.
pub const MOST_VOTED_MARKER: &str = "Most Voted";

/// Prefix of the question number in the discussion header.
pub const QUESTION_NUMBER_PREFIX: &str = "Question #: ";

/// Extracts the displayed question as a [`Record`].
///
/// Returns `None` when the page shows no prompt.
///
/// # Example
/// ```
/// use quizvault::extract::{extract, PageContent};
///
/// let page = PageContent::with_prompt("  Pick one  ")
///     .choice("A", "A. first")
///     .correct_choice("B", "B. second Most Voted");
///
/// let record = extract(&page).unwrap();
/// assert_eq!(record.question, "Pick one\nA. first\nB. second");
/// assert_eq!(record.answer, "B");
/// ```
pub fn extract(page: &PageContent) -> Option<Record> {
    let prompt = page.prompt.as_deref()?.trim();

    let choices: Vec<String> = page
        .choices
        .iter()
        .map(|choice| normalize_choice(&choice.letter, &choice.text))
        .collect();

    let answer: Vec<&str> = page
        .choices
        .iter()
        .filter(|choice| choice.correct)
        .map(|choice| choice.letter.as_str())
        .collect();

    Some(Record {
        question: format!("{}\n{}", prompt, choices.join("\n")),
        answer: answer.join(","),
    })
}

/// Re-labels one choice as `"<letter>. <text>"`.
///
/// Only the first `"<letter>."` and the first [`MOST_VOTED_MARKER`] are
/// removed; text that mentions either later on is kept.
pub fn normalize_choice(letter: &str, raw: &str) -> String {
    let label = format!("{}.", letter);
    let text = raw.replacen(&label, "", 1);
    let text = text.trim().replacen(MOST_VOTED_MARKER, "", 1);
    format!("{}. {}", letter, text.trim())
}

/// Returns the question number shown in the discussion header.
pub fn current_question_number(page: &PageContent) -> Option<u64> {
    page.header.as_deref().and_then(parse_question_number)
}

/// Finds the first `"Question #: <digits>"` in `text` and parses the digits.
///
/// Returns `None` when no occurrence is followed by a digit, or when the
/// number does not fit in a `u64`.
pub fn parse_question_number(text: &str) -> Option<u64> {
    text.match_indices(QUESTION_NUMBER_PREFIX)
        .find_map(|(start, prefix)| {
            let rest = &text[start + prefix.len()..];
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            (end > 0).then(|| &rest[..end])
        })
        .and_then(|digits| digits.parse().ok())
}

/// Renders a question number the way the page reports it.
pub fn question_label(number: u64) -> String {
    format!("{}{}", QUESTION_NUMBER_PREFIX, number)
}

/// Returns the page's discussion links with surrounding whitespace removed.
pub fn discussion_links(page: &PageContent) -> Vec<DiscussionLink> {
    page.discussion_links
        .iter()
        .map(|link| DiscussionLink::new(link.text.trim(), link.href.as_str()))
        .collect()
}
