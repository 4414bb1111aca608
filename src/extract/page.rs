//! Abstraction over a rendered question page.
//!
//! The page context reads these values out of the DOM; everything after that
//! point works on plain data.

use serde::{Deserialize, Serialize};

/// What the currently rendered question page shows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Question prompt text, `None` when no question is displayed.
    pub prompt: Option<String>,

    /// Choices in document order.
    pub choices: Vec<Choice>,

    /// Text of the discussion header (e.g. `"Question #: 12 Topic 1"`).
    pub header: Option<String>,

    /// Links listed on discussion index pages.
    pub discussion_links: Vec<DiscussionLink>,
}

impl PageContent {
    /// Creates page content showing the given prompt.
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    /// Appends a choice (builder style).
    pub fn choice(mut self, letter: impl Into<String>, text: impl Into<String>) -> Self {
        self.choices.push(Choice::new(letter, text, false));
        self
    }

    /// Appends a choice marked as correct (builder style).
    pub fn correct_choice(mut self, letter: impl Into<String>, text: impl Into<String>) -> Self {
        self.choices.push(Choice::new(letter, text, true));
        self
    }

    /// Sets the discussion header text (builder style).
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

/// One lettered choice as rendered on the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Choice letter taken from the element's letter attribute.
    pub letter: String,

    /// Raw rendered text, which may still carry the `"A."` label and the
    /// "Most Voted" badge.
    pub text: String,

    /// Whether the page marks this choice as correct.
    pub correct: bool,
}

impl Choice {
    /// Creates a choice.
    pub fn new(letter: impl Into<String>, text: impl Into<String>, correct: bool) -> Self {
        Self {
            letter: letter.into(),
            text: text.into(),
            correct,
        }
    }
}

/// A discussion link scraped from an index page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionLink {
    /// Link text.
    pub text: String,

    /// Absolute link target.
    pub href: String,
}

impl DiscussionLink {
    /// Creates a link.
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}
