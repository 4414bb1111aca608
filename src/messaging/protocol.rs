//! Wire form of the messages exchanged with the page context.

use serde::{Deserialize, Serialize};

use crate::error::{DeliveryError, Result, StorageError};
use crate::extract::{parse_question_number, DiscussionLink};
use crate::record::Record;
use crate::types::Fingerprint;

/// A request sent from the controller to the page context.
///
/// Serialized as a JSON object tagged by `action`:
///
/// ```text
/// {"action":"getTempData"}
/// {"action":"getCurrentQuestion"}
/// {"action":"nextQuestion","searchKey":"SAA-C03 question 12 discussion"}
/// {"action":"getDiscussionLinks"}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Extract the record on the current page.
    GetTempData,

    /// Read the question number from the page header.
    GetCurrentQuestion,

    /// Navigate to a web search for `search_key`.
    NextQuestion {
        /// Search terms, without the site restriction.
        #[serde(rename = "searchKey")]
        search_key: String,
    },

    /// List the discussion links on the page.
    GetDiscussionLinks,
}

impl Request {
    /// Returns the `action` tag of this request.
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetTempData => "getTempData",
            Self::GetCurrentQuestion => "getCurrentQuestion",
            Self::NextQuestion { .. } => "nextQuestion",
            Self::GetDiscussionLinks => "getDiscussionLinks",
        }
    }

    /// Encodes the request as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self).map_err(StorageError::from)?)
    }

    /// Decodes a request received by the page context.
    pub fn from_json(json: &str) -> std::result::Result<Self, DeliveryError> {
        serde_json::from_str(json).map_err(|e| DeliveryError::malformed("request", e))
    }

    /// Decodes the JSON reply to this request.
    pub fn decode_reply(&self, json: &str) -> std::result::Result<Response, DeliveryError> {
        let action = self.action();
        let decoded = match self {
            Self::GetTempData => serde_json::from_str(json).map(Response::TempData),
            Self::GetCurrentQuestion => serde_json::from_str(json).map(Response::CurrentQuestion),
            Self::NextQuestion { .. } => serde_json::from_str(json).map(Response::Navigation),
            Self::GetDiscussionLinks => serde_json::from_str(json).map(Response::DiscussionLinks),
        };
        decoded.map_err(|e| DeliveryError::malformed(action, e))
    }
}

/// The record on the current page, as the page context reports it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempData {
    /// Fingerprint of `question`, computed page-side.
    pub hash: Fingerprint,

    /// Prompt and enumerated choices.
    pub question: String,

    /// Comma-joined correct letters.
    pub answer: String,
}

impl TempData {
    /// Builds the reply for an extracted record.
    pub fn from_record(record: Record) -> Self {
        Self {
            hash: record.fingerprint(),
            question: record.question,
            answer: record.answer,
        }
    }

    /// Splits the reply into its fingerprint and record.
    pub fn into_parts(self) -> (Fingerprint, Record) {
        (self.hash, Record::new(self.question, self.answer))
    }
}

/// Reply to [`Request::GetCurrentQuestion`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentQuestion {
    /// `"Question #: N"`, or `None` when the header is missing.
    pub question: Option<String>,
}

impl CurrentQuestion {
    /// Returns the parsed question number.
    pub fn number(&self) -> Option<u64> {
        self.question.as_deref().and_then(parse_question_number)
    }
}

/// Reply to [`Request::NextQuestion`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationAck {
    /// Whether the page accepted the navigation.
    pub navigated: bool,
}

/// A decoded reply; the variant always matches the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// `null` when the page holds no question.
    TempData(Option<TempData>),

    /// Question header label.
    CurrentQuestion(CurrentQuestion),

    /// Navigation acknowledgment.
    Navigation(NavigationAck),

    /// Discussion links on the page.
    DiscussionLinks(Vec<DiscussionLink>),
}

impl Response {
    /// Encodes the reply body as JSON (without a tag).
    pub fn to_json(&self) -> Result<String> {
        let json = match self {
            Self::TempData(data) => serde_json::to_string(data),
            Self::CurrentQuestion(current) => serde_json::to_string(current),
            Self::Navigation(ack) => serde_json::to_string(ack),
            Self::DiscussionLinks(links) => serde_json::to_string(links),
        };
        Ok(json.map_err(StorageError::from)?)
    }

    /// Unwraps a [`Response::TempData`] reply.
    pub fn into_temp_data(self) -> std::result::Result<Option<TempData>, DeliveryError> {
        match self {
            Self::TempData(data) => Ok(data),
            _ => Err(DeliveryError::UnexpectedReply("getTempData")),
        }
    }

    /// Unwraps a [`Response::CurrentQuestion`] reply.
    pub fn into_current_question(self) -> std::result::Result<CurrentQuestion, DeliveryError> {
        match self {
            Self::CurrentQuestion(current) => Ok(current),
            _ => Err(DeliveryError::UnexpectedReply("getCurrentQuestion")),
        }
    }

    /// Unwraps a [`Response::Navigation`] reply.
    pub fn into_navigation(self) -> std::result::Result<NavigationAck, DeliveryError> {
        match self {
            Self::Navigation(ack) => Ok(ack),
            _ => Err(DeliveryError::UnexpectedReply("nextQuestion")),
        }
    }

    /// Unwraps a [`Response::DiscussionLinks`] reply.
    pub fn into_discussion_links(self) -> std::result::Result<Vec<DiscussionLink>, DeliveryError> {
        match self {
            Self::DiscussionLinks(links) => Ok(links),
            _ => Err(DeliveryError::UnexpectedReply("getDiscussionLinks")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_form() {
        assert_eq!(
            Request::GetTempData.to_json().unwrap(),
            r#"{"action":"getTempData"}"#
        );
        assert_eq!(
            Request::NextQuestion {
                search_key: "exam question 2 discussion".into()
            }
            .to_json()
            .unwrap(),
            r#"{"action":"nextQuestion","searchKey":"exam question 2 discussion"}"#
        );
    }

    #[test]
    fn test_request_from_browser_json() {
        let request = Request::from_json(r#"{"action":"getCurrentQuestion"}"#).unwrap();
        assert_eq!(request, Request::GetCurrentQuestion);

        let err = Request::from_json(r#"{"action":"reloadPage"}"#).unwrap_err();
        assert!(matches!(err, DeliveryError::Malformed { .. }));
    }

    #[test]
    fn test_decode_temp_data_null() {
        let reply = Request::GetTempData.decode_reply("null").unwrap();
        assert_eq!(reply, Response::TempData(None));
    }

    #[test]
    fn test_decode_temp_data() {
        let reply = Request::GetTempData
            .decode_reply(r#"{"hash":"33e8c3c0","question":"Q1\nA. x\nB. y","answer":"A"}"#)
            .unwrap();
        let data = reply.into_temp_data().unwrap().unwrap();
        let (fingerprint, record) = data.into_parts();
        assert_eq!(fingerprint.as_str(), "33e8c3c0");
        assert_eq!(record, Record::new("Q1\nA. x\nB. y", "A"));
    }

    #[test]
    fn test_decode_current_question() {
        let reply = Request::GetCurrentQuestion
            .decode_reply(r#"{"question":"Question #: 42"}"#)
            .unwrap();
        let current = reply.into_current_question().unwrap();
        assert_eq!(current.number(), Some(42));

        let reply = Request::GetCurrentQuestion
            .decode_reply(r#"{"question":null}"#)
            .unwrap();
        assert_eq!(reply.into_current_question().unwrap().number(), None);
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        let err = Request::GetTempData.decode_reply("{\"hash\":1}").unwrap_err();
        match err {
            DeliveryError::Malformed { action, .. } => assert_eq!(action, "getTempData"),
            other => panic!("Expected Malformed, got: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_variant_is_unexpected() {
        let reply = Response::Navigation(NavigationAck { navigated: true });
        assert!(matches!(
            reply.into_temp_data(),
            Err(DeliveryError::UnexpectedReply("getTempData"))
        ));
    }
}
