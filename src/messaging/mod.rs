//! Message contract between the controller and the page context.
//!
//! The page context (where the question is rendered) and the controller
//! (where storage and UI live) run apart and only exchange JSON messages.
//!
//! ```text
//! ┌──────────────┐  Request (JSON)   ┌──────────────┐
//! │  Controller  │ ────────────────▶ │  PageAgent   │──▶ PageSource
//! │              │                   │              │
//! │ PageTransport│ ◀──────────────── │  extract +   │──▶ Navigator
//! └──────────────┘  Response (JSON)  │  fingerprint │
//!                                    └──────────────┘
//! ```
//!
//! | action               | reply                                     |
//! |----------------------|-------------------------------------------|
//! | `getTempData`        | `null` or `{hash, question, answer}`      |
//! | `getCurrentQuestion` | `{question: "Question #: N" \| null}`     |
//! | `nextQuestion`       | `{navigated: bool}`                       |
//! | `getDiscussionLinks` | `[{text, href}, ...]`                     |

mod agent;
mod protocol;
mod transport;

pub use agent::{search_url, Navigator, PageAgent, PageSource, RecordingNavigator, StaticPage};
pub use protocol::{CurrentQuestion, NavigationAck, Request, Response, TempData};
pub use transport::{LocalTransport, PageTransport};
