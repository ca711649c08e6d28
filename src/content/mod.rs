//! Content providers for practice items.
//!
//! Items come from one of two sources: the built-in static tables
//! (`decks`) or the Gemini generation client (`gemini`). The engine is
//! written against the `ContentSource` trait and does not care which.

pub mod decks;
pub mod gemini;

pub use decks::StaticContent;
pub use gemini::GeminiClient;

use crate::domain::{MistakeItem, QuizItem};

/// Error producing a generated practice item.
///
/// The engine treats every variant identically: the current item is left
/// untouched and the error is surfaced to the caller. None of these are
/// fatal to the session.
#[derive(Debug)]
pub enum GenerationError {
    /// Network, auth, or timeout failure reaching the model
    TransportFailure(String),
    /// Response text is not valid JSON after extraction
    MalformedResponse(String),
    /// Valid JSON, but required fields are missing, empty, or inconsistent
    SchemaViolation(String),
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::TransportFailure(e) => write!(f, "Transport failure: {}", e),
            GenerationError::MalformedResponse(e) => write!(f, "Malformed response: {}", e),
            GenerationError::SchemaViolation(e) => write!(f, "Schema violation: {}", e),
        }
    }
}

impl std::error::Error for GenerationError {}

/// A source of practice items and tutor answers.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// Produce one multiple-choice reading quiz item.
    async fn quiz_item(&self) -> Result<QuizItem, GenerationError>;

    /// Produce one find-the-mistake item.
    async fn mistake_item(&self) -> Result<MistakeItem, GenerationError>;

    /// Answer a free-form learner question in the tutor persona.
    async fn tutor_reply(&self, question: &str) -> Result<String, GenerationError>;
}

/// The configured provider: model-backed when an API key is present,
/// otherwise the built-in tables.
pub enum Provider {
    Static(StaticContent),
    Gemini(GeminiClient),
}

impl ContentSource for Provider {
    async fn quiz_item(&self) -> Result<QuizItem, GenerationError> {
        match self {
            Provider::Static(s) => s.quiz_item().await,
            Provider::Gemini(g) => g.quiz_item().await,
        }
    }

    async fn mistake_item(&self) -> Result<MistakeItem, GenerationError> {
        match self {
            Provider::Static(s) => s.mistake_item().await,
            Provider::Gemini(g) => g.mistake_item().await,
        }
    }

    async fn tutor_reply(&self, question: &str) -> Result<String, GenerationError> {
        match self {
            Provider::Static(s) => s.tutor_reply(question).await,
            Provider::Gemini(g) => g.tutor_reply(question).await,
        }
    }
}
