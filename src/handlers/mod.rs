//! HTTP handlers: the presentation boundary.
//!
//! Every route reads the caller's session from a cookie, applies exactly one
//! engine operation, writes the session back, and returns the resulting view
//! model as JSON. Rendering is the client's job.

pub mod chat;
pub mod flashcard;
pub mod mistake;
pub mod quiz;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::config;
use crate::content::GenerationError;
use crate::domain::{PracticeMode, Score};
use crate::session;
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/", get(index))
    .route("/score", get(score))
    .route("/quiz", get(quiz::current))
    .route("/quiz/new", post(quiz::new_item))
    .route("/quiz/answer", post(quiz::answer))
    .route("/mistake", get(mistake::current))
    .route("/mistake/new", post(mistake::new_item))
    .route("/mistake/answer", post(mistake::answer))
    .route("/flashcard", get(flashcard::current))
    .route("/flashcard/flip", post(flashcard::flip))
    .route("/flashcard/next", post(flashcard::next))
    .route("/chat", get(chat::history).post(chat::ask))
    .route("/chat/clear", post(chat::clear))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Read the session ID from the cookie jar, minting one on first access.
pub(crate) fn session_cookie(jar: CookieJar) -> (CookieJar, String) {
  if let Some(cookie) = jar.get(config::SESSION_COOKIE_NAME) {
    let id = cookie.value().to_string();
    (jar, id)
  } else {
    let id = session::mint_session_id();
    let cookie = Cookie::build((config::SESSION_COOKIE_NAME, id.clone()))
      .path("/")
      .http_only(true)
      .build();
    (jar.add(cookie), id)
  }
}

/// Map a provider failure to a recoverable JSON error response.
///
/// None of these end the session: the previous item and the score are
/// intact, and the client simply offers a retry.
pub(crate) fn generation_error(e: GenerationError) -> Response {
  let kind = match &e {
    GenerationError::TransportFailure(_) => "transport",
    GenerationError::MalformedResponse(_) => "malformed",
    GenerationError::SchemaViolation(_) => "schema",
  };
  tracing::warn!("Content generation failed ({}): {}", kind, e);
  (
    StatusCode::BAD_GATEWAY,
    Json(json!({
      "error": e.to_string(),
      "kind": kind,
      "recoverable": true,
    })),
  )
    .into_response()
}

/// Response for a submit/view call made before any item was selected.
pub(crate) fn no_active_item() -> Response {
  (
    StatusCode::CONFLICT,
    Json(json!({
      "error": "no active item; request a new one first",
      "recoverable": true,
    })),
  )
    .into_response()
}

#[derive(serde::Serialize)]
struct ScoreView {
  correct: u32,
  total: u32,
  percent: Option<u32>,
}

impl From<Score> for ScoreView {
  fn from(score: Score) -> Self {
    Self {
      correct: score.correct,
      total: score.total,
      percent: score.percent(),
    }
  }
}

async fn index(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = session_cookie(jar);
  let session = state.sessions.load(&session_id);
  (
    jar,
    Json(json!({
      "app": "jp_notebook",
      "modes": [
        PracticeMode::Quiz.as_str(),
        PracticeMode::MistakeHunt.as_str(),
        PracticeMode::Flashcard.as_str(),
        "chat",
      ],
      "score": ScoreView::from(session.score()),
    })),
  )
}

async fn score(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = session_cookie(jar);
  let session = state.sessions.load(&session_id);
  (jar, Json(ScoreView::from(session.score())))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use axum_test::TestServer;
  use serde_json::Value;

  fn test_server() -> TestServer {
    test_server_with(AppState::with_static_content(AppConfig::load()))
  }

  fn test_server_with(state: AppState) -> TestServer {
    TestServer::builder()
      .save_cookies()
      .build(router(state))
      .unwrap()
  }

  #[tokio::test]
  async fn test_index_lists_modes_and_score() {
    let server = test_server();
    let body: Value = server.get("/").await.json();
    assert_eq!(body["score"]["total"], 0);
    assert!(body["modes"].as_array().unwrap().len() == 4);
  }

  #[tokio::test]
  async fn test_quiz_flow_new_answer_score() {
    let server = test_server();

    let quiz: Value = server.post("/quiz/new").await.json();
    let options = quiz["options"].as_array().unwrap();
    assert_eq!(options.len(), 4);
    assert_eq!(quiz["answered"], false);
    assert!(quiz["correct_reading"].is_null());

    let choice = options[0].as_str().unwrap();
    let graded: Value = server
      .post("/quiz/answer")
      .json(&serde_json::json!({ "choice": choice }))
      .await
      .json();
    assert_eq!(graded["answered"], true);
    assert!(!graded["correct_reading"].is_null());
    assert_eq!(graded["score"]["total"], 1);

    let score: Value = server.get("/score").await.json();
    assert_eq!(score["total"], 1);
  }

  #[tokio::test]
  async fn test_quiz_rerender_keeps_option_order() {
    let server = test_server();
    let quiz: Value = server.post("/quiz/new").await.json();
    let again: Value = server.get("/quiz").await.json();
    assert_eq!(quiz["options"], again["options"]);
  }

  #[tokio::test]
  async fn test_answer_without_item_is_conflict() {
    let server = test_server();
    let response = server
      .post("/quiz/answer")
      .json(&serde_json::json!({ "choice": "べんきょう" }))
      .await;
    response.assert_status(StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn test_mistake_flow_grades_trimmed_answer() {
    let server = test_server();

    let item: Value = server.post("/mistake/new").await.json();
    assert_eq!(item["answered"], false);
    assert!(item["mistake"].is_null());

    // an unmatchable answer grades incorrect but reveals the solution
    let graded: Value = server
      .post("/mistake/answer")
      .json(&serde_json::json!({ "answer": "これは絶対に違う" }))
      .await
      .json();
    assert_eq!(graded["answered"], true);
    assert_eq!(graded["last_result"], "incorrect");
    assert!(!graded["mistake"].is_null());
    assert_eq!(graded["score"]["total"], 1);
  }

  #[tokio::test]
  async fn test_flashcard_flip_and_next() {
    let server = test_server();

    let front: Value = server.get("/flashcard").await.json();
    assert_eq!(front["revealed"], false);
    assert!(front["reading"].is_null());

    let back: Value = server.post("/flashcard/flip").await.json();
    assert_eq!(back["revealed"], true);
    assert!(!back["reading"].is_null());

    let next: Value = server.post("/flashcard/next").await.json();
    assert_eq!(next["revealed"], false);
    assert_eq!(next["position"], 1);
  }

  #[tokio::test]
  async fn test_flashcards_do_not_score() {
    let server = test_server();
    server.post("/flashcard/flip").await;
    server.post("/flashcard/next").await;
    let score: Value = server.get("/score").await.json();
    assert_eq!(score["total"], 0);
  }

  #[tokio::test]
  async fn test_chat_without_model_is_recoverable_error() {
    let server = test_server();
    let response = server
      .post("/chat")
      .json(&serde_json::json!({ "message": "「は」と「が」の違いは？" }))
      .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["recoverable"], true);

    // failed ask leaves the transcript empty
    let history: Value = server.get("/chat").await.json();
    assert_eq!(history["history"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn test_sessions_isolated_between_clients() {
    // two clients with distinct cookies against the same store
    let state = AppState::with_static_content(AppConfig::load());
    let server_a = test_server_with(state.clone());
    let server_b = test_server_with(state);

    let quiz: Value = server_a.post("/quiz/new").await.json();
    let choice = quiz["options"][0].as_str().unwrap();
    server_a
      .post("/quiz/answer")
      .json(&serde_json::json!({ "choice": choice }))
      .await;

    let score_a: Value = server_a.get("/score").await.json();
    let score_b: Value = server_b.get("/score").await.json();
    assert_eq!(score_a["total"], 1);
    assert_eq!(score_b["total"], 0);
  }
}
