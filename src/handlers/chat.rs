//! AI tutor chat handlers.
//!
//! The transcript lives in the session; the tutor itself requires the
//! model-backed provider. Nothing here touches the score.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

use super::{generation_error, session_cookie};

#[derive(Deserialize)]
pub struct AskForm {
  pub message: String,
}

/// Current chat transcript.
pub async fn history(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = session_cookie(jar);
  let session = state.sessions.load(&session_id);
  (jar, Json(session.chat_view()))
}

/// Ask the tutor a question.
pub async fn ask(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(form): Json<AskForm>,
) -> Response {
  let (jar, session_id) = session_cookie(jar);

  let question = form.message.trim();
  if question.is_empty() {
    return (
      jar,
      (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": "empty question" })),
      ),
    )
      .into_response();
  }

  let mut session = state.sessions.load(&session_id);
  match session.ask_tutor(state.provider.as_ref(), question).await {
    Ok(view) => {
      state.sessions.store(&session_id, session);
      (jar, Json(view)).into_response()
    }
    Err(e) => (jar, generation_error(e)).into_response(),
  }
}

/// Clear the chat transcript.
pub async fn clear(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = session_cookie(jar);
  let mut session = state.sessions.load(&session_id);
  let view = session.clear_chat();
  state.sessions.store(&session_id, session);
  (jar, Json(view))
}
