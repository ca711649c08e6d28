//! Multiple-choice reading quiz handlers.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::state::AppState;

use super::{generation_error, no_active_item, session_cookie};

#[derive(Deserialize)]
pub struct AnswerForm {
  pub choice: String,
}

/// Select a fresh quiz item. On generation failure the previous item stays
/// active and the client gets a recoverable error.
pub async fn new_item(State(state): State<AppState>, jar: CookieJar) -> Response {
  let (jar, session_id) = session_cookie(jar);
  let mut session = state.sessions.load(&session_id);

  match session.new_quiz_item(state.provider.as_ref()).await {
    Ok(view) => {
      state.sessions.store(&session_id, session);
      (jar, Json(view)).into_response()
    }
    Err(e) => (jar, generation_error(e)).into_response(),
  }
}

/// Re-render the current quiz item without mutating anything.
pub async fn current(State(state): State<AppState>, jar: CookieJar) -> Response {
  let (jar, session_id) = session_cookie(jar);
  let session = state.sessions.load(&session_id);

  match session.quiz_view() {
    Some(view) => (jar, Json(view)).into_response(),
    None => (jar, no_active_item()).into_response(),
  }
}

/// Grade a selected option. Repeat submissions are ignored by the engine.
pub async fn answer(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(form): Json<AnswerForm>,
) -> Response {
  let (jar, session_id) = session_cookie(jar);
  let mut session = state.sessions.load(&session_id);

  match session.submit_choice(&form.choice) {
    Some(view) => {
      state.sessions.store(&session_id, session);
      (jar, Json(view)).into_response()
    }
    None => (jar, no_active_item()).into_response(),
  }
}
