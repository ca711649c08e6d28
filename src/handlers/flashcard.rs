//! Flashcard deck handlers. Reveal-only, never graded.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::content::decks::FLASHCARDS;
use crate::state::AppState;

use super::session_cookie;

/// Current card, front side unless already flipped.
pub async fn current(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = session_cookie(jar);
  let session = state.sessions.load(&session_id);
  (jar, Json(session.flashcard_view(&FLASHCARDS)))
}

/// Toggle the back face of the current card.
pub async fn flip(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = session_cookie(jar);
  let mut session = state.sessions.load(&session_id);
  let view = session.flip_card(&FLASHCARDS);
  state.sessions.store(&session_id, session);
  (jar, Json(view))
}

/// Advance to the next card, wrapping at the end of the deck.
pub async fn next(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = session_cookie(jar);
  let mut session = state.sessions.load(&session_id);
  let view = session.next_card(&FLASHCARDS);
  state.sessions.store(&session_id, session);
  (jar, Json(view))
}
