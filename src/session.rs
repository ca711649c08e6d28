//! In-memory session storage.
//!
//! One `SessionState` per learner, keyed by the id carried in the session
//! cookie. The store is owned by the application state and shared across
//! handlers. Entries idle past the expiry window are dropped: reads refuse
//! to resume them and every write-back prunes them from the map.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config;
use crate::engine::SessionState;

struct Entry {
  state: SessionState,
  last_access: DateTime<Utc>,
}

/// Shared session store.
///
/// Lookups clone the state out; handlers mutate their copy and write it
/// back, so the lock is never held across an await point.
pub struct SessionStore {
  entries: Mutex<HashMap<String, Entry>>,
  expiry: Duration,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::with_expiry(Duration::hours(config::SESSION_EXPIRY_HOURS))
  }

  fn with_expiry(expiry: Duration) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      expiry,
    }
  }

  /// Fetch the session for `id`, creating a fresh one on first access.
  /// An entry idle past the expiry window is replaced, never resumed.
  pub fn load(&self, id: &str) -> SessionState {
    let mut entries = self.entries.lock().expect("Session store lock poisoned");
    let now = Utc::now();

    match entries.get_mut(id) {
      Some(entry) if now - entry.last_access <= self.expiry => {
        entry.last_access = now;
        entry.state.clone()
      }
      _ => {
        let state = SessionState::new();
        entries.insert(
          id.to_string(),
          Entry {
            state: state.clone(),
            last_access: now,
          },
        );
        state
      }
    }
  }

  /// Write a mutated session back, pruning idle entries along the way.
  pub fn store(&self, id: &str, state: SessionState) {
    let mut entries = self.entries.lock().expect("Session store lock poisoned");
    let now = Utc::now();
    entries.retain(|_, entry| now - entry.last_access <= self.expiry);
    entries.insert(
      id.to_string(),
      Entry {
        state,
        last_access: now,
      },
    );
  }

  #[cfg(test)]
  fn len(&self) -> usize {
    self.entries.lock().expect("Session store lock poisoned").len()
  }
}

impl Default for SessionStore {
  fn default() -> Self {
    Self::new()
  }
}

/// Mint an id for a new session cookie.
pub fn mint_session_id() -> String {
  rand::rng()
    .sample_iter(Alphanumeric)
    .take(config::SESSION_ID_LEN)
    .map(char::from)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::StaticContent;
  use crate::domain::Score;

  #[test]
  fn test_mint_session_id_shape() {
    let id = mint_session_id();
    assert_eq!(id.len(), config::SESSION_ID_LEN);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
  }

  #[test]
  fn test_mint_session_ids_are_distinct() {
    assert_ne!(mint_session_id(), mint_session_id());
  }

  #[test]
  fn test_first_access_creates_fresh_state() {
    let store = SessionStore::new();
    assert_eq!(store.load("fresh").score(), Score::default());
  }

  #[tokio::test]
  async fn test_store_then_load_roundtrips_mutations() {
    let store = SessionStore::new();
    let id = mint_session_id();
    let mut state = store.load(&id);

    let view = state.new_quiz_item(&StaticContent).await.unwrap();
    state.submit_choice(&view.options[0]).unwrap();
    store.store(&id, state);

    let reloaded = store.load(&id);
    assert_eq!(reloaded.score().total, 1);
    assert!(reloaded.quiz_view().unwrap().answered);
  }

  #[tokio::test]
  async fn test_sessions_are_isolated() {
    let store = SessionStore::new();

    let mut state_a = store.load("a");
    let view = state_a.new_quiz_item(&StaticContent).await.unwrap();
    state_a.submit_choice(&view.options[0]).unwrap();
    store.store("a", state_a);

    assert_eq!(store.load("a").score().total, 1);
    assert_eq!(store.load("b").score(), Score::default());
  }

  #[tokio::test]
  async fn test_expired_session_is_not_resumed() {
    let store = SessionStore::with_expiry(Duration::milliseconds(1));
    let mut state = store.load("idle");
    let view = state.new_quiz_item(&StaticContent).await.unwrap();
    state.submit_choice(&view.options[0]).unwrap();
    store.store("idle", state);

    std::thread::sleep(std::time::Duration::from_millis(5));
    assert_eq!(store.load("idle").score(), Score::default());
  }

  #[test]
  fn test_idle_entries_pruned_on_write_back() {
    let store = SessionStore::with_expiry(Duration::milliseconds(1));
    store.load("a");
    store.load("b");

    std::thread::sleep(std::time::Duration::from_millis(5));
    store.store("c", SessionState::new());
    assert_eq!(store.len(), 1);
  }
}
