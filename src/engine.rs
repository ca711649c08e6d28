//! Practice session state machine.
//!
//! One `SessionState` per learner session. Each practice mode tracks its own
//! active item; the quiz and mistake-hunt modes share one running score,
//! flashcards are never graded. All mutations go through the operations
//! here, and every operation returns the view model the presentation layer
//! renders from.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::content::{ContentSource, GenerationError};
use crate::domain::{Flashcard, GradeResult, MistakeItem, QuizItem, Score};

/// Active quiz item plus its presentation state.
///
/// `options` is shuffled once when the item is selected; re-rendering the
/// same item never reshuffles.
#[derive(Debug, Clone)]
struct ActiveQuiz {
  item: QuizItem,
  options: Vec<String>,
  answered: bool,
  last_result: Option<GradeResult>,
}

#[derive(Debug, Clone)]
struct ActiveMistake {
  item: MistakeItem,
  answered: bool,
  last_result: Option<GradeResult>,
}

/// One turn in the tutor chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
  pub role: ChatRole,
  pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
  User,
  Tutor,
}

/// All state for one learner session. Created on first access, mutated only
/// by the operations below, discarded when the session expires.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
  quiz: Option<ActiveQuiz>,
  mistake: Option<ActiveMistake>,
  card_index: usize,
  card_revealed: bool,
  score: Score,
  chat: Vec<ChatTurn>,
}

// ==================== View Models ====================

/// Render-able state of the quiz mode. Grading metadata is only populated
/// once the item has been answered.
#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
  pub word: String,
  pub meaning_chinese: String,
  pub options: Vec<String>,
  pub answered: bool,
  pub last_result: Option<GradeResult>,
  pub correct_reading: Option<String>,
  pub example_sentence: Option<String>,
  pub score: Score,
}

#[derive(Debug, Clone, Serialize)]
pub struct MistakeView {
  pub sentence: String,
  pub answered: bool,
  pub last_result: Option<GradeResult>,
  pub mistake: Option<String>,
  pub correct: Option<String>,
  pub explanation: Option<String>,
  pub score: Score,
}

/// Render-able state of the flashcard mode. Back-face fields are only
/// populated while the card is revealed.
#[derive(Debug, Clone, Serialize)]
pub struct FlashcardView {
  pub position: usize,
  pub deck_size: usize,
  pub word: String,
  pub revealed: bool,
  pub reading: Option<String>,
  pub meaning: Option<String>,
  pub example: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
  pub history: Vec<ChatTurn>,
}

// ==================== Operations ====================

impl SessionState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn score(&self) -> Score {
    self.score
  }

  // ---------- Quiz ----------

  /// Select a fresh quiz item from the provider.
  ///
  /// The option list is built as {correct reading} ∪ {distractors} and
  /// shuffled here, once. On provider failure the previous item (and the
  /// score) are left untouched and the error is returned to the caller.
  pub async fn new_quiz_item<P: ContentSource>(
    &mut self,
    provider: &P,
  ) -> Result<QuizView, GenerationError> {
    let item = provider.quiz_item().await?;

    let mut options = Vec::with_capacity(1 + item.wrong_readings.len());
    options.push(item.correct_reading.clone());
    options.extend(item.wrong_readings.iter().cloned());
    options.shuffle(&mut rand::rng());

    let active = ActiveQuiz {
      item,
      options,
      answered: false,
      last_result: None,
    };
    let view = Self::render_quiz(&active, self.score);
    self.quiz = Some(active);
    Ok(view)
  }

  /// Current quiz view, if an item is active. Never mutates state, so
  /// re-rendering cannot change the option order.
  pub fn quiz_view(&self) -> Option<QuizView> {
    self.quiz.as_ref().map(|a| Self::render_quiz(a, self.score))
  }

  fn render_quiz(active: &ActiveQuiz, score: Score) -> QuizView {
    QuizView {
      word: active.item.word.clone(),
      meaning_chinese: active.item.meaning_chinese.clone(),
      options: active.options.clone(),
      answered: active.answered,
      last_result: active.last_result,
      correct_reading: active.answered.then(|| active.item.correct_reading.clone()),
      example_sentence: active.answered.then(|| active.item.example_sentence.clone()),
      score,
    }
  }

  /// Grade a selected option against the active quiz item.
  ///
  /// Exact string equality. A second submission for the same item is
  /// ignored: the score counts each item at most once. Returns None when no
  /// item is active.
  pub fn submit_choice(&mut self, selected: &str) -> Option<QuizView> {
    let active = self.quiz.as_mut()?;
    if !active.answered {
      let result = if selected == active.item.correct_reading {
        GradeResult::Correct
      } else {
        GradeResult::Incorrect
      };
      active.answered = true;
      active.last_result = Some(result);
      self.score.record(result);
    }
    self.quiz_view()
  }

  // ---------- Mistake hunt ----------

  /// Select a fresh mistake item from the provider. Same failure contract
  /// as `new_quiz_item`.
  pub async fn new_mistake_item<P: ContentSource>(
    &mut self,
    provider: &P,
  ) -> Result<MistakeView, GenerationError> {
    let item = provider.mistake_item().await?;
    let active = ActiveMistake {
      item,
      answered: false,
      last_result: None,
    };
    let view = Self::render_mistake(&active, self.score);
    self.mistake = Some(active);
    Ok(view)
  }

  pub fn mistake_view(&self) -> Option<MistakeView> {
    self.mistake.as_ref().map(|a| Self::render_mistake(a, self.score))
  }

  fn render_mistake(active: &ActiveMistake, score: Score) -> MistakeView {
    MistakeView {
      sentence: active.item.sentence.clone(),
      answered: active.answered,
      last_result: active.last_result,
      mistake: active.answered.then(|| active.item.mistake.clone()),
      correct: active.answered.then(|| active.item.correct.clone()),
      explanation: active.answered.then(|| active.item.explanation.clone()),
      score,
    }
  }

  /// Grade a free-text answer against the active mistake item.
  ///
  /// The answer is trimmed of surrounding whitespace, then compared for
  /// exact, case-sensitive equality with the expected substring. No fuzzy
  /// matching and no width normalization; an empty submission is simply
  /// incorrect. Same once-per-item scoring as `submit_choice`.
  pub fn submit_mistake_answer(&mut self, answer: &str) -> Option<MistakeView> {
    let active = self.mistake.as_mut()?;
    if !active.answered {
      let result = if answer.trim() == active.item.mistake {
        GradeResult::Correct
      } else {
        GradeResult::Incorrect
      };
      active.answered = true;
      active.last_result = Some(result);
      self.score.record(result);
    }
    self.mistake_view()
  }

  // ---------- Flashcards ----------

  /// Current flashcard view over the given deck. The deck must be non-empty.
  pub fn flashcard_view(&self, deck: &[Flashcard]) -> FlashcardView {
    let index = self.card_index % deck.len();
    let card = &deck[index];
    FlashcardView {
      position: index,
      deck_size: deck.len(),
      word: card.word.to_string(),
      revealed: self.card_revealed,
      reading: self.card_revealed.then(|| card.reading.to_string()),
      meaning: self.card_revealed.then(|| card.meaning.to_string()),
      example: self.card_revealed.then(|| card.example.to_string()),
    }
  }

  /// Toggle the card's back face. Reversible, never scored, never guarded.
  pub fn flip_card(&mut self, deck: &[Flashcard]) -> FlashcardView {
    self.card_revealed = !self.card_revealed;
    self.flashcard_view(deck)
  }

  /// Advance to the next card, wrapping at the end of the deck. The new
  /// card always starts front-side up.
  pub fn next_card(&mut self, deck: &[Flashcard]) -> FlashcardView {
    self.card_index = (self.card_index + 1) % deck.len();
    self.card_revealed = false;
    self.flashcard_view(deck)
  }

  // ---------- Tutor chat ----------

  /// Ask the tutor a question and append both turns to the transcript.
  ///
  /// On provider failure the transcript is left as it was (the pending user
  /// turn is removed) and the error is surfaced.
  pub async fn ask_tutor<P: ContentSource>(
    &mut self,
    provider: &P,
    question: &str,
  ) -> Result<ChatView, GenerationError> {
    self.chat.push(ChatTurn {
      role: ChatRole::User,
      content: question.to_string(),
    });
    match provider.tutor_reply(question).await {
      Ok(reply) => {
        self.chat.push(ChatTurn {
          role: ChatRole::Tutor,
          content: reply,
        });
        Ok(self.chat_view())
      }
      Err(e) => {
        self.chat.pop();
        Err(e)
      }
    }
  }

  pub fn chat_view(&self) -> ChatView {
    ChatView {
      history: self.chat.clone(),
    }
  }

  pub fn clear_chat(&mut self) -> ChatView {
    self.chat.clear();
    self.chat_view()
  }
}
