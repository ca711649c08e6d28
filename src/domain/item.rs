use serde::{Deserialize, Serialize};

/// The practice modes offered by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PracticeMode {
  /// Multiple-choice kanji reading quiz
  Quiz,
  /// Find the mistake in a sentence (free text)
  MistakeHunt,
  /// Flip-card vocabulary deck (not graded)
  Flashcard,
}

impl PracticeMode {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "quiz" => Some(Self::Quiz),
      "mistake" => Some(Self::MistakeHunt),
      "flashcard" => Some(Self::Flashcard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Quiz => "quiz",
      Self::MistakeHunt => "mistake",
      Self::Flashcard => "flashcard",
    }
  }
}

/// A multiple-choice reading quiz item.
///
/// The rendered option set is {correct_reading} ∪ {wrong_readings};
/// `correct_reading` must never appear among `wrong_readings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
  /// The kanji compound shown to the learner (2-3 characters)
  pub word: String,
  /// The correct reading in hiragana
  pub correct_reading: String,
  /// Incorrect but plausible readings
  pub wrong_readings: Vec<String>,
  /// Chinese translation, shown alongside the word
  pub meaning_chinese: String,
  /// Example sentence, shown after the answer
  pub example_sentence: String,
}

/// A find-the-mistake item: one sentence containing exactly one error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeItem {
  /// The sentence containing the mistake
  pub sentence: String,
  /// The exact erroneous substring the learner must identify
  pub mistake: String,
  /// The corrected expression, shown after the answer
  pub correct: String,
  /// Why it is wrong (explained in Chinese), shown after the answer
  pub explanation: String,
}

/// A vocabulary flashcard. Reveal-only, never graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flashcard {
  pub word: &'static str,
  pub reading: &'static str,
  pub meaning: &'static str,
  pub example: &'static str,
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeResult {
  Correct,
  Incorrect,
}

/// Running score across all graded interactions in a session.
///
/// Quiz and mistake-hunt submissions both count here; flashcards never do.
/// Monotonically non-decreasing for the lifetime of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
  pub correct: u32,
  pub total: u32,
}

impl Score {
  /// Record one graded submission.
  pub fn record(&mut self, result: GradeResult) {
    self.total += 1;
    if result == GradeResult::Correct {
      self.correct += 1;
    }
  }

  /// Percentage of correct answers, or None before the first submission.
  pub fn percent(&self) -> Option<u32> {
    if self.total == 0 {
      None
    } else {
      Some(self.correct * 100 / self.total)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_practice_mode_from_str() {
    assert_eq!(PracticeMode::from_str("quiz"), Some(PracticeMode::Quiz));
    assert_eq!(PracticeMode::from_str("mistake"), Some(PracticeMode::MistakeHunt));
    assert_eq!(PracticeMode::from_str("flashcard"), Some(PracticeMode::Flashcard));
    assert_eq!(PracticeMode::from_str("chat"), None);
    assert_eq!(PracticeMode::from_str(""), None);
  }

  #[test]
  fn test_practice_mode_as_str_roundtrip() {
    for mode in [PracticeMode::Quiz, PracticeMode::MistakeHunt, PracticeMode::Flashcard] {
      assert_eq!(PracticeMode::from_str(mode.as_str()), Some(mode));
    }
  }

  #[test]
  fn test_score_starts_empty() {
    let score = Score::default();
    assert_eq!(score.correct, 0);
    assert_eq!(score.total, 0);
    assert_eq!(score.percent(), None);
  }

  #[test]
  fn test_score_record_correct() {
    let mut score = Score::default();
    score.record(GradeResult::Correct);
    assert_eq!(score, Score { correct: 1, total: 1 });
    assert_eq!(score.percent(), Some(100));
  }

  #[test]
  fn test_score_record_incorrect() {
    let mut score = Score::default();
    score.record(GradeResult::Incorrect);
    assert_eq!(score, Score { correct: 0, total: 1 });
    assert_eq!(score.percent(), Some(0));
  }

  #[test]
  fn test_score_percent_rounds_down() {
    let mut score = Score::default();
    score.record(GradeResult::Correct);
    score.record(GradeResult::Correct);
    score.record(GradeResult::Incorrect);
    assert_eq!(score.percent(), Some(66));
  }

  #[test]
  fn test_quiz_item_json_shape() {
    let json = r#"{
      "word": "勉強",
      "correct_reading": "べんきょう",
      "wrong_readings": ["べんきよう", "べんきゅう", "べんこう"],
      "meaning_chinese": "学习",
      "example_sentence": "日本語を勉強します。"
    }"#;
    let item: QuizItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.word, "勉強");
    assert_eq!(item.correct_reading, "べんきょう");
    assert_eq!(item.wrong_readings.len(), 3);
  }

  #[test]
  fn test_mistake_item_json_shape() {
    let json = r#"{
      "sentence": "わたしは学校が行きます。",
      "mistake": "が",
      "correct": "に",
      "explanation": "表示移动目的地要用「に」。"
    }"#;
    let item: MistakeItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.mistake, "が");
    assert_eq!(item.correct, "に");
  }
}
