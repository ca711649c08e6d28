pub mod item;

pub use item::{Flashcard, GradeResult, MistakeItem, PracticeMode, QuizItem, Score};
