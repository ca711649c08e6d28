//! Built-in content tables.
//!
//! The flashcard deck is always served from here. The quiz and mistake
//! tables are the fallback source when no model API key is configured, so
//! the graded modes keep working offline. All tables are fixed and
//! pre-validated; lookups are total and never fail.

use rand::Rng;

use crate::domain::{Flashcard, MistakeItem, QuizItem};

use super::{ContentSource, GenerationError};

/// The vocabulary flashcard deck.
pub const FLASHCARDS: [Flashcard; 10] = [
    Flashcard { word: "学校", reading: "がっこう", meaning: "学校 xuéxiào", example: "学校に行きます。" },
    Flashcard { word: "友達", reading: "ともだち", meaning: "朋友 péngyou", example: "友達と遊びます。" },
    Flashcard { word: "先生", reading: "せんせい", meaning: "老师 lǎoshī", example: "先生に質問します。" },
    Flashcard { word: "勉強", reading: "べんきょう", meaning: "学习 xuéxí", example: "日本語を勉強します。" },
    Flashcard { word: "家族", reading: "かぞく", meaning: "家人 jiārén", example: "家族は5人です。" },
    Flashcard { word: "天気", reading: "てんき", meaning: "天气 tiānqì", example: "今日の天気はいいです。" },
    Flashcard { word: "食事", reading: "しょくじ", meaning: "饭/用餐 fàn", example: "食事の時間です。" },
    Flashcard { word: "音楽", reading: "おんがく", meaning: "音乐 yīnyuè", example: "音楽を聴きます。" },
    Flashcard { word: "運動", reading: "うんどう", meaning: "运动 yùndòng", example: "運動が好きです。" },
    Flashcard { word: "宿題", reading: "しゅくだい", meaning: "作业 zuòyè", example: "宿題を忘れました。" },
];

/// Built-in quiz items: (word, correct reading, distractors, meaning, example).
const QUIZ_TABLE: [(&str, &str, [&str; 3], &str, &str); 8] = [
    ("勉強", "べんきょう", ["べんきよう", "べんきゅう", "べんこう"], "学习", "日本語を勉強します。"),
    ("学校", "がっこう", ["がくこう", "かっこう", "がこう"], "学校", "学校に行きます。"),
    ("天気", "てんき", ["てんぎ", "でんき", "てんけ"], "天气", "今日の天気はいいです。"),
    ("音楽", "おんがく", ["おんらく", "おとがく", "いんがく"], "音乐", "音楽を聴きます。"),
    ("宿題", "しゅくだい", ["しゅうだい", "やどだい", "しゅくたい"], "作业", "宿題を忘れました。"),
    ("運動", "うんどう", ["うんとう", "うんどお", "うどう"], "运动", "運動が好きです。"),
    ("家族", "かぞく", ["かそく", "いえぞく", "かずく"], "家人", "家族は5人です。"),
    ("友達", "ともだち", ["ゆうたつ", "ともたち", "とだち"], "朋友", "友達と遊びます。"),
];

/// Built-in mistake items: (sentence, mistake, correct, explanation).
const MISTAKE_TABLE: [(&str, &str, &str, &str); 6] = [
    ("わたしは学校が行きます。", "が", "に", "表示移动的目的地要用助词「に」。"),
    ("あさごはんにパンが食べました。", "が", "を", "他动词的宾语要用助词「を」。"),
    ("きのう映画を見ます。", "見ます", "見ました", "「きのう」是过去的事情，动词要用过去形。"),
    ("先生、おはようございました。", "おはようございました", "おはようございます", "问候语「おはようございます」没有过去形。"),
    ("わたしは新しいな車がほしいです。", "新しいな", "新しい", "「新しい」是い形容词，修饰名词时不加「な」。"),
    ("日曜日と友達に会います。", "と", "に", "表示时间的词后面要用助词「に」。"),
];

/// Provider serving the built-in tables. Item selection is uniformly random,
/// matching the one-item-at-a-time flow of the generated provider.
pub struct StaticContent;

impl StaticContent {
    /// Total lookup of a quiz item by index (wraps modulo table size).
    pub fn quiz_at(index: usize) -> QuizItem {
        let (word, correct, wrongs, meaning, example) = QUIZ_TABLE[index % QUIZ_TABLE.len()];
        QuizItem {
            word: word.to_string(),
            correct_reading: correct.to_string(),
            wrong_readings: wrongs.iter().map(|s| s.to_string()).collect(),
            meaning_chinese: meaning.to_string(),
            example_sentence: example.to_string(),
        }
    }

    /// Total lookup of a mistake item by index (wraps modulo table size).
    pub fn mistake_at(index: usize) -> MistakeItem {
        let (sentence, mistake, correct, explanation) = MISTAKE_TABLE[index % MISTAKE_TABLE.len()];
        MistakeItem {
            sentence: sentence.to_string(),
            mistake: mistake.to_string(),
            correct: correct.to_string(),
            explanation: explanation.to_string(),
        }
    }
}

impl ContentSource for StaticContent {
    async fn quiz_item(&self) -> Result<QuizItem, GenerationError> {
        let index = rand::rng().random_range(0..QUIZ_TABLE.len());
        Ok(Self::quiz_at(index))
    }

    async fn mistake_item(&self) -> Result<MistakeItem, GenerationError> {
        let index = rand::rng().random_range(0..MISTAKE_TABLE.len());
        Ok(Self::mistake_at(index))
    }

    async fn tutor_reply(&self, _question: &str) -> Result<String, GenerationError> {
        // The tutor has no offline fallback
        Err(GenerationError::TransportFailure(
            "no model API key configured".to_string(),
        ))
    }
}
