//! Gemini generation client.
//!
//! One outbound call per generation request: a role-tagged prompt, the
//! configured model id, temperature, and max-token budget. The model is
//! asked for a bare JSON object but routinely wraps it in markdown fences,
//! so the response text goes through an extraction step before decoding.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::domain::{MistakeItem, QuizItem};

use super::{ContentSource, GenerationError};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// ==================== Wire Format ====================

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

// ==================== Prompts ====================

fn quiz_prompt(difficulty: &str) -> String {
    format!(
        r#"あなたは日本語教師です。中国人小学生向けに熟語クイズを1問作ってください。

以下の形式でJSONで出力してください（他の文字は一切不要）：
{{
    "word": "漢字の熟語（2-3文字）",
    "correct_reading": "正しい読み方（ひらがな）",
    "wrong_readings": ["間違い1", "間違い2", "間違い3"],
    "meaning_chinese": "中国語での意味",
    "example_sentence": "例文（ふりがな付き）"
}}

難易度は{difficulty}レベルで。
"#
    )
}

fn mistake_prompt(difficulty: &str) -> String {
    format!(
        r#"中国人小学生向けの「間違い探し」問題を1つ作ってください。
日本語の文章の中に1つだけ間違いがあります。

以下の形式でJSONで出力（他の文字は不要）：
{{
    "sentence": "間違いを含む文（15-25文字）",
    "mistake": "間違っている部分",
    "correct": "正しい表現",
    "explanation": "なぜ間違いなのか（中国語で簡単に説明）"
}}

間違いの種類：助詞の間違い、送り仮名の間違い、漢字の読み間違いなど
難易度は{difficulty}レベルで。
"#
    )
}

const TUTOR_SYSTEM_PROMPT: &str = r#"あなたは優しい日本語の先生です。中国人の小学5年生に日本語を教えています。
以下のルールを守ってください：
1. 簡単な日本語で説明する
2. 必要に応じて中国語での説明も加える
3. 例文を使って分かりやすく教える
4. 励ましの言葉を入れる
5. 長すぎる回答は避ける（3-5文程度）
"#;

// ==================== Response Extraction ====================

/// Extract the JSON object from model output.
///
/// Strips a ```json / ``` fence if present, then slices from the first `{`
/// to the last `}`.
pub(crate) fn extract_json(text: &str) -> Result<&str, GenerationError> {
    let mut text = text.trim();

    if let Some(after) = text.split("```json").nth(1) {
        text = after.split("```").next().unwrap_or(after);
    } else if let Some(after) = text.split("```").nth(1) {
        text = after.split("```").next().unwrap_or(after);
    }

    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(GenerationError::MalformedResponse(
            "no JSON object in model output".to_string(),
        )),
    }
}

/// Decode extracted JSON into a typed item.
///
/// A text that is not JSON at all is a malformed response; valid JSON that
/// does not satisfy the item schema is a schema violation.
fn decode_item<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| GenerationError::SchemaViolation(e.to_string()))
}

/// Reject items whose fields are present but unusable.
pub(crate) fn validate_quiz_item(item: &QuizItem) -> Result<(), GenerationError> {
    if item.word.is_empty() || item.correct_reading.is_empty() {
        return Err(GenerationError::SchemaViolation(
            "quiz item has empty word or reading".to_string(),
        ));
    }
    if item.wrong_readings.is_empty() || item.wrong_readings.iter().any(|r| r.is_empty()) {
        return Err(GenerationError::SchemaViolation(
            "quiz item has missing or empty distractors".to_string(),
        ));
    }
    // The rendered option set must contain the correct reading exactly once
    if item.wrong_readings.contains(&item.correct_reading) {
        return Err(GenerationError::SchemaViolation(
            "correct reading duplicated among distractors".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_mistake_item(item: &MistakeItem) -> Result<(), GenerationError> {
    if item.sentence.is_empty() || item.mistake.is_empty() || item.correct.is_empty() {
        return Err(GenerationError::SchemaViolation(
            "mistake item has empty required fields".to_string(),
        ));
    }
    Ok(())
}

// ==================== Client ====================

/// Client for the Gemini generateContent endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f64,
    max_output_tokens: u32,
    difficulty: String,
}

impl GeminiClient {
    /// Build a client from resolved configuration.
    ///
    /// The request timeout bounds every generation call; expiry surfaces as
    /// a transport failure like any other network error.
    pub fn new(config: &AppConfig, api_key: String) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::TransportFailure(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            difficulty: config.difficulty.clone(),
        })
    }

    /// Request URL. The API key travels in the `x-goog-api-key` header and
    /// never appears here; transport errors echo the full URL.
    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }

    /// Issue one generation call and return the raw completion text.
    async fn generate(&self, prompt: String) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::TransportFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::TransportFailure(format!(
                "model API returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                GenerationError::MalformedResponse("completion has no text candidate".to_string())
            })
    }
}

impl ContentSource for GeminiClient {
    async fn quiz_item(&self) -> Result<QuizItem, GenerationError> {
        let text = self.generate(quiz_prompt(&self.difficulty)).await?;
        let item: QuizItem = decode_item(extract_json(&text)?)?;
        validate_quiz_item(&item)?;
        tracing::debug!("Generated quiz item for {}", item.word);
        Ok(item)
    }

    async fn mistake_item(&self) -> Result<MistakeItem, GenerationError> {
        let text = self.generate(mistake_prompt(&self.difficulty)).await?;
        let item: MistakeItem = decode_item(extract_json(&text)?)?;
        validate_mistake_item(&item)?;
        tracing::debug!("Generated mistake item");
        Ok(item)
    }

    async fn tutor_reply(&self, question: &str) -> Result<String, GenerationError> {
        let prompt = format!("{}\n\n生徒の質問: {}", TUTOR_SYSTEM_PROMPT, question);
        self.generate(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_bare_object() {
        let text = r#"{"word": "天気"}"#;
        assert_eq!(extract_json(text).unwrap(), r#"{"word": "天気"}"#);
    }

    #[test]
    fn test_extract_json_strips_json_fence() {
        let text = "```json\n{\"word\": \"天気\"}\n```";
        assert_eq!(extract_json(text).unwrap(), "{\"word\": \"天気\"}");
    }

    #[test]
    fn test_extract_json_strips_plain_fence() {
        let text = "```\n{\"word\": \"天気\"}\n```";
        assert_eq!(extract_json(text).unwrap(), "{\"word\": \"天気\"}");
    }

    #[test]
    fn test_extract_json_slices_surrounding_prose() {
        let text = "はい、問題です！ {\"word\": \"天気\"} 頑張ってね";
        assert_eq!(extract_json(text).unwrap(), "{\"word\": \"天気\"}");
    }

    #[test]
    fn test_extract_json_no_object_is_malformed() {
        let err = extract_json("すみません、作れませんでした。").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_quiz_item_complete() {
        let json = r#"{
            "word": "勉強",
            "correct_reading": "べんきょう",
            "wrong_readings": ["べんきよう", "べんきゅう", "べんこう"],
            "meaning_chinese": "学习",
            "example_sentence": "日本語を勉強します。"
        }"#;
        let item: QuizItem = decode_item(json).unwrap();
        assert!(validate_quiz_item(&item).is_ok());
    }

    #[test]
    fn test_decode_quiz_item_missing_field_is_schema_violation() {
        let json = r#"{"word": "勉強", "correct_reading": "べんきょう"}"#;
        let err = decode_item::<QuizItem>(json).unwrap_err();
        assert!(matches!(err, GenerationError::SchemaViolation(_)));
    }

    #[test]
    fn test_decode_invalid_json_is_malformed() {
        let err = decode_item::<QuizItem>("{word: 勉強").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn test_validate_rejects_correct_reading_among_distractors() {
        let item = QuizItem {
            word: "勉強".to_string(),
            correct_reading: "べんきょう".to_string(),
            wrong_readings: vec!["べんきょう".to_string(), "べんこう".to_string()],
            meaning_chinese: "学习".to_string(),
            example_sentence: "日本語を勉強します。".to_string(),
        };
        let err = validate_quiz_item(&item).unwrap_err();
        assert!(matches!(err, GenerationError::SchemaViolation(_)));
    }

    #[test]
    fn test_validate_rejects_empty_distractor() {
        let item = QuizItem {
            word: "勉強".to_string(),
            correct_reading: "べんきょう".to_string(),
            wrong_readings: vec!["".to_string()],
            meaning_chinese: "学习".to_string(),
            example_sentence: String::new(),
        };
        assert!(validate_quiz_item(&item).is_err());
    }

    #[test]
    fn test_validate_mistake_item_requires_fields() {
        let item = MistakeItem {
            sentence: "わたしは学校が行きます。".to_string(),
            mistake: String::new(),
            correct: "に".to_string(),
            explanation: String::new(),
        };
        assert!(validate_mistake_item(&item).is_err());
    }

    #[test]
    fn test_prompts_carry_difficulty_hint() {
        assert!(quiz_prompt("小学5年生").contains("小学5年生"));
        assert!(mistake_prompt("小学3年生").contains("小学3年生"));
    }

    #[test]
    fn test_endpoint_never_embeds_api_key() {
        let config = AppConfig {
            server_addr: "127.0.0.1".to_string(),
            server_port: 0,
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.9,
            max_output_tokens: 512,
            timeout_secs: 15,
            difficulty: "小学5年生".to_string(),
        };
        let client = GeminiClient::new(&config, "test-key-123".to_string()).unwrap();

        // a transport error stringifies the URL, so the key must not be in it
        let endpoint = client.endpoint();
        assert!(endpoint.ends_with("gemini-1.5-flash:generateContent"));
        assert!(!endpoint.contains("test-key-123"));
    }
}
