//! Application configuration.
//!
//! Layered the same way for every value: config.toml > environment (.env) >
//! built-in default.

use serde::Deserialize;

// ==================== Config File Structure ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfigFile {
    server: Option<ServerSection>,
    generation: Option<GenerationSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationSection {
    api_key: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    max_output_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    difficulty: Option<String>,
}

// ==================== Resolved Configuration ====================

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server bind address
    pub server_addr: String,
    /// Server port
    pub server_port: u16,
    /// Gemini API key; None runs the app on built-in content only
    pub api_key: Option<String>,
    /// Model identifier for generation requests
    pub model: String,
    /// Sampling temperature for generation requests
    pub temperature: f64,
    /// Max-token budget per generation request
    pub max_output_tokens: u32,
    /// Bound on each generation call; expiry is a transport failure
    pub timeout_secs: u64,
    /// Difficulty hint injected into generation prompts (school grade)
    pub difficulty: String,
}

impl AppConfig {
    /// Load configuration with priority: config.toml > .env/environment > default.
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = std::fs::read_to_string("config.toml")
            .ok()
            .and_then(|contents| match toml::from_str::<AppConfigFile>(&contents) {
                Ok(parsed) => {
                    tracing::info!("Loaded config.toml");
                    Some(parsed)
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed config.toml: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self::resolve(file)
    }

    /// Resolve a parsed config file against the environment and defaults.
    fn resolve(file: AppConfigFile) -> Self {
        let server = file.server.unwrap_or_default();
        let generation = file.generation.unwrap_or_default();

        let api_key = generation
            .api_key
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!("No GEMINI_API_KEY configured; using built-in content only");
        }

        Self {
            server_addr: server.addr.unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            server_port: server.port.unwrap_or(DEFAULT_SERVER_PORT),
            api_key,
            model: generation.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: generation.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_output_tokens: generation.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            timeout_secs: generation.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            difficulty: generation.difficulty.unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}

// ==================== Server Defaults ====================

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

// ==================== Generation Defaults ====================

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.9;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Target difficulty for generated items: 5th grade of elementary school
pub const DEFAULT_DIFFICULTY: &str = "小学5年生";

// ==================== Session Configuration ====================

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "jp_session";

/// Session expiration time in hours
pub const SESSION_EXPIRY_HOURS: i64 = 1;

/// Length of generated session ids
pub const SESSION_ID_LEN: usize = 32;
