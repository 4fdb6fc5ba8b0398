use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend")]
    pub default_backend: String,
    pub default_model: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub backends: BackendSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A declarative routing rule. Rules are evaluated in declaration order and
/// the first rule whose every present condition holds wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "match", default)]
    pub when: RuleMatch,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleMatch {
    /// Exact match against the request task ("" when the request has none).
    #[serde(default)]
    pub task: Option<String>,
    /// The rule applies only when the configured default backend equals this.
    #[serde(default)]
    pub backend_lock: Option<String>,
    /// Case-insensitive substring match against the query text.
    #[serde(default)]
    pub contains: Option<String>,
    /// Exact match against the request mime type.
    #[serde(default)]
    pub mime: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    Balanced,
    Short,
    Detailed,
}

impl Default for PromptStyle {
    fn default() -> Self {
        Self::Balanced
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub style: PromptStyle,
    /// Total character budget across all prompt segments.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Floor below which cached context is used to pad the window.
    #[serde(default)]
    pub min_length: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            style: PromptStyle::default(),
            max_length: default_max_length(),
            min_length: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            max_entries: default_max_entries(),
        }
    }
}

/// One optional credential block per backend family. A missing block means
/// the family is not registered at startup; there is no error path for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub openai: Option<OpenAiSettings>,
    #[serde(default)]
    pub anthropic: Option<AnthropicSettings>,
    #[serde(default)]
    pub gemini: Option<GeminiSettings>,
    #[serde(default)]
    pub ollama: Option<OllamaSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicSettings {
    pub api_key: String,
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
    #[serde(default = "default_anthropic_version")]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    pub api_key: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaSettings {
    #[serde(default = "default_ollama_host")]
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default functions
fn default_backend() -> String {
    "ollama".to_string()
}

fn default_max_length() -> usize {
    4000
}

fn default_max_entries() -> usize {
    500
}

fn default_cache_dir() -> String {
    dirs::home_dir()
        .map(|h: std::path::PathBuf| {
            h.join(".modelgate")
                .join("cache")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "./cache".to_string())
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_version() -> String {
    "2023-06-01".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
