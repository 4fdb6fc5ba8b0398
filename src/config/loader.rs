use super::schema::{
    AnthropicSettings, Config, GeminiSettings, OllamaSettings, OpenAiSettings,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    // Perform environment variable substitution
    let mut config = substitute_env_vars(config);

    // Backends not configured in the file can still be picked up from
    // well-known environment variables
    discover_backends_from_env(&mut config);

    // Validate configuration
    validate_config(&config)?;

    Ok(config)
}

/// Resolve `${VAR}` placeholders in credential fields. A placeholder whose
/// variable is unset removes the whole backend block, so the registry treats
/// it as not configured.
fn substitute_env_vars(mut config: Config) -> Config {
    if let Some(openai) = config.backends.openai.take() {
        config.backends.openai = resolve_placeholder(&openai.api_key)
            .map(|api_key| OpenAiSettings { api_key, ..openai });
    }
    if let Some(anthropic) = config.backends.anthropic.take() {
        config.backends.anthropic = resolve_placeholder(&anthropic.api_key)
            .map(|api_key| AnthropicSettings { api_key, ..anthropic });
    }
    if let Some(gemini) = config.backends.gemini.take() {
        config.backends.gemini = resolve_placeholder(&gemini.api_key)
            .map(|api_key| GeminiSettings { api_key, ..gemini });
    }

    config
}

fn resolve_placeholder(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn discover_backends_from_env(config: &mut Config) {
    if config.backends.openai.is_none() {
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            if !api_key.is_empty() {
                config.backends.openai = Some(OpenAiSettings {
                    api_key,
                    base_url: "https://api.openai.com/v1".to_string(),
                });
            }
        }
    }
    if config.backends.anthropic.is_none() {
        if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
            if !api_key.is_empty() {
                config.backends.anthropic = Some(AnthropicSettings {
                    api_key,
                    base_url: "https://api.anthropic.com".to_string(),
                    version: "2023-06-01".to_string(),
                });
            }
        }
    }
    if config.backends.gemini.is_none() {
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            if !api_key.is_empty() {
                config.backends.gemini = Some(GeminiSettings {
                    api_key,
                    base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                });
            }
        }
    }
    if config.backends.ollama.is_none() {
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            if !host.is_empty() {
                config.backends.ollama = Some(OllamaSettings { host });
            }
        }
    }
}

fn validate_config(config: &Config) -> Result<()> {
    if config.default_backend.is_empty() {
        anyhow::bail!("Default backend must be specified");
    }

    if config.default_model.is_empty() {
        anyhow::bail!("Default model must be specified");
    }

    if config.prompt.max_length == 0 {
        anyhow::bail!("Prompt max_length must be greater than zero");
    }

    if config.prompt.min_length > config.prompt.max_length {
        anyhow::bail!(
            "Prompt min_length ({}) exceeds max_length ({})",
            config.prompt.min_length,
            config.prompt.max_length
        );
    }

    for (i, rule) in config.rules.iter().enumerate() {
        if rule.backend.is_none() && rule.model.is_none() {
            anyhow::bail!("Rule {} names neither a backend nor a model", i);
        }
    }

    Ok(())
}
