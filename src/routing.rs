use crate::config::{Rule, RuleMatch};

/// The routable facts about one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteInput<'a> {
    pub query: &'a str,
    pub task: Option<&'a str>,
    pub mime: Option<&'a str>,
}

/// Backend/model override produced by the first matching rule. Empty when no
/// rule matched; the caller falls back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteChoice {
    pub backend: Option<String>,
    pub model: Option<String>,
}

/// Evaluates declarative routing rules in declaration order.
///
/// Stateless after construction and safe to share across concurrent requests.
pub struct RuleEngine {
    rules: Vec<Rule>,
    default_backend: String,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>, default_backend: impl Into<String>) -> Self {
        Self {
            rules,
            default_backend: default_backend.into(),
        }
    }

    /// Return the first rule (by list order) whose every present condition
    /// holds. No match is a normal outcome, not an error.
    pub fn choose(&self, input: &RouteInput) -> RouteChoice {
        for rule in &self.rules {
            if self.matches(&rule.when, input) {
                tracing::debug!(
                    backend = rule.backend.as_deref().unwrap_or("-"),
                    model = rule.model.as_deref().unwrap_or("-"),
                    "routing rule matched"
                );
                return RouteChoice {
                    backend: rule.backend.clone(),
                    model: rule.model.clone(),
                };
            }
        }

        RouteChoice::default()
    }

    fn matches(&self, when: &RuleMatch, input: &RouteInput) -> bool {
        if let Some(task) = &when.task {
            // A request without a task compares as the empty string
            if input.task.unwrap_or("") != task {
                return false;
            }
        }

        if let Some(lock) = &when.backend_lock {
            // The rule only applies while the configured default backend is
            // the locked one
            if &self.default_backend != lock {
                return false;
            }
        }

        if let Some(needle) = &when.contains {
            if !input
                .query
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }

        if let Some(mime) = &when.mime {
            if input.mime.unwrap_or("") != mime {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rule;

    fn rule(when: RuleMatch, backend: &str, model: &str) -> Rule {
        Rule {
            when,
            backend: Some(backend.to_string()),
            model: Some(model.to_string()),
        }
    }

    #[test]
    fn test_task_match() {
        let engine = RuleEngine::new(
            vec![rule(
                RuleMatch {
                    task: Some("code".to_string()),
                    ..Default::default()
                },
                "local",
                "code-7b",
            )],
            "openai",
        );

        let choice = engine.choose(&RouteInput {
            query: "fix this bug",
            task: Some("code"),
            mime: None,
        });

        assert_eq!(choice.backend.as_deref(), Some("local"));
        assert_eq!(choice.model.as_deref(), Some("code-7b"));
    }

    #[test]
    fn test_no_match_returns_empty() {
        let engine = RuleEngine::new(
            vec![rule(
                RuleMatch {
                    task: Some("code".to_string()),
                    ..Default::default()
                },
                "local",
                "code-7b",
            )],
            "openai",
        );

        let choice = engine.choose(&RouteInput {
            query: "what is the weather",
            task: None,
            mime: None,
        });

        assert_eq!(choice, RouteChoice::default());
    }

    #[test]
    fn test_absent_task_compares_as_empty_string() {
        let engine = RuleEngine::new(
            vec![rule(
                RuleMatch {
                    task: Some("".to_string()),
                    ..Default::default()
                },
                "openai",
                "gpt-4o-mini",
            )],
            "ollama",
        );

        let choice = engine.choose(&RouteInput {
            query: "hello",
            task: None,
            mime: None,
        });

        assert_eq!(choice.backend.as_deref(), Some("openai"));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let engine = RuleEngine::new(
            vec![rule(
                RuleMatch {
                    contains: Some("Translate".to_string()),
                    ..Default::default()
                },
                "gemini",
                "flash",
            )],
            "ollama",
        );

        let hit = engine.choose(&RouteInput {
            query: "please TRANSLATE this sentence",
            task: None,
            mime: None,
        });
        assert_eq!(hit.backend.as_deref(), Some("gemini"));

        let miss = engine.choose(&RouteInput {
            query: "please summarize this sentence",
            task: None,
            mime: None,
        });
        assert_eq!(miss, RouteChoice::default());
    }

    #[test]
    fn test_first_match_wins() {
        let engine = RuleEngine::new(
            vec![
                rule(
                    RuleMatch {
                        contains: Some("bug".to_string()),
                        ..Default::default()
                    },
                    "local",
                    "code-7b",
                ),
                rule(
                    RuleMatch {
                        contains: Some("bug".to_string()),
                        ..Default::default()
                    },
                    "openai",
                    "gpt-4o",
                ),
            ],
            "ollama",
        );

        let choice = engine.choose(&RouteInput {
            query: "there is a bug here",
            task: None,
            mime: None,
        });

        assert_eq!(choice.backend.as_deref(), Some("local"));
    }

    #[test]
    fn test_every_present_condition_must_hold() {
        let engine = RuleEngine::new(
            vec![rule(
                RuleMatch {
                    task: Some("code".to_string()),
                    mime: Some("text/x-rust".to_string()),
                    ..Default::default()
                },
                "local",
                "code-7b",
            )],
            "ollama",
        );

        // Task matches but mime does not
        let miss = engine.choose(&RouteInput {
            query: "refactor this",
            task: Some("code"),
            mime: Some("text/plain"),
        });
        assert_eq!(miss, RouteChoice::default());

        let hit = engine.choose(&RouteInput {
            query: "refactor this",
            task: Some("code"),
            mime: Some("text/x-rust"),
        });
        assert_eq!(hit.backend.as_deref(), Some("local"));
    }

    #[test]
    fn test_backend_lock_gates_on_default_backend() {
        let locked = rule(
            RuleMatch {
                backend_lock: Some("ollama".to_string()),
                contains: Some("draft".to_string()),
                ..Default::default()
            },
            "ollama",
            "fast-3b",
        );

        let engine = RuleEngine::new(vec![locked.clone()], "ollama");
        let hit = engine.choose(&RouteInput {
            query: "draft an email",
            task: None,
            mime: None,
        });
        assert_eq!(hit.model.as_deref(), Some("fast-3b"));

        let engine = RuleEngine::new(vec![locked], "openai");
        let miss = engine.choose(&RouteInput {
            query: "draft an email",
            task: None,
            mime: None,
        });
        assert_eq!(miss, RouteChoice::default());
    }
}
