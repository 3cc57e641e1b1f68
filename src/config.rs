use std::time::Duration;

use crate::assistant::gemini;
use crate::assistant::ChatPolicy;
use crate::error::ConfigError;
use crate::language::Language;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Gemini { api_key: String, model: String },
    ChatGpt { api_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider: Provider,
    pub policy: ChatPolicy,
    pub default_language: Language,
    pub remote_timeout: Duration,
    pub rng_seed: Option<u64>,
}

impl Config {
    /// Reads the configuration from the process environment.
    /// Call `dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let provider = match get("ERROR20_PROVIDER").as_deref().map(str::trim) {
            None | Some("gemini") => Provider::Gemini {
                api_key: require("GEMINI_API_KEY")?,
                model: get("GEMINI_MODEL").unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            },
            Some("chatgpt") => Provider::ChatGpt {
                api_key: require("CHATGPT_API_KEY")?,
            },
            Some(other) => {
                return Err(invalid("ERROR20_PROVIDER", format!("unknown provider '{}'", other)))
            }
        };

        let policy = match get("ERROR20_CHAT_POLICY") {
            Some(value) => value
                .parse::<ChatPolicy>()
                .map_err(|message| invalid("ERROR20_CHAT_POLICY", message))?,
            None => ChatPolicy::default(),
        };

        let default_language = match get("ERROR20_DEFAULT_LANGUAGE") {
            Some(value) => value
                .parse::<Language>()
                .map_err(|message| invalid("ERROR20_DEFAULT_LANGUAGE", message))?,
            None => Language::default(),
        };

        let remote_timeout = match get("ERROR20_REMOTE_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(invalid(
                        "ERROR20_REMOTE_TIMEOUT_SECS",
                        format!("expected a positive number of seconds, got '{}'", value),
                    ))
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let rng_seed = match get("ERROR20_RNG_SEED") {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|e| {
                invalid("ERROR20_RNG_SEED", e.to_string())
            })?),
            None => None,
        };

        Ok(Self {
            provider,
            policy,
            default_language,
            remote_timeout,
            rng_seed,
        })
    }
}

fn invalid(key: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("GEMINI_API_KEY", "key")]).unwrap();
        assert_eq!(
            config,
            Config {
                provider: Provider::Gemini {
                    api_key: "key".to_string(),
                    model: "gemini-1.5-pro".to_string(),
                },
                policy: ChatPolicy::PerCallFallback,
                default_language: Language::Ar,
                remote_timeout: Duration::from_secs(15),
                rng_seed: None,
            }
        );
    }

    #[test]
    fn chatgpt_with_overrides() {
        let config = config(&[
            ("ERROR20_PROVIDER", "chatgpt"),
            ("CHATGPT_API_KEY", "sk"),
            ("ERROR20_CHAT_POLICY", "sticky"),
            ("ERROR20_DEFAULT_LANGUAGE", "en"),
            ("ERROR20_REMOTE_TIMEOUT_SECS", "30"),
            ("ERROR20_RNG_SEED", "7"),
        ])
        .unwrap();
        assert_eq!(config.provider, Provider::ChatGpt { api_key: "sk".to_string() });
        assert_eq!(config.policy, ChatPolicy::StickyDegrade);
        assert_eq!(config.default_language, Language::En);
        assert_eq!(config.remote_timeout, Duration::from_secs(30));
        assert_eq!(config.rng_seed, Some(7));
    }

    #[test]
    fn missing_key_is_reported() {
        assert_eq!(
            config(&[("ERROR20_PROVIDER", "chatgpt")]),
            Err(ConfigError::MissingEnvVar("CHATGPT_API_KEY".to_string()))
        );
        assert_eq!(
            config(&[("GEMINI_API_KEY", "  ")]),
            Err(ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))
        );
    }

    #[test]
    fn invalid_values_are_reported() {
        assert!(matches!(
            config(&[("GEMINI_API_KEY", "k"), ("ERROR20_CHAT_POLICY", "sometimes")]),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "ERROR20_CHAT_POLICY"
        ));
        assert!(matches!(
            config(&[("GEMINI_API_KEY", "k"), ("ERROR20_REMOTE_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config(&[("ERROR20_PROVIDER", "claude")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
