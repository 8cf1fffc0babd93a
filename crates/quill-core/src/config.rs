use thiserror::Error;

#[derive(Debug, Error)]
/// Enumerates supported `ConfigError` values.
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone)]
/// Process secrets read from the environment at startup.
///
/// Tunables (history limit, model, endpoints) are CLI flags with env
/// fallbacks; only the three credentials live here.
pub struct QuillConfig {
    pub discord_token: String,
    pub linear_access_token: String,
    pub openai_api_key: String,
}

impl QuillConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an injected lookup so tests never touch
    /// process-wide environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            discord_token: require_non_empty(&lookup, "DISCORD_TOKEN")?,
            linear_access_token: require_non_empty(&lookup, "LINEAR_ACCESS_TOKEN")?,
            openai_api_key: require_non_empty(&lookup, "OPENAI_API_KEY")?,
        })
    }
}

fn require_non_empty<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}
