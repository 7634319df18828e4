use anyhow::{Context, bail};
use book_recommender::{GenerationSettings, PromptProfile, TierScheme};
use book_recommender::prompt::MAX_RECOMMENDATIONS;
use std::fmt::Display;
use std::str::FromStr;

use crate::messages::Locale;
use crate::telemetry::LogFormat;

/// Startup configuration for the HTTP service.
///
/// AWS credentials are deliberately absent: they are read again for every
/// request by the Bedrock connector.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub locale: Locale,
    pub profile: PromptProfile,
    pub generation: GenerationSettings,
    pub bedrock_endpoint: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present.
    pub fn from_env() -> anyhow::Result<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let vars = Vars(&lookup);

        let locale: Locale = vars.parse_or("MESSAGE_LOCALE", Locale::Japanese)?;
        let tiers: TierScheme = vars.parse_or("RECOMMENDATION_TIERS", TierScheme::WithUltraRare)?;
        let mut profile = PromptProfile::new(tiers, locale.reply_language());
        if let Some(count) = vars.get("RECOMMENDATION_COUNT") {
            let count: usize = count
                .parse()
                .with_context(|| format!("invalid RECOMMENDATION_COUNT `{count}`"))?;
            if !(1..=MAX_RECOMMENDATIONS).contains(&count) {
                bail!("RECOMMENDATION_COUNT must be between 1 and {MAX_RECOMMENDATIONS}, got {count}");
            }
            profile = profile.with_count(count);
        }

        let defaults = GenerationSettings::default();
        let generation = GenerationSettings {
            model_id: vars.get("BEDROCK_MODEL_ID").unwrap_or(defaults.model_id),
            max_tokens: vars.parse_or("BEDROCK_MAX_TOKENS", defaults.max_tokens)?,
            temperature: vars.parse_or("BEDROCK_TEMPERATURE", defaults.temperature)?,
            top_p: vars.parse_or("BEDROCK_TOP_P", defaults.top_p)?,
            top_k: vars.parse_or("BEDROCK_TOP_K", defaults.top_k)?,
        };
        if generation.max_tokens == 0 {
            bail!("BEDROCK_MAX_TOKENS must be positive");
        }
        if !(0.0..=1.0).contains(&generation.temperature) {
            bail!("BEDROCK_TEMPERATURE must be within 0.0..=1.0");
        }
        if !(0.0..=1.0).contains(&generation.top_p) {
            bail!("BEDROCK_TOP_P must be within 0.0..=1.0");
        }

        Ok(Self {
            host: vars.get("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: vars.parse_or("PORT", 3000)?,
            log_level: vars.get("LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
            log_format: vars.parse_or("LOG_FORMAT", LogFormat::Text)?,
            locale,
            profile,
            generation,
            bedrock_endpoint: vars.get("BEDROCK_ENDPOINT"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid {key} `{raw}`: {e}")),
            None => Ok(default),
        }
    }
}
