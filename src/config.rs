use std::env;

/// Placeholder values shipped in sample configs. A key equal to one of these
/// is treated the same as no key at all.
const IMGBB_KEY_PLACEHOLDER: &str = "YOUR_IMGBB_API_KEY_HERE";
const GROQ_KEY_PLACEHOLDER: &str = "YOUR_GROQ_API_KEY_HERE";

const IMGBB_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";
const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Candidate vision models, tried in order until one answers.
const DEFAULT_MODELS: [&str; 2] = [
    "meta-llama/llama-4-maverick-17b-128e-instruct",
    "meta-llama/llama-4-scout-17b-16e-instruct",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub imgbb_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub models: Vec<String>,
    pub imgbb_endpoint: String,
    pub groq_endpoint: String,
}

impl AppConfig {
    /// Read configuration from the environment. Both API keys are optional:
    /// a missing hosting key means inline data URLs, a missing model key
    /// means analysis fails with `ConfigurationMissing`.
    pub fn from_env() -> Self {
        let imgbb_api_key = usable_key(env::var("IMGBB_API_KEY").ok(), IMGBB_KEY_PLACEHOLDER);
        let groq_api_key = usable_key(env::var("GROQ_API_KEY").ok(), GROQ_KEY_PLACEHOLDER);

        let models = env::var("GROQ_MODELS")
            .ok()
            .map(|raw| parse_models(&raw))
            .filter(|models| !models.is_empty())
            .unwrap_or_else(default_models);

        log::info!(
            "🔧 Config loaded - hosting key: {} | model key: {} | models: {:?}",
            if imgbb_api_key.is_some() { "set" } else { "not set" },
            if groq_api_key.is_some() { "set" } else { "not set" },
            models
        );

        Self {
            imgbb_api_key,
            groq_api_key,
            models,
            imgbb_endpoint: IMGBB_UPLOAD_URL.to_string(),
            groq_endpoint: GROQ_CHAT_URL.to_string(),
        }
    }
}

pub fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

/// Filter out empty and placeholder keys.
fn usable_key(value: Option<String>, placeholder: &str) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != placeholder)
}

/// Parse a comma-separated model list, dropping empty entries.
fn parse_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_key_treated_as_missing() {
        assert_eq!(
            usable_key(Some(IMGBB_KEY_PLACEHOLDER.to_string()), IMGBB_KEY_PLACEHOLDER),
            None
        );
        assert_eq!(
            usable_key(Some(GROQ_KEY_PLACEHOLDER.to_string()), GROQ_KEY_PLACEHOLDER),
            None
        );
    }

    #[test]
    fn test_empty_key_treated_as_missing() {
        assert_eq!(usable_key(Some("".to_string()), IMGBB_KEY_PLACEHOLDER), None);
        assert_eq!(usable_key(Some("   ".to_string()), IMGBB_KEY_PLACEHOLDER), None);
        assert_eq!(usable_key(None, IMGBB_KEY_PLACEHOLDER), None);
    }

    #[test]
    fn test_real_key_passes_through() {
        assert_eq!(
            usable_key(Some("abc123".to_string()), IMGBB_KEY_PLACEHOLDER),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_parse_models_splits_and_trims() {
        let models = parse_models("model-a, model-b ,,model-c");
        assert_eq!(models, vec!["model-a", "model-b", "model-c"]);
    }

    #[test]
    fn test_default_models_ordered_primary_first() {
        let models = default_models();
        assert_eq!(models.len(), 2);
        assert!(models[0].contains("maverick"));
        assert!(models[1].contains("scout"));
    }
}
