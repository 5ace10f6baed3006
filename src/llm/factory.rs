use tracing::info;

use super::client::{LlmClient, MockLlmClient};
use super::client_impl::{GeminiClient, OpenAIClient, GEMINI_BASE_URL, OPENAI_BASE_URL};
use crate::config::{Config, Provider};
use crate::error::CoachError;

/// Build the generation client described by `config`.
///
/// Reads the API key up front so a missing secret stops the program before
/// any profile is processed. `dry_run` skips the key and returns the mock.
pub fn create_client(config: &Config, dry_run: bool) -> Result<Box<dyn LlmClient>, CoachError> {
    if dry_run {
        info!("Dry run: using mock generation client");
        return Ok(Box::new(MockLlmClient::new()));
    }

    let api_key = config.api_key()?;
    let llm = &config.llm;

    let client: Box<dyn LlmClient> = match llm.provider {
        Provider::Gemini => Box::new(
            GeminiClient::with_base_url(
                api_key,
                llm.model.clone(),
                llm.base_url
                    .clone()
                    .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
                llm.timeout_secs,
            )
            .map_err(|e| CoachError::Configuration(e.to_string()))?,
        ),
        Provider::OpenAICompatible => Box::new(
            OpenAIClient::with_base_url(
                api_key,
                llm.model.clone(),
                llm.base_url
                    .clone()
                    .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                llm.timeout_secs,
            )
            .map_err(|e| CoachError::Configuration(e.to_string()))?,
        ),
    };

    info!("Using {} provider with model {}", llm.provider, llm.model);
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_create_mock_client_for_dry_run() {
        let mut config = Config::default();
        config.llm.api_key_env = "COACHBOT_FACTORY_UNSET_KEY".to_string();
        assert!(create_client(&config, true).is_ok());
    }

    #[test]
    #[serial]
    fn test_create_gemini_client() {
        env::set_var("COACHBOT_FACTORY_KEY", "test_key");
        let mut config = Config::default();
        config.llm.api_key_env = "COACHBOT_FACTORY_KEY".to_string();
        assert!(create_client(&config, false).is_ok());
        env::remove_var("COACHBOT_FACTORY_KEY");
    }

    #[test]
    #[serial]
    fn test_create_openai_compatible_client() {
        env::set_var("COACHBOT_FACTORY_KEY", "test_key");
        let mut config = Config::default();
        config.llm.api_key_env = "COACHBOT_FACTORY_KEY".to_string();
        config.llm.provider = Provider::OpenAICompatible;
        config.llm.base_url = Some("http://localhost:11434/v1".to_string());
        assert!(create_client(&config, false).is_ok());
        env::remove_var("COACHBOT_FACTORY_KEY");
    }

    #[test]
    #[serial]
    fn test_openai_compatible_blank_key_refuses_to_build() {
        env::set_var("COACHBOT_FACTORY_KEY", "  ");
        let mut config = Config::default();
        config.llm.api_key_env = "COACHBOT_FACTORY_KEY".to_string();
        config.llm.provider = Provider::OpenAICompatible;
        config.llm.base_url = Some("http://localhost:11434/v1".to_string());
        let result = create_client(&config, false);
        env::remove_var("COACHBOT_FACTORY_KEY");
        assert!(matches!(result, Err(CoachError::Configuration(_))));
    }

    #[test]
    fn test_missing_key_refuses_to_build() {
        let mut config = Config::default();
        config.llm.api_key_env = "COACHBOT_FACTORY_NONEXISTENT_99999".to_string();
        match create_client(&config, false) {
            Err(CoachError::Configuration(msg)) => assert!(msg.contains("API key not found")),
            Err(other) => panic!("expected configuration error, got {}", other),
            Ok(_) => panic!("client built without an API key"),
        }
    }
}
