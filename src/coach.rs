use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::config::{Config, TemperatureOverrides};
use crate::error::CoachError;
use crate::llm::{factory, GenerationRequest, LlmClient, ModelNotFound};
use crate::profile::{AthleteProfile, ProfileForm};
use crate::prompts::{self, ModuleKind};
use crate::session::Session;

const VALIDATE_CONTEXT: &str = "Validate profile";

/// Strip markdown code fences wrapped around the whole answer
/// (```markdown ... ``` or ``` ... ```). An answer holding several
/// fenced blocks is left as it is.
fn strip_markdown_fences(content: &str) -> String {
    let trimmed = content.trim();

    for opener in ["```markdown", "```md", "```"] {
        if trimmed.starts_with(opener) && trimmed.ends_with("```") && trimmed.len() > opener.len() {
            if let Some(inner) = trimmed
                .strip_prefix(opener)
                .and_then(|s| s.strip_suffix("```"))
            {
                if inner.lines().any(|line| line.trim_start().starts_with("```")) {
                    break;
                }
                return inner.trim().to_string();
            }
        }
    }

    trimmed.to_string()
}

/// Turns profiles into generated plans, consulting and filling the
/// session cache and recording every failure in the session error log.
pub struct Coach {
    client: Box<dyn LlmClient>,
    max_retries: usize,
    temperatures: TemperatureOverrides,
    fallback_models: Vec<String>,
    /// 0 is the client's own model, `n` is `fallback_models[n - 1]`.
    active_model: AtomicUsize,
}

impl Coach {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self {
            client,
            max_retries: 0,
            temperatures: TemperatureOverrides::default(),
            fallback_models: Vec::new(),
            active_model: AtomicUsize::new(0),
        }
    }

    /// Build from configuration. Fails with a configuration error when the
    /// API key is missing, so nothing is generated without credentials.
    pub fn from_config(config: &Config, dry_run: bool) -> Result<Self, CoachError> {
        let client = factory::create_client(config, dry_run)?;
        Ok(Self::new(client)
            .with_max_retries(config.generation.max_retries)
            .with_temperatures(config.generation.temperatures.clone())
            .with_fallback_models(config.llm.fallback_models.clone()))
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_temperatures(mut self, temperatures: TemperatureOverrides) -> Self {
        self.temperatures = temperatures;
        self
    }

    pub fn with_fallback_models(mut self, models: Vec<String>) -> Self {
        self.fallback_models = models;
        self
    }

    /// Model override for requests, or `None` while the configured model works.
    /// Once a fallback is taken it sticks for the rest of this coach's life.
    pub fn active_model(&self) -> Option<&str> {
        match self.active_model.load(Ordering::Relaxed) {
            0 => None,
            n => self.fallback_models.get(n - 1).map(String::as_str),
        }
    }

    /// Collect `form` into a profile and generate `module` for it.
    pub async fn generate_from_form(
        &self,
        session: &mut Session,
        module: ModuleKind,
        form: &ProfileForm,
    ) -> Result<(AthleteProfile, String), CoachError> {
        let profile = match form.collect() {
            Ok(profile) => profile,
            Err(e) => {
                session.errors.record(VALIDATE_CONTEXT, e.to_string());
                return Err(e);
            }
        };
        let text = self.generate(session, module, &profile).await?;
        Ok((profile, text))
    }

    /// Generate `module` for `profile`, serving repeats from the session cache.
    ///
    /// On failure the error is logged and returned; cached entries are left alone.
    pub async fn generate(
        &self,
        session: &mut Session,
        module: ModuleKind,
        profile: &AthleteProfile,
    ) -> Result<String, CoachError> {
        let prompt = match prompts::render(module, profile) {
            Ok(prompt) => prompt,
            Err(e) => {
                session.errors.record(VALIDATE_CONTEXT, e.to_string());
                return Err(e);
            }
        };

        if let Some(cached) = session.cache.get(module, profile) {
            debug!("Serving {} from session cache", module);
            return Ok(cached.to_string());
        }

        let mut params = prompts::generation_params(module, profile);
        if let Some(temperature) = self.temperatures.for_module(module) {
            params.temperature = temperature;
        }
        let mut request = GenerationRequest {
            prompt,
            params,
            model: None,
        };

        info!("Generating {} for {} {}", module, profile.sport, profile.position);

        let mut last_error = String::new();
        let mut attempt = 0;
        while attempt <= self.max_retries {
            if attempt > 0 {
                info!("Retrying {} (attempt {}/{})", module, attempt + 1, self.max_retries + 1);
            }
            request.model = self.active_model().map(str::to_string);
            match self.client.complete(&request).await {
                Ok(raw) => {
                    let text = strip_markdown_fences(&raw);
                    if text.is_empty() {
                        warn!("Empty response for {} on attempt {}", module, attempt + 1);
                        last_error = "Empty response from model".to_string();
                    } else {
                        session.cache.put(module, profile, text.clone());
                        info!("Generated {} ({} chars)", module, text.len());
                        return Ok(text);
                    }
                }
                Err(e) => {
                    last_error = format!("{:#}", e);
                    if let Some(missing) = e.downcast_ref::<ModelNotFound>() {
                        if self.advance_model(&missing.model) {
                            continue;
                        }
                    }
                    warn!("Generation of {} failed on attempt {}: {:#}", module, attempt + 1, e);
                }
            }
            attempt += 1;
        }

        session.errors.record(module.log_context(), last_error.clone());
        Err(CoachError::generation(module, last_error))
    }

    /// Move to the next fallback model. False once the list is used up.
    /// A model switch does not count as a retry.
    fn advance_model(&self, missing: &str) -> bool {
        let current = self.active_model.load(Ordering::Relaxed);
        let Some(next) = self.fallback_models.get(current) else {
            warn!("Model {} not found and no fallback models remain", missing);
            return false;
        };
        warn!("Model {} not found, falling back to {}", missing, next);
        self.active_model.store(current + 1, Ordering::Relaxed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::prompts::fixtures;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays scripted answers and counts calls. `None` is a transport failure.
    struct ScriptedClient {
        answers: Mutex<Vec<Option<String>>>,
        calls: Arc<AtomicUsize>,
        last_temperature: Arc<Mutex<Option<f32>>>,
    }

    impl ScriptedClient {
        fn new(answers: Vec<Option<&str>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let client = Self {
                answers: Mutex::new(answers.into_iter().rev().map(|a| a.map(str::to_string)).collect()),
                calls: calls.clone(),
                last_temperature: Arc::new(Mutex::new(None)),
            };
            (client, calls)
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, request: &GenerationRequest) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_temperature.lock().unwrap() = Some(request.params.temperature);
            match self.answers.lock().unwrap().pop() {
                Some(Some(text)) => Ok(text),
                Some(None) => bail!("connection reset"),
                None => bail!("no scripted answer left"),
            }
        }
    }

    /// Answers 404 for every model outside `known` and records what was asked.
    struct CatalogClient {
        known: Vec<&'static str>,
        asked: Arc<Mutex<Vec<Option<String>>>>,
    }

    #[async_trait]
    impl LlmClient for CatalogClient {
        async fn complete(&self, request: &GenerationRequest) -> anyhow::Result<String> {
            self.asked.lock().unwrap().push(request.model.clone());
            let model = request.model.as_deref().unwrap_or("gemini-0.9-retired");
            if self.known.contains(&model) {
                return Ok(format!("## Plan from {}", model));
            }
            Err(ModelNotFound {
                model: model.to_string(),
                detail: "404 Not Found".to_string(),
            }
            .into())
        }
    }

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(strip_markdown_fences("```markdown\n## Plan\n```"), "## Plan");
        assert_eq!(strip_markdown_fences("```\n## Plan\n```"), "## Plan");
        assert_eq!(strip_markdown_fences("  ## Plan  "), "## Plan");
        assert_eq!(strip_markdown_fences("```"), "```");
    }

    #[test]
    fn test_separate_code_blocks_are_kept() {
        let plan = "```\nWarm-up: 10 min jog\n```\n\n## Week 1\n\nSquats\n\n```\nCool-down: stretch\n```";
        assert_eq!(strip_markdown_fences(plan), plan);

        let wrapped = format!("```markdown\n{}\n```", "## Week 1\n\nSquats");
        assert_eq!(strip_markdown_fences(&wrapped), "## Week 1\n\nSquats");
    }

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let (client, calls) = ScriptedClient::new(vec![Some("## Week 1")]);
        let coach = Coach::new(Box::new(client));
        let mut session = Session::new();
        let profile = fixtures::profile("cricket", "Batsman");

        let first = coach.generate(&mut session, ModuleKind::Training, &profile).await.unwrap();
        let second = coach.generate(&mut session, ModuleKind::Training, &profile).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_validation_error_skips_generation_and_logs() {
        let (client, calls) = ScriptedClient::new(vec![Some("unused")]);
        let coach = Coach::new(Box::new(client));
        let mut session = Session::new();
        let mut profile = fixtures::profile("cricket", "Batsman");
        profile.position = String::new();

        let err = coach
            .generate(&mut session, ModuleKind::Tactical, &profile)
            .await
            .unwrap_err();

        assert!(matches!(err, CoachError::Validation { field: "position", .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.errors.len(), 1);
        assert_eq!(session.errors.entries()[0].context, "Validate profile");
    }

    #[tokio::test]
    async fn test_form_validation_error_is_logged() {
        let coach = Coach::new(Box::new(MockLlmClient::new()));
        let mut session = Session::new();
        let mut form = fixtures::form("football", "Goalkeeper");
        form.sport = None;

        let err = coach
            .generate_from_form(&mut session, ModuleKind::Training, &form)
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::Validation { field: "sport", .. }));
        assert_eq!(session.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_existing_entries() {
        let (client, _calls) = ScriptedClient::new(vec![Some("tactics"), None]);
        let coach = Coach::new(Box::new(client));
        let mut session = Session::new();
        let profile = fixtures::profile("kabaddi", "Raider");

        coach.generate(&mut session, ModuleKind::Tactical, &profile).await.unwrap();
        let err = coach
            .generate(&mut session, ModuleKind::Nutrition, &profile)
            .await
            .unwrap_err();

        assert!(matches!(err, CoachError::Generation { module: ModuleKind::Nutrition, .. }));
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(session.cache.get(ModuleKind::Tactical, &profile), Some("tactics"));
        assert!(session.cache.get(ModuleKind::Nutrition, &profile).is_none());
        assert_eq!(session.errors.len(), 1);
        assert_eq!(session.errors.entries()[0].context, "Generate Nutrition Plan");
    }

    #[tokio::test]
    async fn test_retry_recovers_from_empty_response() {
        let (client, calls) = ScriptedClient::new(vec![Some("   "), Some("## Monday")]);
        let coach = Coach::new(Box::new(client)).with_max_retries(1);
        let mut session = Session::new();
        let profile = fixtures::profile("volleyball", "Opposite");

        let text = coach.generate(&mut session, ModuleKind::Nutrition, &profile).await.unwrap();
        assert_eq!(text, "## Monday");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(session.errors.is_empty());
    }

    #[tokio::test]
    async fn test_empty_response_without_retries_is_generation_error() {
        let (client, _calls) = ScriptedClient::new(vec![Some("")]);
        let coach = Coach::new(Box::new(client));
        let mut session = Session::new();
        let profile = fixtures::profile("volleyball", "Opposite");

        let err = coach
            .generate(&mut session, ModuleKind::Training, &profile)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Empty response from model"));
        assert!(session.cache.is_empty());
    }

    #[tokio::test]
    async fn test_temperature_override_applied() {
        let (client, _calls) = ScriptedClient::new(vec![Some("ok")]);
        let seen = client.last_temperature.clone();
        let coach = Coach::new(Box::new(client)).with_temperatures(TemperatureOverrides {
            tactical: Some(0.9),
            ..Default::default()
        });
        let mut session = Session::new();
        let profile = fixtures::profile("football", "Winger");

        coach.generate(&mut session, ModuleKind::Tactical, &profile).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(0.9));
    }

    #[tokio::test]
    async fn test_missing_model_falls_back_in_order_and_sticks() {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let client = CatalogClient {
            known: vec!["gemini-pro"],
            asked: asked.clone(),
        };
        let coach = Coach::new(Box::new(client))
            .with_fallback_models(vec!["gemini-1.5-pro".to_string(), "gemini-pro".to_string()]);
        let mut session = Session::new();
        let profile = fixtures::profile("cricket", "Batsman");

        let text = coach.generate(&mut session, ModuleKind::Training, &profile).await.unwrap();
        assert_eq!(text, "## Plan from gemini-pro");
        assert_eq!(coach.active_model(), Some("gemini-pro"));
        assert!(session.errors.is_empty());

        coach.generate(&mut session, ModuleKind::Tactical, &profile).await.unwrap();
        assert_eq!(
            *asked.lock().unwrap(),
            vec![
                None,
                Some("gemini-1.5-pro".to_string()),
                Some("gemini-pro".to_string()),
                Some("gemini-pro".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_model_without_fallbacks_is_generation_error() {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let client = CatalogClient {
            known: vec![],
            asked: asked.clone(),
        };
        let coach = Coach::new(Box::new(client))
            .with_max_retries(1)
            .with_fallback_models(vec!["gemini-1.5-pro".to_string()]);
        let mut session = Session::new();
        let profile = fixtures::profile("football", "Winger");

        let err = coach
            .generate(&mut session, ModuleKind::Nutrition, &profile)
            .await
            .unwrap_err();

        assert!(matches!(err, CoachError::Generation { module: ModuleKind::Nutrition, .. }));
        assert!(err.to_string().contains("gemini-1.5-pro"));
        // primary, then the fallback twice (first attempt plus one retry)
        assert_eq!(asked.lock().unwrap().len(), 3);
        assert_eq!(session.errors.len(), 1);
        assert!(session.cache.is_empty());
    }
}
