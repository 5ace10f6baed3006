use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use crate::config::{Config, Provider};
use crate::llm::{factory, LlmClient};
use crate::prompts::ModuleKind;

const MAX_SENSIBLE_RETRIES: usize = 5;

struct CheckResult {
    passed: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl CheckResult {
    fn new() -> Self {
        Self {
            passed: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn pass(&mut self, msg: impl Into<String>) {
        self.passed.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
}

pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let mut results = CheckResult::new();

    let config = match Config::load_with_path(config_path.as_deref()) {
        Ok(config) => {
            let source = config_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "default search path".to_string());
            results.pass(format!("Config loaded from {}", source));
            config
        }
        Err(e) => {
            // Reported through print_results; returning Err here would print it twice
            results.error(format!("Failed to load config: {:#}", e));
            print_results(&results);
            return Ok(());
        }
    };

    check_config(&config, &mut results);
    // Only ask the service when a key is present; a missing key is already reported
    if let Ok(client) = factory::create_client(&config, false) {
        check_models(client.as_ref(), &config, &mut results).await;
    }
    print_results(&results);

    if !results.errors.is_empty() {
        anyhow::bail!("{} config error(s) found", results.errors.len());
    }
    Ok(())
}

fn check_config(config: &Config, results: &mut CheckResult) {
    results.pass(format!(
        "LLM provider: {} (model: {})",
        config.llm.provider, config.llm.model
    ));

    check_api_key(&config.llm.api_key_env, results);

    if !config.llm.fallback_models.is_empty() {
        results.pass(format!(
            "Fallback models: {}",
            config.llm.fallback_models.join(", ")
        ));
    }

    if config.llm.provider == Provider::OpenAICompatible {
        match &config.llm.base_url {
            Some(url) => results.pass(format!("Base URL: {}", url)),
            None => results.warn(
                "openai-compatible provider without base_url, using the public OpenAI endpoint",
            ),
        }
    }

    let retries = config.generation.max_retries;
    if retries > MAX_SENSIBLE_RETRIES {
        results.warn(format!(
            "max_retries={} means a failing request is sent {} times",
            retries,
            retries + 1
        ));
    } else {
        results.pass(format!("Generation: max_retries={}", retries));
    }

    for module in ModuleKind::ALL {
        if let Some(t) = config.generation.temperatures.for_module(module) {
            if (0.0..=2.0).contains(&t) {
                results.pass(format!("{} temperature override: {}", module, t));
            } else {
                results.error(format!(
                    "{} temperature {} is outside 0.0-2.0",
                    module, t
                ));
            }
        }
    }

    if let Some(dir) = &config.generation.output_dir {
        check_output_dir(dir, results);
    }
}

fn check_api_key(env_var: &str, results: &mut CheckResult) {
    match env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => {
            results.pass(format!("API key: {} is set", env_var));
        }
        Ok(_) => {
            results.error(format!("API key: {} is set but empty", env_var));
        }
        Err(_) => {
            results.error(format!(
                "API key: {} is not set (generation will refuse to start; --dry-run still works)",
                env_var
            ));
        }
    }
}

async fn check_models(client: &dyn LlmClient, config: &Config, results: &mut CheckResult) {
    let available = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            results.warn(format!("Could not list models: {:#}", e));
            return;
        }
    };
    if available.is_empty() {
        results.warn("The service listed no models");
        return;
    }
    results.pass(format!("{} models available", available.len()));

    let wanted = std::iter::once(&config.llm.model).chain(&config.llm.fallback_models);
    for model in wanted {
        if available.contains(model) {
            results.pass(format!("Model {} is available", model));
        } else {
            results.warn(format!("Model {} is not in the service's model list", model));
        }
    }
}

fn check_output_dir(dir: &Path, results: &mut CheckResult) {
    if dir.is_dir() {
        results.pass(format!("Output directory: {}", dir.display()));
    } else if dir.exists() {
        results.error(format!(
            "Output directory {} exists but is not a directory",
            dir.display()
        ));
    } else {
        results.warn(format!(
            "Output directory {} does not exist yet (created on first save)",
            dir.display()
        ));
    }
}

fn print_results(results: &CheckResult) {
    println!();
    for msg in &results.passed {
        println!("  \u{2713} {}", msg);
    }
    for msg in &results.warnings {
        println!("  ! {}", msg);
    }
    for msg in &results.errors {
        println!("  \u{2717} {}", msg);
    }
    println!();
    println!(
        "{} passed, {} warnings, {} errors",
        results.passed.len(),
        results.warnings.len(),
        results.errors.len()
    );
}
