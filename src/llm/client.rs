use anyhow::Result;
use async_trait::async_trait;

use crate::prompts::GenerationParams;

/// One call to the text-generation service.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub params: GenerationParams,
    /// Overrides the client's configured model for this call.
    pub model: Option<String>,
}

/// The service answered 404 for the requested model.
#[derive(Debug, thiserror::Error)]
#[error("model '{model}' not found: {detail}")]
pub struct ModelNotFound {
    pub model: String,
    pub detail: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the prompt and return the generated markdown.
    async fn complete(&self, request: &GenerationRequest) -> Result<String>;

    /// Model names the service offers for text generation.
    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Offline client for `--dry-run`: answers with a short canned plan
/// matching whichever module wrote the prompt.
pub struct MockLlmClient;

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &GenerationRequest) -> Result<String> {
        let prompt = &request.prompt;
        let text = if prompt.contains("3-PHASE RECOVERY PROGRAM") {
            r#"## Phase 1 (Week 1-2): Rehabilitation

- Daily: 10 min gentle range-of-motion work, ice after sessions
- Progress when: pain-free walking and full range of motion

## Phase 2 (Week 3-4): Modified Training

- Isometric holds, 3 x 30 s, pain no higher than 2/10
- Low-intensity sport-specific movement patterns

## Phase 3 (Week 5-6): Return Preparation

- Sport-specific drills at 70-90% effort
- Stop immediately on sharp pain or swelling
"#
        } else if prompt.contains("4-week training program") {
            r#"## Week 1

| Day | Session |
|-----|---------|
| Mon | Skill drills + lower-body strength (3 x 8) |
| Wed | Aerobic intervals, 6 x 3 min |
| Fri | Mobility and core |

## Week 2

Increase load by 5-10% and repeat the week 1 structure.

## Week 3

Introduce power work and speed endurance.

## Week 4

Peak week: sharpen technique, reduce volume by 20%.
"#
        } else if prompt.contains("7-day nutrition plan") {
            r#"## Monday

- Breakfast: oats (80 g), banana, 2 tbsp peanut butter
- Lunch: rice (150 g cooked), grilled tofu (150 g), mixed vegetables
- Post-workout: protein smoothie with berries

## Weekly Grocery Shopping List

- Oats, rice, tofu, berries, spinach

## Hydration Schedule

- 500 ml on waking, 250 ml every 20 minutes during training
"#
        } else if prompt.contains("tactical coaching advice") {
            r#"## Position-specific responsibilities

Own your zone and communicate early.

## Game reading and decision making

Scan before receiving; pick the simplest option under pressure.

## Common mistakes to avoid

Drifting out of position when the play switches sides.
"#
        } else {
            "## Plan\n\nMock response."
        };
        Ok(text.to_string())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["mock-model".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{fixtures, generation_params, render, ModuleKind};

    #[tokio::test]
    async fn test_mock_answers_each_module() {
        let client = MockLlmClient::new();
        let profile = fixtures::profile("cricket", "Batsman");

        for (module, heading) in [
            (ModuleKind::Training, "## Week 1"),
            (ModuleKind::Nutrition, "## Monday"),
            (ModuleKind::Tactical, "## Position-specific responsibilities"),
        ] {
            let request = GenerationRequest {
                prompt: render(module, &profile).unwrap(),
                params: generation_params(module, &profile),
                model: None,
            };
            let text = client.complete(&request).await.unwrap();
            assert!(text.contains(heading), "{} mock missing {}", module, heading);
        }
    }

    #[tokio::test]
    async fn test_mock_lists_one_model() {
        let models = MockLlmClient::new().list_models().await.unwrap();
        assert_eq!(models, vec!["mock-model".to_string()]);
    }
}
