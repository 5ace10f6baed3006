//! Prompt templates for the three coaching modules.
//!
//! [`render`] is pure: the same module and profile always produce the same
//! prompt, and nothing time-dependent is interpolated.

mod nutrition;
mod tactical;
mod training;

use anyhow::bail;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub use nutrition::dietary_clause;
pub use training::{TrainingTemplate, HIGH_RISK_CATEGORIES, REHAB_MARKER, STANDARD_MARKER};

use crate::error::CoachError;
use crate::profile::AthleteProfile;
use crate::util::sanitize_free_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Training,
    Nutrition,
    Tactical,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [
        ModuleKind::Training,
        ModuleKind::Nutrition,
        ModuleKind::Tactical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Training => "training",
            ModuleKind::Nutrition => "nutrition",
            ModuleKind::Tactical => "tactical",
        }
    }

    /// Stem of the exported markdown file name.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ModuleKind::Training => "training_plan",
            ModuleKind::Nutrition => "nutrition_plan",
            ModuleKind::Tactical => "tactical_advice",
        }
    }

    /// Context label used for error log entries.
    pub fn log_context(&self) -> &'static str {
        match self {
            ModuleKind::Training => "Generate Training Plan",
            ModuleKind::Nutrition => "Generate Nutrition Plan",
            ModuleKind::Tactical => "Generate Tactical Advice",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::Training => write!(f, "training plan"),
            ModuleKind::Nutrition => write!(f, "nutrition plan"),
            ModuleKind::Tactical => write!(f, "tactical advice"),
        }
    }
}

impl FromStr for ModuleKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "training" | "train" => Ok(ModuleKind::Training),
            "nutrition" | "diet" => Ok(ModuleKind::Nutrition),
            "tactical" | "tactics" => Ok(ModuleKind::Tactical),
            _ => bail!("Unknown module: {} (expected training, nutrition or tactical)", s),
        }
    }
}

/// Sampling parameters sent with a prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

/// Sampling parameters for a module. Training uses a cooler, shorter setting
/// for injury-adapted plans.
pub fn generation_params(module: ModuleKind, profile: &AthleteProfile) -> GenerationParams {
    match module {
        ModuleKind::Training => TrainingTemplate::select(profile).params(),
        ModuleKind::Nutrition => GenerationParams {
            temperature: 0.4,
            top_p: 0.8,
            max_output_tokens: 2000,
        },
        ModuleKind::Tactical => GenerationParams {
            temperature: 0.5,
            top_p: 0.85,
            max_output_tokens: 1000,
        },
    }
}

/// Render the prompt for `module`.
///
/// Fails with a validation error when a required profile field is missing.
pub fn render(module: ModuleKind, profile: &AthleteProfile) -> Result<String, CoachError> {
    profile.validate()?;
    let prompt = match module {
        ModuleKind::Training => TrainingTemplate::select(profile).render(profile),
        ModuleKind::Nutrition => nutrition::render(profile),
        ModuleKind::Tactical => tactical::render(profile),
    };
    Ok(prompt)
}

fn goals_line(profile: &AthleteProfile) -> String {
    profile
        .goals
        .iter()
        .map(|g| sanitize_free_text(g))
        .collect::<Vec<_>>()
        .join(", ")
}
