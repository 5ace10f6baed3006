pub mod config_check;
pub mod generate;
pub mod session;
pub mod sports;

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::profile::ProfileForm;

/// Profile answers shared by `generate` and `session`. Flags override the
/// values read from `--profile`.
#[derive(Debug, Clone, Default, Args)]
pub struct ProfileArgs {
    /// TOML file with the athlete profile
    #[arg(short = 'p', long = "profile")]
    pub profile: Option<PathBuf>,

    /// Sport (cricket, football, kabaddi, volleyball)
    #[arg(long)]
    pub sport: Option<String>,

    /// Playing position (must belong to the sport)
    #[arg(long)]
    pub position: Option<String>,

    #[arg(long)]
    pub age: Option<u8>,

    /// Male, Female or Other
    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long = "height")]
    pub height_cm: Option<String>,

    #[arg(long = "weight")]
    pub weight_kg: Option<String>,

    /// Years of experience in the sport
    #[arg(long = "experience")]
    pub experience_years: Option<u8>,

    /// Training days per week (1-7)
    #[arg(long = "days")]
    pub training_days: Option<u8>,

    /// Beginner, Intermediate, Advanced or Elite
    #[arg(long = "fitness")]
    pub fitness_level: Option<String>,

    /// Recreational, School, Club, State, National or Professional
    #[arg(long = "level")]
    pub competition_level: Option<String>,

    /// Training goal (repeatable)
    #[arg(long = "goal")]
    pub goals: Vec<String>,

    /// Current injury, or "None"
    #[arg(long)]
    pub injury: Option<String>,

    #[arg(long)]
    pub injury_duration: Option<String>,

    #[arg(long)]
    pub limitations: Option<String>,

    /// Dietary restriction tag (repeatable)
    #[arg(long = "diet")]
    pub dietary_restrictions: Vec<String>,

    #[arg(long)]
    pub allergies: Option<String>,
}

impl ProfileArgs {
    fn overrides(&self) -> ProfileForm {
        ProfileForm {
            sport: self.sport.clone(),
            position: self.position.clone(),
            age: self.age,
            gender: self.gender.clone(),
            height_cm: self.height_cm.clone(),
            weight_kg: self.weight_kg.clone(),
            experience_years: self.experience_years,
            training_days: self.training_days,
            fitness_level: self.fitness_level.clone(),
            competition_level: self.competition_level.clone(),
            goals: self.goals.clone(),
            injured: None,
            injury: self.injury.clone(),
            injury_duration: self.injury_duration.clone(),
            limitations: self.limitations.clone(),
            dietary_restrictions: self.dietary_restrictions.clone(),
            allergies: self.allergies.clone(),
        }
    }

    /// Read the profile file (if any) and apply flag overrides on top.
    pub fn load_form(&self) -> Result<ProfileForm> {
        let base = match &self.profile {
            Some(path) => ProfileForm::load(path)?,
            None => ProfileForm::default(),
        };
        Ok(base.merge(self.overrides()))
    }
}
