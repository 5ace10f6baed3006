//! Athlete profile collection and validation.
//!
//! A [`ProfileForm`] holds whatever the user supplied (TOML file, CLI flags)
//! and [`ProfileForm::collect`] turns it into an [`AthleteProfile`]. Profiles
//! are snapshots: a changed answer means collecting a new one.

pub mod catalog;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub use catalog::{CompetitionLevel, FitnessLevel, Gender, Sport};

use crate::error::CoachError;

pub const AGE_RANGE: RangeInclusive<u8> = 12..=40;
pub const EXPERIENCE_RANGE: RangeInclusive<u8> = 0..=20;
pub const TRAINING_DAYS_RANGE: RangeInclusive<u8> = 1..=7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InjuryState {
    Healthy,
    Injured {
        description: String,
        duration: Option<String>,
        limitations: Option<String>,
    },
}

impl InjuryState {
    pub fn is_injured(&self) -> bool {
        matches!(self, InjuryState::Injured { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DietaryConstraints {
    pub restrictions: BTreeSet<String>,
    pub allergies: Option<String>,
}

impl DietaryConstraints {
    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty() && self.allergies.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteProfile {
    pub sport: Sport,
    pub position: String,
    pub age: u8,
    pub gender: Gender,
    pub height_cm: Option<String>,
    pub weight_kg: Option<String>,
    pub experience_years: u8,
    pub training_days: u8,
    pub fitness_level: FitnessLevel,
    pub competition_level: CompetitionLevel,
    pub goals: Vec<String>,
    pub injury: InjuryState,
    pub dietary: DietaryConstraints,
}

impl AthleteProfile {
    /// Check the required fields. Optional ones (injury details, allergies,
    /// height, weight) are never rejected.
    pub fn validate(&self) -> std::result::Result<(), CoachError> {
        if self.position.trim().is_empty() {
            return Err(CoachError::validation("position", "must be selected"));
        }
        if self.sport.canonical_position(&self.position).is_none() {
            return Err(CoachError::validation(
                "position",
                format!(
                    "'{}' is not a {} position (expected one of: {})",
                    self.position,
                    self.sport.as_str(),
                    self.sport.positions().join(", ")
                ),
            ));
        }
        check_range("age", self.age, &AGE_RANGE)?;
        check_range("experience_years", self.experience_years, &EXPERIENCE_RANGE)?;
        check_range("training_days", self.training_days, &TRAINING_DAYS_RANGE)?;
        if self.goals.is_empty() {
            return Err(CoachError::validation("goals", "select at least one goal"));
        }
        if self.goals.iter().any(|g| g.trim().is_empty()) {
            return Err(CoachError::validation("goals", "goals must not be blank"));
        }
        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: u8,
    range: &RangeInclusive<u8>,
) -> std::result::Result<(), CoachError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CoachError::validation(
            field,
            format!(
                "{} is outside {}..={}",
                value,
                range.start(),
                range.end()
            ),
        ))
    }
}

/// Raw form answers. Every field may be missing; [`ProfileForm::collect`]
/// decides which absences are errors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileForm {
    pub sport: Option<String>,
    pub position: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<String>,
    pub height_cm: Option<String>,
    pub weight_kg: Option<String>,
    pub experience_years: Option<u8>,
    pub training_days: Option<u8>,
    pub fitness_level: Option<String>,
    pub competition_level: Option<String>,
    pub goals: Vec<String>,
    /// Explicit injured flag; set it to mark an injury without describing it
    pub injured: Option<bool>,
    pub injury: Option<String>,
    pub injury_duration: Option<String>,
    pub limitations: Option<String>,
    pub dietary_restrictions: Vec<String>,
    pub allergies: Option<String>,
}

impl ProfileForm {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading profile form from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let form: ProfileForm = toml::from_str(&content)
            .with_context(|| format!("Failed to parse profile {}", path.display()))?;
        Ok(form)
    }

    /// Overlay every answer present in `other` onto this form.
    pub fn merge(mut self, other: ProfileForm) -> Self {
        macro_rules! overlay {
            ($($field:ident),+) => {
                $(if other.$field.is_some() { self.$field = other.$field; })+
            };
        }
        overlay!(
            sport,
            position,
            age,
            gender,
            height_cm,
            weight_kg,
            experience_years,
            training_days,
            fitness_level,
            competition_level,
            injured,
            injury,
            injury_duration,
            limitations,
            allergies
        );
        if !other.goals.is_empty() {
            self.goals = other.goals;
        }
        if !other.dietary_restrictions.is_empty() {
            self.dietary_restrictions = other.dietary_restrictions;
        }
        self
    }

    /// Build a validated profile snapshot from the form answers.
    pub fn collect(&self) -> std::result::Result<AthleteProfile, CoachError> {
        let sport: Sport = parse_required("sport", &self.sport)?;

        let position_raw = required_text("position", &self.position)?;
        let position = sport
            .canonical_position(position_raw)
            .map(str::to_string)
            .unwrap_or_else(|| position_raw.to_string());

        let profile = AthleteProfile {
            sport,
            position,
            age: self.age.ok_or_else(|| CoachError::validation("age", "is required"))?,
            gender: parse_required("gender", &self.gender)?,
            height_cm: optional_text(&self.height_cm),
            weight_kg: optional_text(&self.weight_kg),
            experience_years: self
                .experience_years
                .ok_or_else(|| CoachError::validation("experience_years", "is required"))?,
            training_days: self
                .training_days
                .ok_or_else(|| CoachError::validation("training_days", "is required"))?,
            fitness_level: parse_required("fitness_level", &self.fitness_level)?,
            competition_level: parse_required("competition_level", &self.competition_level)?,
            goals: self.goals.iter().map(|g| g.trim().to_string()).collect(),
            injury: self.injury_state(),
            dietary: DietaryConstraints {
                restrictions: restriction_tags(&self.dietary_restrictions),
                allergies: optional_text(&self.allergies),
            },
        };

        profile.validate()?;
        Ok(profile)
    }

    fn injury_state(&self) -> InjuryState {
        let described = optional_text(&self.injury).filter(|i| !i.eq_ignore_ascii_case("none"));
        let injured = self.injured.unwrap_or(described.is_some());
        if !injured {
            return InjuryState::Healthy;
        }
        InjuryState::Injured {
            description: described.unwrap_or_default(),
            duration: optional_text(&self.injury_duration),
            limitations: optional_text(&self.limitations),
        }
    }
}

/// Listed tags take their catalog spelling; other tags keep the first
/// spelling seen. Either way a tag is kept once regardless of case.
fn restriction_tags(raw: &[String]) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    for tag in raw.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
        let tag = catalog::canonical_dietary_tag(tag).unwrap_or(tag);
        if !tags.iter().any(|t: &String| t.eq_ignore_ascii_case(tag)) {
            tags.insert(tag.to_string());
        }
    }
    tags
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_text<'a>(
    field: &'static str,
    value: &'a Option<String>,
) -> std::result::Result<&'a str, CoachError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoachError::validation(field, "must be selected"))
}

fn parse_required<T>(
    field: &'static str,
    value: &Option<String>,
) -> std::result::Result<T, CoachError>
where
    T: FromStr<Err = anyhow::Error>,
{
    let raw = required_text(field, value)?;
    raw.parse::<T>()
        .map_err(|e| CoachError::validation(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn football_form() -> ProfileForm {
        ProfileForm {
            sport: Some("football".to_string()),
            position: Some("goalkeeper".to_string()),
            age: Some(19),
            gender: Some("Male".to_string()),
            experience_years: Some(4),
            training_days: Some(5),
            fitness_level: Some("Intermediate".to_string()),
            competition_level: Some("Club".to_string()),
            goals: vec!["improve agility".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_collect_valid_form() {
        let profile = football_form().collect().unwrap();
        assert_eq!(profile.sport, Sport::Football);
        assert_eq!(profile.position, "Goalkeeper");
        assert_eq!(profile.injury, InjuryState::Healthy);
        assert!(profile.dietary.is_empty());
        assert!(profile.height_cm.is_none());
    }

    #[test]
    fn test_collect_missing_sport() {
        let mut form = football_form();
        form.sport = None;
        let err = form.collect().unwrap_err();
        assert!(matches!(err, CoachError::Validation { field: "sport", .. }));
    }

    #[test]
    fn test_collect_blank_position() {
        let mut form = football_form();
        form.position = Some("   ".to_string());
        let err = form.collect().unwrap_err();
        assert!(matches!(err, CoachError::Validation { field: "position", .. }));
    }

    #[test]
    fn test_collect_position_from_other_sport() {
        let mut form = football_form();
        form.position = Some("Raider".to_string());
        let err = form.collect().unwrap_err();
        assert!(err.to_string().contains("not a football position"));
    }

    #[test]
    fn test_collect_no_goals() {
        let mut form = football_form();
        form.goals.clear();
        let err = form.collect().unwrap_err();
        assert!(matches!(err, CoachError::Validation { field: "goals", .. }));
    }

    #[test]
    fn test_collect_age_out_of_range() {
        let mut form = football_form();
        form.age = Some(55);
        let err = form.collect().unwrap_err();
        assert!(matches!(err, CoachError::Validation { field: "age", .. }));
    }

    #[test]
    fn test_collect_training_days_out_of_range() {
        let mut form = football_form();
        form.training_days = Some(0);
        assert!(form.collect().is_err());
    }

    #[test]
    fn test_injury_none_is_healthy() {
        let mut form = football_form();
        form.injury = Some("None".to_string());
        form.limitations = Some("ignored".to_string());
        assert_eq!(form.collect().unwrap().injury, InjuryState::Healthy);
    }

    #[test]
    fn test_injury_description_marks_injured() {
        let mut form = football_form();
        form.injury = Some("Groin strain".to_string());
        form.injury_duration = Some("2-4 weeks".to_string());
        let profile = form.collect().unwrap();
        assert_eq!(
            profile.injury,
            InjuryState::Injured {
                description: "Groin strain".to_string(),
                duration: Some("2-4 weeks".to_string()),
                limitations: None,
            }
        );
    }

    #[test]
    fn test_injured_flag_without_description_is_allowed() {
        let mut form = football_form();
        form.injured = Some(true);
        let profile = form.collect().unwrap();
        assert!(profile.injury.is_injured());
    }

    #[test]
    fn test_dietary_tags_are_trimmed_and_deduplicated() {
        let mut form = football_form();
        form.dietary_restrictions = vec![
            "vegan".to_string(),
            " vegan ".to_string(),
            "".to_string(),
            "gluten-free".to_string(),
        ];
        form.allergies = Some("  ".to_string());
        let profile = form.collect().unwrap();
        assert_eq!(profile.dietary.restrictions.len(), 2);
        assert!(profile.dietary.allergies.is_none());
    }

    #[test]
    fn test_dietary_tags_ignore_case() {
        let mut form = football_form();
        form.dietary_restrictions = vec![
            "Vegan".to_string(),
            "vegan".to_string(),
            "NO PORK".to_string(),
            "Keto".to_string(),
            "keto".to_string(),
        ];
        let profile = form.collect().unwrap();
        let tags: Vec<&str> = profile.dietary.restrictions.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["Keto", "No pork", "vegan"]);
    }

    #[test]
    fn test_merge_overlays_present_fields() {
        let base = football_form();
        let overrides = ProfileForm {
            position: Some("Striker".to_string()),
            goals: vec!["finishing".to_string()],
            ..Default::default()
        };
        let merged = base.merge(overrides);
        assert_eq!(merged.position.as_deref(), Some("Striker"));
        assert_eq!(merged.goals, vec!["finishing".to_string()]);
        assert_eq!(merged.age, Some(19));
    }

    #[test]
    fn test_form_from_toml() {
        let form: ProfileForm = toml::from_str(
            r#"
sport = "cricket"
position = "Fast Bowler"
age = 22
gender = "Female"
experience_years = 6
training_days = 4
fitness_level = "Advanced"
competition_level = "State"
goals = ["Speed", "Endurance"]
injury = "Hamstring strain"
dietary_restrictions = ["vegan"]
"#,
        )
        .unwrap();
        let profile = form.collect().unwrap();
        assert_eq!(profile.sport, Sport::Cricket);
        assert!(profile.injury.is_injured());
        assert!(profile.dietary.restrictions.contains("vegan"));
    }
}
