use super::{goals_line, GenerationParams};
use crate::profile::{AthleteProfile, InjuryState};
use crate::util::sanitize_free_text;

/// Heading that only appears in injury-adapted plans.
pub const REHAB_MARKER: &str = "IMPORTANT SAFETY RULES";

/// Heading that only appears in standard performance plans.
pub const STANDARD_MARKER: &str = "WEEK 3-4: INTENSIFICATION";

/// Exercise categories a standard plan asks for and an injury plan must never mention.
pub const HIGH_RISK_CATEGORIES: [&str; 4] = [
    "Power development",
    "High-intensity intervals",
    "Plyometric jump training",
    "Maximal strength testing",
];

const UNSPECIFIED_INJURY: &str = "Unspecified injury";

/// Which training template applies to a profile. Chosen once per request.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingTemplate {
    Standard,
    InjuryAdapted {
        description: String,
        duration: String,
        limitations: String,
    },
}

impl TrainingTemplate {
    pub fn select(profile: &AthleteProfile) -> Self {
        match &profile.injury {
            InjuryState::Healthy => TrainingTemplate::Standard,
            InjuryState::Injured {
                description,
                duration,
                limitations,
            } => {
                let description = sanitize_free_text(description);
                TrainingTemplate::InjuryAdapted {
                    description: if description.is_empty() {
                        UNSPECIFIED_INJURY.to_string()
                    } else {
                        description
                    },
                    duration: duration
                        .as_deref()
                        .map(sanitize_free_text)
                        .unwrap_or_else(|| "Recent".to_string()),
                    limitations: limitations
                        .as_deref()
                        .map(sanitize_free_text)
                        .unwrap_or_else(|| "Pain during activity".to_string()),
                }
            }
        }
    }

    pub fn params(&self) -> GenerationParams {
        match self {
            TrainingTemplate::Standard => GenerationParams {
                temperature: 0.3,
                top_p: 0.8,
                max_output_tokens: 1500,
            },
            TrainingTemplate::InjuryAdapted { .. } => GenerationParams {
                temperature: 0.2,
                top_p: 0.7,
                max_output_tokens: 800,
            },
        }
    }

    pub fn render(&self, profile: &AthleteProfile) -> String {
        let sport = profile.sport.display_name();
        let preamble = format!(
            "You are an elite strength and conditioning coach who designs programs for {} athletes.",
            sport
        );
        match self {
            TrainingTemplate::Standard => standard(&preamble, profile),
            TrainingTemplate::InjuryAdapted {
                description,
                duration,
                limitations,
            } => injury_adapted(&preamble, profile, description, duration, limitations),
        }
    }
}

fn standard(preamble: &str, profile: &AthleteProfile) -> String {
    let sport = profile.sport.display_name();
    format!(
        r#"{preamble}

Create a COMPLETE 4-week training program for:

SPORT: {sport_upper}
POSITION: {position}
AGE: {age} years
EXPERIENCE: {experience} years
TRAINING DAYS: {days}/week
GOALS: {goals}
FITNESS LEVEL: {fitness}

The program MUST include:

WEEK 1-2: BASE BUILDING
- Sport-specific skill drills
- Strength foundation
- Aerobic conditioning
- Mobility work

{marker}
- {risk0}
- {risk1}
- {risk2}
- {risk3}
- Technical refinement
- Mental preparation

For EACH week provide:
1. Daily workout schedule
2. Specific exercises with sets/reps
3. Recovery protocols
4. Nutrition timing advice
5. Progress tracking metrics

Format the answer as markdown with one `##` section per week.
Make it SPECIFIC to {sport} {position}.
"#,
        preamble = preamble,
        sport_upper = sport.to_uppercase(),
        sport = sport,
        position = profile.position,
        age = profile.age,
        experience = profile.experience_years,
        days = profile.training_days,
        goals = goals_line(profile),
        fitness = profile.fitness_level,
        marker = STANDARD_MARKER,
        risk0 = HIGH_RISK_CATEGORIES[0],
        risk1 = HIGH_RISK_CATEGORIES[1],
        risk2 = HIGH_RISK_CATEGORIES[2],
        risk3 = HIGH_RISK_CATEGORIES[3],
    )
}

fn injury_adapted(
    preamble: &str,
    profile: &AthleteProfile,
    description: &str,
    duration: &str,
    limitations: &str,
) -> String {
    let sport = profile.sport.display_name();
    format!(
        r#"{preamble}

Create a SAFE, injury-modified training program for:

SPORT: {sport_upper}
POSITION: {position}
INJURY: {description}
INJURY DURATION: {duration}
LIMITATIONS: {limitations}
AGE: {age} years
TRAINING DAYS: {days}/week
GOALS: {goals}

{marker}:
1. DO NOT recommend exercises that could worsen {description}
2. Leave out explosive, impact-heavy and near-maximal loading entirely
3. Focus on rehabilitation and safe alternatives
4. Include gradual progression
5. Add warning signs to watch for

Create a 3-PHASE RECOVERY PROGRAM:

PHASE 1 (Week 1-2): REHABILITATION
- Pain management
- Range of motion
- Very light activity

PHASE 2 (Week 3-4): MODIFIED TRAINING
- Sport-specific movements at reduced intensity
- Strength without aggravating the injury
- Controlled progression

PHASE 3 (Week 5-6): RETURN PREPARATION
- Sport-specific drills
- Gradual workload increase
- Return-to-play readiness checks

For each phase provide:
1. Daily exercise plan
2. Modifications for {sport}
3. Progression criteria
4. Safety precautions

Format the answer as markdown with one `##` section per phase.
"#,
        preamble = preamble,
        sport_upper = sport.to_uppercase(),
        sport = sport,
        position = profile.position,
        description = description,
        duration = duration,
        limitations = limitations,
        age = profile.age,
        days = profile.training_days,
        goals = goals_line(profile),
        marker = REHAB_MARKER,
    )
}
