use crate::profile::AthleteProfile;

const FOCUS_AREAS: [&str; 8] = [
    "Position-specific responsibilities",
    "Game reading and decision making",
    "Technical skill improvements",
    "Mental preparation strategies",
    "Match day routines",
    "Opponent analysis methods",
    "Communication with teammates",
    "Common mistakes to avoid",
];

pub(super) fn render(profile: &AthleteProfile) -> String {
    let sport = profile.sport.display_name();
    let areas = FOCUS_AREAS
        .iter()
        .enumerate()
        .map(|(i, area)| format!("{}. {}", i + 1, area))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an experienced {sport} head coach and match analyst.

Provide detailed tactical coaching advice for:

SPORT: {sport_upper}
POSITION: {position}
EXPERIENCE: {experience} years
LEVEL: {level}

Cover these areas:
{areas}

Pitch the advice at {level} level competition.
Format the answer as markdown with one `##` section per area.
Provide SPECIFIC examples for {sport} {position}.
"#,
        sport = sport,
        sport_upper = sport.to_uppercase(),
        position = profile.position,
        experience = profile.experience_years,
        level = profile.competition_level,
        areas = areas,
    )
}
