//! Enumerated values offered by the profile form: sports and their positions,
//! tiers, and the dietary restriction tags.

use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Cricket,
    Football,
    Kabaddi,
    Volleyball,
}

impl Sport {
    pub const ALL: [Sport; 4] = [
        Sport::Cricket,
        Sport::Football,
        Sport::Kabaddi,
        Sport::Volleyball,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Cricket => "cricket",
            Sport::Football => "football",
            Sport::Kabaddi => "kabaddi",
            Sport::Volleyball => "volleyball",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sport::Cricket => "Cricket",
            Sport::Football => "Football",
            Sport::Kabaddi => "Kabaddi",
            Sport::Volleyball => "Volleyball",
        }
    }

    pub fn positions(&self) -> &'static [&'static str] {
        match self {
            Sport::Cricket => &[
                "Batsman",
                "Fast Bowler",
                "Spin Bowler",
                "Wicket-Keeper",
                "All-rounder",
            ],
            Sport::Football => &["Goalkeeper", "Defender", "Midfielder", "Winger", "Striker"],
            Sport::Kabaddi => &["Raider", "Corner Defender", "Cover Defender", "All-rounder"],
            Sport::Volleyball => &["Setter", "Outside Hitter", "Middle Blocker", "Opposite", "Libero"],
        }
    }

    pub fn common_injuries(&self) -> &'static [&'static str] {
        match self {
            Sport::Cricket => &[
                "Hamstring strain",
                "Shoulder impingement",
                "Lower back pain",
                "Ankle sprain",
                "Side strain",
                "Rotator cuff tear",
            ],
            Sport::Football => &[
                "Hamstring strain",
                "ACL tear",
                "Ankle sprain",
                "Groin strain",
                "Calf strain",
                "Concussion",
            ],
            Sport::Kabaddi => &[
                "Knee ligament tear",
                "Ankle sprain",
                "Shoulder dislocation",
                "Concussion",
                "Finger fracture",
                "Groin strain",
            ],
            Sport::Volleyball => &[
                "Jumper's knee",
                "Ankle sprain",
                "Shoulder pain",
                "Rotator cuff injury",
                "Finger injury",
                "Back pain",
            ],
        }
    }

    /// Percentage split between aerobic, anaerobic and power energy systems.
    pub fn energy_split(&self) -> [(&'static str, u8); 3] {
        let (aerobic, anaerobic, power) = match self {
            Sport::Cricket => (60, 30, 10),
            Sport::Football => (55, 35, 10),
            Sport::Kabaddi => (40, 50, 10),
            Sport::Volleyball => (50, 40, 10),
        };
        [
            ("Aerobic", aerobic),
            ("Anaerobic", anaerobic),
            ("Power", power),
        ]
    }

    /// Canonical spelling of `position` for this sport, matched case-insensitively.
    pub fn canonical_position(&self, position: &str) -> Option<&'static str> {
        let wanted = position.trim();
        self.positions()
            .iter()
            .copied()
            .find(|p| p.eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Sport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cricket" => Ok(Sport::Cricket),
            "football" | "soccer" => Ok(Sport::Football),
            "kabaddi" => Ok(Sport::Kabaddi),
            "volleyball" => Ok(Sport::Volleyball),
            _ => bail!(
                "unsupported sport '{}' (expected one of: cricket, football, kabaddi, volleyball)",
                s
            ),
        }
    }
}

/// Defines a closed set of labelled tiers with case-insensitive parsing.
macro_rules! tier_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let labels: Vec<&str> = $name::ALL.iter().map(|v| v.label()).collect();
                        anyhow::anyhow!(
                            "unknown {} '{}' (expected one of: {})",
                            $what,
                            s,
                            labels.join(", ")
                        )
                    })
            }
        }
    };
}

tier_enum!(FitnessLevel, "fitness level", {
    Beginner => "Beginner",
    Intermediate => "Intermediate",
    Advanced => "Advanced",
    Elite => "Elite",
});

tier_enum!(CompetitionLevel, "competition level", {
    Recreational => "Recreational",
    School => "School",
    Club => "Club",
    State => "State",
    National => "National",
    Professional => "Professional",
});

tier_enum!(Gender, "gender", {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

/// Restriction tags offered by the form. Any other non-blank tag is accepted
/// as-is; these are the ones listed by `coachbot sports`.
pub const DIETARY_TAGS: &[&str] = &[
    "vegetarian",
    "vegan",
    "gluten-free",
    "No red meat",
    "No pork",
    "No poultry",
    "No fish",
    "No seafood",
    "No eggs",
    "No milk",
    "No cheese",
    "No yogurt",
    "No onions",
    "No garlic",
    "No potatoes",
    "No root vegetables (carrots, beets, etc.)",
    "No mushrooms",
    "No gluten",
    "No nuts",
    "No soy",
    "No legumes",
];

/// Listed spelling of a restriction tag, matched case-insensitively.
pub fn canonical_dietary_tag(tag: &str) -> Option<&'static str> {
    let wanted = tag.trim();
    DIETARY_TAGS
        .iter()
        .copied()
        .find(|t| t.eq_ignore_ascii_case(wanted))
}

/// Training goals suggested by the form.
pub const SUGGESTED_GOALS: &[&str] = &[
    "Strength",
    "Speed",
    "Endurance",
    "Skill",
    "Injury Prevention",
    "Weight Management",
    "Competition",
];
