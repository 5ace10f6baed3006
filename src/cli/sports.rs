use anyhow::Result;
use std::io::{self, Write};

use crate::profile::catalog::{DIETARY_TAGS, SUGGESTED_GOALS};
use crate::profile::{CompetitionLevel, FitnessLevel, Sport};

pub fn run() -> Result<()> {
    let stdout = io::stdout();
    write_catalog(&mut stdout.lock())
}

/// Print every value the profile form accepts.
pub fn write_catalog<W: Write>(out: &mut W) -> Result<()> {
    for sport in Sport::ALL {
        writeln!(out, "{} ({})", sport.display_name(), sport.as_str())?;
        writeln!(out, "  Positions: {}", sport.positions().join(", "))?;
        writeln!(out, "  Common injuries: {}", sport.common_injuries().join(", "))?;
        let split: Vec<String> = sport
            .energy_split()
            .iter()
            .map(|(system, pct)| format!("{} {}%", system, pct))
            .collect();
        writeln!(out, "  Energy systems: {}", split.join(", "))?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Fitness levels: {}",
        FitnessLevel::ALL.iter().map(|l| l.label()).collect::<Vec<_>>().join(", ")
    )?;
    writeln!(
        out,
        "Competition levels: {}",
        CompetitionLevel::ALL.iter().map(|l| l.label()).collect::<Vec<_>>().join(", ")
    )?;
    writeln!(out, "Suggested goals: {}", SUGGESTED_GOALS.join(", "))?;
    writeln!(out, "Dietary tags: {}", DIETARY_TAGS.join(", "))?;
    Ok(())
}
