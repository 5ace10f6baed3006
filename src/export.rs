//! Saving generated plans as markdown files.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::profile::AthleteProfile;
use crate::prompts::ModuleKind;
use crate::util::slugify;

/// `training_plan_cricket_fast-bowler.md` and friends.
pub fn file_name(module: ModuleKind, profile: &AthleteProfile) -> String {
    format!(
        "{}_{}_{}.md",
        module.file_stem(),
        profile.sport.as_str(),
        slugify(&profile.position)
    )
}

/// Write `text` into `dir`, creating the directory if needed. The file is
/// written to a temporary sibling first and renamed into place.
pub fn save_markdown(
    dir: &Path,
    module: ModuleKind,
    profile: &AthleteProfile,
    text: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(file_name(module, profile));
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(text.as_bytes())
        .context("Failed to write markdown")?;
    if !text.ends_with('\n') {
        tmp.write_all(b"\n").context("Failed to write markdown")?;
    }
    tmp.persist(&path)
        .with_context(|| format!("Failed to save {}", path.display()))?;

    info!("Saved {} to {}", module, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::fixtures;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_uses_md_extension() {
        let profile = fixtures::profile("cricket", "Wicket-Keeper");
        assert_eq!(
            file_name(ModuleKind::Training, &profile),
            "training_plan_cricket_wicket-keeper.md"
        );
        let profile = fixtures::profile("volleyball", "Outside Hitter");
        assert_eq!(
            file_name(ModuleKind::Tactical, &profile),
            "tactical_advice_volleyball_outside-hitter.md"
        );
    }

    #[test]
    fn test_save_markdown_writes_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("plans");
        let profile = fixtures::profile("kabaddi", "Raider");

        let path = save_markdown(&out, ModuleKind::Nutrition, &profile, "## Monday").unwrap();

        assert_eq!(path, out.join("nutrition_plan_kabaddi_raider.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "## Monday\n");
    }

    #[test]
    fn test_save_markdown_overwrites() {
        let dir = TempDir::new().unwrap();
        let profile = fixtures::profile("kabaddi", "Raider");
        save_markdown(dir.path(), ModuleKind::Tactical, &profile, "old\n").unwrap();
        let path = save_markdown(dir.path(), ModuleKind::Tactical, &profile, "new\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
