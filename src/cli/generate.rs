use anyhow::{bail, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

use super::ProfileArgs;
use crate::coach::Coach;
use crate::config::Config;
use crate::export;
use crate::profile::ProfileForm;
use crate::prompts::ModuleKind;
use crate::session::Session;

/// Expand "all" or a single module name.
pub fn parse_modules(choice: &str) -> Result<Vec<ModuleKind>> {
    if choice.trim().eq_ignore_ascii_case("all") {
        return Ok(ModuleKind::ALL.to_vec());
    }
    Ok(vec![ModuleKind::from_str(choice)?])
}

pub async fn run(
    module: String,
    profile_args: ProfileArgs,
    output_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    model_override: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let modules = parse_modules(&module)?;

    let mut config = Config::load_with_path(config_path.as_deref())?;
    if let Some(ref model) = model_override {
        info!("CLI override: model = {}", model);
        config.llm.model = model.clone();
    }
    let output_dir = output_dir.or_else(|| config.generation.output_dir.clone());

    // Credentials are checked before the profile is even read
    let coach = Coach::from_config(&config, dry_run)?;

    let form = profile_args.load_form()?;
    let mut session = Session::new();
    let stdout = io::stdout();
    let failures = generate_modules(
        &coach,
        &mut session,
        &modules,
        &form,
        output_dir.as_deref(),
        &mut stdout.lock(),
    )
    .await?;

    if failures > 0 {
        bail!("{} of {} module(s) failed", failures, modules.len());
    }
    Ok(())
}

/// Generate each module in turn, printing the markdown to `out` and saving it
/// under `output_dir` when given. Returns how many modules failed; a failing
/// module does not stop the rest.
pub async fn generate_modules<W: Write>(
    coach: &Coach,
    session: &mut Session,
    modules: &[ModuleKind],
    form: &ProfileForm,
    output_dir: Option<&Path>,
    out: &mut W,
) -> Result<usize> {
    let mut failures = 0;

    for &module in modules {
        match coach.generate_from_form(session, module, form).await {
            Ok((profile, text)) => {
                writeln!(out, "{}\n", text)?;
                if let Some(dir) = output_dir {
                    match export::save_markdown(dir, module, &profile, &text) {
                        Ok(path) => eprintln!("Saved {} to {}", module, path.display()),
                        Err(e) => {
                            let message = format!("{:#}", e);
                            session.errors.record(format!("Save {}", module), message.clone());
                            eprintln!("Error saving {}: {}", module, message);
                            failures += 1;
                        }
                    }
                }
            }
            Err(e) if e.is_recoverable() => {
                error!("{}", e);
                eprintln!("Error generating {}: {}", module, e);
                failures += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(failures)
}
