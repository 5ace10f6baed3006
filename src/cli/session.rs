//! Interactive session: one profile, lazily generated modules, cached
//! answers and an inspectable error log for as long as the loop runs.

use anyhow::{bail, Result};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use super::ProfileArgs;
use crate::coach::Coach;
use crate::config::Config;
use crate::export;
use crate::profile::ProfileForm;
use crate::prompts::ModuleKind;
use crate::session::Session;

const RECENT_ERRORS: usize = 5;

const HELP: &str = "\
Commands:
  training | nutrition | tactical   generate (or show the cached) plan
  save <module> [dir]               write the current plan to a .md file
  reload                            re-read the profile file and flags
  log                               show the most recent errors
  cache                             show how many plans are cached
  help                              show this message
  quit                              end the session";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Generate(ModuleKind),
    Save(ModuleKind, Option<PathBuf>),
    Reload,
    Log,
    Cache,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let Some(head) = words.next() else {
            bail!("empty command");
        };
        let command = match head.to_lowercase().as_str() {
            "save" => {
                let Some(module) = words.next() else {
                    bail!("usage: save <module> [dir]");
                };
                SessionCommand::Save(ModuleKind::from_str(module)?, words.next().map(PathBuf::from))
            }
            "reload" => SessionCommand::Reload,
            "log" => SessionCommand::Log,
            "cache" => SessionCommand::Cache,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            other => SessionCommand::Generate(ModuleKind::from_str(other)?),
        };
        Ok(command)
    }
}

pub async fn run(
    profile_args: ProfileArgs,
    config_path: Option<PathBuf>,
    model_override: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let mut config = Config::load_with_path(config_path.as_deref())?;
    if let Some(model) = model_override {
        info!("CLI override: model = {}", model);
        config.llm.model = model;
    }
    let default_dir = config
        .generation
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let coach = Coach::from_config(&config, dry_run)?;
    let reader = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_loop(&coach, &profile_args, default_dir, reader, &mut stdout).await
}

/// Drive a session from `input` until `quit` or end of input.
pub async fn run_loop<R, W>(
    coach: &Coach,
    profile_args: &ProfileArgs,
    default_dir: PathBuf,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = Session::new();
    let mut form = profile_args.load_form()?;
    info!("Session started");
    writeln!(out, "Session started. Type 'help' for commands.")?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match SessionCommand::from_str(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        match command {
            SessionCommand::Generate(module) => {
                match coach.generate_from_form(&mut session, module, &form).await {
                    Ok((_, text)) => writeln!(out, "{}", text)?,
                    Err(e) => writeln!(out, "Error: {}. Fix the profile or try again.", e)?,
                }
            }
            SessionCommand::Save(module, dir) => {
                save_current(&mut session, module, &form, dir.unwrap_or_else(|| default_dir.clone()), out)?;
            }
            SessionCommand::Reload => match profile_args.load_form() {
                Ok(fresh) => {
                    form = fresh;
                    writeln!(out, "Profile reloaded.")?;
                }
                Err(e) => {
                    session.errors.record("Reload profile", format!("{:#}", e));
                    writeln!(out, "Error: {:#}", e)?;
                }
            },
            SessionCommand::Log => {
                if session.errors.is_empty() {
                    writeln!(out, "No errors logged yet")?;
                }
                for entry in session.errors.recent(RECENT_ERRORS) {
                    writeln!(out, "{}", entry)?;
                }
            }
            SessionCommand::Cache => {
                writeln!(out, "{} plan(s) cached this session", session.cache.len())?;
            }
            SessionCommand::Help => writeln!(out, "{}", HELP)?,
            SessionCommand::Quit => break,
        }
    }

    info!("Session ended with {} cached plan(s)", session.cache.len());
    Ok(())
}

fn save_current<W: Write>(
    session: &mut Session,
    module: ModuleKind,
    form: &ProfileForm,
    dir: PathBuf,
    out: &mut W,
) -> Result<()> {
    let profile = match form.collect() {
        Ok(profile) => profile,
        Err(e) => {
            session.errors.record("Validate profile", e.to_string());
            writeln!(out, "Error: {}", e)?;
            return Ok(());
        }
    };
    let Some(text) = session.cache.get(module, &profile) else {
        writeln!(out, "No {} generated for this profile yet; run '{}' first.", module, module.as_str())?;
        return Ok(());
    };
    match export::save_markdown(&dir, module, &profile, text) {
        Ok(path) => writeln!(out, "Saved {}", path.display())?,
        Err(e) => {
            let message = format!("{:#}", e);
            session.errors.record(format!("Save {}", module), message.clone());
            writeln!(out, "Error: {}", message)?;
        }
    }
    Ok(())
}
