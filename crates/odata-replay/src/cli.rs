// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line front end.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use odata_config::{ConfigService, WriterProfile};
use odata_config_fs::FsConfigStore;
use tracing::info;

use crate::replay::{check, replay, replay_async};
use crate::script::Script;
use crate::trace::Trace;

/// Replay OData writer scripts and compare hook traces.
#[derive(Parser, Debug)]
#[command(name = "odata-replay", author, version, about)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a script and print its hook trace as JSON
    Run {
        /// Path to the script
        script: PathBuf,
        /// Use the asynchronous writer API
        #[arg(long = "async")]
        use_async: bool,
        /// Replace the script's profile with a saved one
        #[arg(long)]
        profile: Option<String>,
        /// Directory holding saved profiles (default: the user config dir)
        #[arg(long, requires = "profile")]
        config_dir: Option<PathBuf>,
    },
    /// Replay a script and compare its trace with an expected one
    Check {
        /// Path to the script
        script: PathBuf,
        /// Path to the expected trace JSON
        #[arg(long)]
        expect: PathBuf,
        /// Use the asynchronous writer API
        #[arg(long = "async")]
        use_async: bool,
        /// Replace the script's profile with a saved one
        #[arg(long)]
        profile: Option<String>,
        /// Directory holding saved profiles (default: the user config dir)
        #[arg(long, requires = "profile")]
        config_dir: Option<PathBuf>,
    },
}

/// Parse arguments and run the requested subcommand.
pub async fn entrypoint() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            script,
            use_async,
            profile,
            config_dir,
        } => {
            let profile = saved_profile(profile.as_deref(), config_dir.as_deref())?;
            let trace = run_script(&script, use_async, profile.as_ref()).await?;
            let mut out = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &trace).context("failed to write trace")?;
            writeln!(out)?;
        }
        Commands::Check {
            script,
            expect,
            use_async,
            profile,
            config_dir,
        } => {
            let profile = saved_profile(profile.as_deref(), config_dir.as_deref())?;
            let actual = run_script(&script, use_async, profile.as_ref()).await?;
            let json = std::fs::read_to_string(&expect)
                .with_context(|| format!("failed to read {}", expect.display()))?;
            let expected = Trace::from_json(&json)
                .with_context(|| format!("failed to parse {}", expect.display()))?;
            check(&actual, &expected)
                .with_context(|| format!("{} does not match {}", script.display(), expect.display()))?;
            info!(events = actual.events.len(), outcome = %actual.outcome, "trace matches");
        }
    }
    Ok(())
}

fn saved_profile(name: Option<&str>, config_dir: Option<&Path>) -> Result<Option<WriterProfile>> {
    name.map(|name| load_profile(name, config_dir)).transpose()
}

/// Load the profile saved as `name`, from `config_dir` or the user config directory.
pub fn load_profile(name: &str, config_dir: Option<&Path>) -> Result<WriterProfile> {
    let store = match config_dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    }
    .context("failed to open the profile store")?;
    let base = store.base().to_path_buf();
    ConfigService::new(store)
        .load_profile(name)
        .with_context(|| format!("failed to load profile '{name}'"))?
        .with_context(|| format!("profile '{name}' not found in {}", base.display()))
}

/// Load and replay the script at `path`, optionally under a different profile.
pub async fn run_script(
    path: &Path,
    use_async: bool,
    profile: Option<&WriterProfile>,
) -> Result<Trace> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut script =
        Script::from_json(&json).with_context(|| format!("failed to parse {}", path.display()))?;
    if let Some(profile) = profile {
        info!(path = %path.display(), "replacing script profile");
        script.profile = profile.clone();
    }
    let trace = if use_async {
        replay_async(&script).await
    } else {
        replay(&script)
    };
    trace.with_context(|| format!("failed to replay {}", path.display()))
}
