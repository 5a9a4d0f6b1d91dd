use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::env;

use crate::dependents::DEFAULT_MANIFEST;

/// Find downstream repositories that depend on a module, using GitHub code search.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Searches GitHub for manifest files that mention a module and lists the repositories they belong to, one line per repository."
)]
pub struct Args {
    /// Module path to search for (e.g. go.opentelemetry.io/otel).
    #[clap(short, long, default_value = "")]
    pub module: String,

    /// Maximum number of search hits requested from GitHub.
    #[clap(short, long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,

    /// GitHub API token. Falls back to the GITHUB_TOKEN environment variable.
    #[clap(short, long)]
    pub token: Option<String>,

    /// Manifest filename that must contain the module path.
    #[clap(short = 'f', long, default_value = DEFAULT_MANIFEST)]
    pub manifest: String,

    /// Print the repositories as a JSON array.
    #[clap(long)]
    pub json: bool,
}

impl Args {
    /// Reject an empty `--module` the way clap rejects a missing argument.
    pub fn validate(&self) -> Result<(), clap::Error> {
        if self.module.is_empty() {
            return Err(Args::command().error(
                ErrorKind::MissingRequiredArgument,
                "usage: downstream-dependents --module <module-path>",
            ));
        }
        Ok(())
    }

    /// Token from `--token`, otherwise from `GITHUB_TOKEN`.
    pub fn resolve_token(&self) -> Option<String> {
        pick_token(self.token.as_deref(), env::var("GITHUB_TOKEN").ok())
    }
}

fn pick_token(flag: Option<&str>, from_env: Option<String>) -> Option<String> {
    match flag {
        Some(t) if !t.trim().is_empty() => Some(t.to_string()),
        _ => match from_env {
            Some(token) if !token.trim().is_empty() => Some(token),
            _ => None,
        },
    }
}
