use std::io::{self, Write};

use crate::dependents::Repository;

/// Count line followed by one `- <full_name> (<url>)` line per repository.
pub fn write_repositories<W: Write>(
    out: &mut W,
    module: &str,
    repos: &[Repository],
) -> io::Result<()> {
    writeln!(
        out,
        "Found {} downstream repositories using {}:",
        repos.len(),
        module
    )?;
    for repo in repos {
        writeln!(out, "- {} ({})", repo.full_name, repo.url)?;
    }
    Ok(())
}

/// Pretty-printed JSON array of `{ "full_name", "url" }` objects.
pub fn write_json<W: Write>(out: &mut W, repos: &[Repository]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, repos)?;
    writeln!(out)
}
