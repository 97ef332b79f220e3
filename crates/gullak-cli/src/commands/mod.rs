//! Command handlers

use anyhow::{bail, Result};

pub mod chat;
pub mod community;
pub mod config;
pub mod dashboard;
pub mod goals;
pub mod invest;

/// Resolve a full id from a prefix against the ids on screen.
pub fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> Result<String> {
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("No entry matches id '{}'", prefix),
        _ => bail!("Ambiguous id '{}' ({} matches)", prefix, matches.len()),
    }
}
