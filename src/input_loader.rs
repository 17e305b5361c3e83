use std::fs;
use std::path::Path;
use log::info;
use thiserror::Error;

const USERNAME_PREFIX: &str = "Username:";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not read input file {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
}

/// Load usernames from a plain-text list.
///
/// Only lines of the form `Username: <value>` count; everything else is
/// ignored. The value is the text between the first and second colon, so
/// a stray trailing `:comment` does not leak into the username.
///
/// An unreadable file is the one fatal error in the whole pipeline: there
/// is nothing useful to do without an input list.
pub fn load_usernames<P: AsRef<Path>>(path: P) -> Result<Vec<String>, InputError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| InputError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let usernames: Vec<String> = content
        .lines()
        .filter(|line| line.starts_with(USERNAME_PREFIX))
        .filter_map(|line| line.split(':').nth(1))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();

    info!("Loaded {} usernames from {:?}", usernames.len(), path);
    Ok(usernames)
}
