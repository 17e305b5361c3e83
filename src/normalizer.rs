use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty follower text")]
    Empty,
    #[error("not a valid follower number: '{0}'")]
    InvalidNumber(String),
}

/// Convert follower text like "10.6K" or "1.2M" to an integer.
///
/// The site renders uppercase suffixes; lowercase is accepted as well.
/// Unsuffixed text must be a plain integer: separators like "1,234" are
/// rejected rather than guessed at.
pub fn normalize(text: &str) -> Result<i64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let invalid = || ParseError::InvalidNumber(trimmed.to_string());

    if let Some(num) = trimmed.strip_suffix(['K', 'k']) {
        let value: f64 = num.trim().parse().map_err(|_| invalid())?;
        // `as` truncates toward zero
        Ok((value * 1_000.0) as i64)
    } else if let Some(num) = trimmed.strip_suffix(['M', 'm']) {
        let value: f64 = num.trim().parse().map_err(|_| invalid())?;
        Ok((value * 1_000_000.0) as i64)
    } else {
        trimmed.parse::<i64>().map_err(|_| invalid())
    }
}
