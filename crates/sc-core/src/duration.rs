use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::error::ScriptError;

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| {
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(ms|s)?\s*$").expect("duration regex must compile")
    })
}

/// Parses a script duration literal: bare seconds (`1.5`), explicit seconds
/// (`1.5s`) or milliseconds (`300ms`). Negative values cannot be written.
pub fn parse_duration(text: &str) -> Result<Duration, ScriptError> {
    let invalid = || {
        ScriptError::new(
            "SCRIPT_DURATION_INVALID",
            format!(
                "\"{}\" is not a duration; expected seconds like \"1.5\" or \"300ms\".",
                text
            ),
        )
    };
    let captures = duration_regex().captures(text).ok_or_else(invalid)?;
    let value: f64 = captures[1].parse().map_err(|_| invalid())?;
    let seconds = match captures.get(2).map(|unit| unit.as_str()) {
        Some("ms") => value / 1000.0,
        _ => value,
    };
    if !seconds.is_finite() {
        return Err(invalid());
    }
    Ok(Duration::from_secs_f64(seconds))
}
