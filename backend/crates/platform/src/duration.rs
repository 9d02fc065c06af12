//! Duration-String Parsing
//!
//! Token lifetimes are configured as compact strings: a numeric prefix
//! followed by a single unit suffix (`s`, `m`, `h`, `d`), e.g. `"15m"`
//! or `"7d"`. Any other shape is a configuration error and must abort
//! startup.

use std::time::Duration;
use thiserror::Error;

/// Duration parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {input:?}: expected <number><s|m|h|d>")]
pub struct DurationParseError {
    /// The rejected input
    pub input: String,
}

/// Parse a duration string of the form `<number><s|m|h|d>`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let reject = || DurationParseError {
        input: input.to_string(),
    };

    let mut chars = input.chars();
    let unit = chars.next_back().ok_or_else(reject)?;
    let digits = chars.as_str();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(reject());
    }

    let value: u64 = digits.parse().map_err(|_| reject())?;
    let secs = match unit {
        's' => value,
        'm' => value * 60,
        'h' => value * 3600,
        'd' => value * 86_400,
        _ => return Err(reject()),
    };

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_durations() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("1s").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "m", "15", "15 m", "m15", "-5m", "1.5h", "15min", "7w"] {
            assert!(parse_duration(bad).is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn test_error_carries_input() {
        let err = parse_duration("7w").unwrap_err();
        assert_eq!(err.input, "7w");
    }
}
