//! Session time offsets in the `HH:MM:SS` form used by MATB-II scripts.

use crate::error::{Error, Result};

/// Format a second offset as `HH:MM:SS`.
pub fn format_seconds(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Parse a `H:MM:SS` time string into a second offset. Accepts any digit
/// padding, matching the timestamps found in hand-written scenario files.
pub fn parse_time_string(value: &str) -> Result<u32> {
    let invalid = || Error::InvalidTime {
        value: value.to_owned(),
    };
    let mut parts = value.split(':');
    let mut fields = [0u32; 3];
    for field in &mut fields {
        *field = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .ok_or_else(invalid)?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(fields[0] * 3600 + fields[1] * 60 + fields[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded() {
        assert_eq!(format_seconds(0), "00:00:00");
        assert_eq!(format_seconds(65), "00:01:05");
        assert_eq!(format_seconds(3725), "01:02:05");
    }

    #[test]
    fn parses_padded_and_unpadded() {
        assert_eq!(parse_time_string("00:01:05").unwrap(), 65);
        assert_eq!(parse_time_string("0:00:02").unwrap(), 2);
        assert_eq!(parse_time_string("1:02:05").unwrap(), 3725);
    }

    #[test]
    fn round_trips() {
        for seconds in [0, 1, 59, 60, 599, 3600, 7325] {
            assert_eq!(parse_time_string(&format_seconds(seconds)).unwrap(), seconds);
        }
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "12", "1:2", "a:b:c", "1:2:3:4"] {
            assert!(matches!(
                parse_time_string(bad),
                Err(Error::InvalidTime { .. })
            ));
        }
    }
}
