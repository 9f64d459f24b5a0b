//! Video duration parsing.
//!
//! Two formats show up in the pipeline:
//!
//! - the API's ISO 8601 durations (`PT1H2M3S`, `P1DT2H`, `P0D`), converted to
//!   whole seconds at fetch time
//! - the `HH:MM:SS` / `MM:SS` strings stored in CSVs, converted to minutes for
//!   fitting
//!
//! Anything that does not parse is a missing value (`None`), never zero.

/// Parse `HH:MM:SS` or `MM:SS` into fractional minutes.
pub fn parse_duration_minutes(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    let fields: Vec<u64> = parts
        .iter()
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match fields.as_slice() {
        [h, m, s] => Some(*h as f64 * 60.0 + *m as f64 + *s as f64 / 60.0),
        [m, s] => Some(*m as f64 + *s as f64 / 60.0),
        _ => None,
    }
}

/// Parse an ISO 8601 duration (`P[nW][nD][T[nH][nM][nS]]`) into seconds.
///
/// Fractional seconds are truncated. Years and months are rejected since they
/// have no fixed length.
pub fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let rest = raw.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut in_time = false;
    let mut number = String::new();
    let mut saw_component = false;

    for ch in rest.chars() {
        match ch {
            'T' if !in_time && number.is_empty() => in_time = true,
            '0'..='9' | '.' => number.push(ch),
            unit => {
                if number.is_empty() {
                    return None;
                }
                let value: f64 = number.parse().ok()?;
                number.clear();
                let seconds = match (in_time, unit) {
                    (false, 'W') => 7.0 * 86_400.0,
                    (false, 'D') => 86_400.0,
                    (true, 'H') => 3_600.0,
                    (true, 'M') => 60.0,
                    (true, 'S') => 1.0,
                    _ => return None,
                };
                total = total.checked_add((value * seconds) as u64)?;
                saw_component = true;
            }
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }
    Some(total)
}

/// Format whole seconds as `HH:MM:SS` (hours are not wrapped at 24).
pub fn format_hms(total_seconds: u64) -> String {
    let h = total_seconds / 3_600;
    let m = (total_seconds % 3_600) / 60;
    let s = total_seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_abs_diff_eq!(parse_duration_minutes("01:02:30").unwrap(), 62.5);
        assert_abs_diff_eq!(parse_duration_minutes(" 00:10:00 ").unwrap(), 10.0);
    }

    #[test]
    fn parses_minutes_seconds() {
        assert_abs_diff_eq!(parse_duration_minutes("4:30").unwrap(), 4.5);
    }

    #[test]
    fn unparseable_duration_is_missing() {
        assert_eq!(parse_duration_minutes(""), None);
        assert_eq!(parse_duration_minutes("12"), None);
        assert_eq!(parse_duration_minutes("1:2:3:4"), None);
        assert_eq!(parse_duration_minutes("ab:cd"), None);
        assert_eq!(parse_duration_minutes("-1:30"), None);
    }

    #[test]
    fn parses_api_durations() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3_723));
        assert_eq!(parse_iso8601_duration("PT15M"), Some(900));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("P1DT1S"), Some(86_401));
        assert_eq!(parse_iso8601_duration("P0D"), Some(0));
    }

    #[test]
    fn rejects_malformed_api_durations() {
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("P"), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("T1H"), None);
        assert_eq!(parse_iso8601_duration("PT5"), None);
        assert_eq!(parse_iso8601_duration("P1M"), None);
    }

    #[test]
    fn formats_and_reparses() {
        let hms = format_hms(3_723);
        assert_eq!(hms, "01:02:03");
        assert_abs_diff_eq!(parse_duration_minutes(&hms).unwrap(), 62.05, epsilon = 1e-12);
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(100 * 3_600), "100:00:00");
    }
}
