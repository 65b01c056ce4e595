use std::time::Duration;

/// Parses a delay or timeout setting.
///
/// Accepts humantime strings (`"2s"`, `"1m 30s"`, `"250ms"`) and clock
/// notation `HH:MM:SS[.fraction]` (`"00:00:02"`, `"00:00:01.5"`).
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty duration".to_string());
    }

    if text.contains(':') {
        return parse_clock(text);
    }

    humantime::parse_duration(text).map_err(|e| e.to_string())
}

fn parse_clock(text: &str) -> Result<Duration, String> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("expected HH:MM:SS, got '{}'", text));
    }

    let hours: u64 = parts[0]
        .parse()
        .map_err(|_| format!("invalid hours in '{}'", text))?;
    let minutes: u64 = parts[1]
        .parse()
        .map_err(|_| format!("invalid minutes in '{}'", text))?;
    let seconds: f64 = parts[2]
        .parse()
        .map_err(|_| format!("invalid seconds in '{}'", text))?;

    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return Err(format!("out of range component in '{}'", text));
    }

    let out_of_range = || format!("out of range duration '{}'", text);
    let whole = hours
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60))
        .map(Duration::from_secs)
        .ok_or_else(out_of_range)?;
    whole
        .checked_add(Duration::from_secs_f64(seconds))
        .ok_or_else(out_of_range)
}
