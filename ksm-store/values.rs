use k8s_openapi::chrono::{DateTime, Utc};

#[cfg(test)]
#[path = "./values.tests.rs"]
mod values_tests;

/// Parses kubernetes quantity, e.g. `250m`, `5Gi` or `1e3`.
pub fn parse_quantity(value: &str) -> Option<f64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
        .unwrap_or(value.len());
    let (number, suffix) = value.split_at(split);
    let number = number.parse::<f64>().ok()?;

    let scaled = match suffix {
        "" => number,
        "Ki" => number * 1024_f64,
        "Mi" => number * 1024_f64.powi(2),
        "Gi" => number * 1024_f64.powi(3),
        "Ti" => number * 1024_f64.powi(4),
        "Pi" => number * 1024_f64.powi(5),
        "Ei" => number * 1024_f64.powi(6),
        "n" => number / 1e9,
        "u" => number / 1e6,
        "m" => number / 1e3,
        "k" => number * 1e3,
        "M" => number * 1e6,
        "G" => number * 1e9,
        "T" => number * 1e12,
        "P" => number * 1e15,
        "E" => number * 1e18,
        exponent if exponent.starts_with(['e', 'E']) => {
            let exponent = exponent[1..].parse::<i32>().ok()?;
            if exponent < 0 {
                number / 10_f64.powi(-exponent)
            } else {
                number * 10_f64.powi(exponent)
            }
        },
        _ => return None,
    };

    Some(scaled)
}

/// Parses RFC 3339 timestamp and returns it as unix time in seconds.
pub fn parse_timestamp(value: &str) -> Option<f64> {
    let timestamp = DateTime::parse_from_rfc3339(value).ok()?.with_timezone(&Utc);
    Some(timestamp_seconds(&timestamp))
}

/// Returns unix time in seconds, including the fractional part.
pub fn timestamp_seconds(timestamp: &DateTime<Utc>) -> f64 {
    timestamp.timestamp() as f64 + f64::from(timestamp.timestamp_subsec_nanos()) / 1e9
}

/// Parses percentage, e.g. `28%` is `0.28`.
pub fn parse_percentage(value: &str) -> Option<f64> {
    let number = value.strip_suffix('%')?.parse::<f64>().ok()?;
    Some(number / 100.0)
}

/// Parses boolean the way kubernetes tooling does, `1`, `t` and `True` are all `true`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses duration string like `1h30m45s` or `500ms` and returns it in seconds.
pub fn parse_duration(value: &str) -> Option<f64> {
    let (negative, mut rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    if rest == "0" {
        return Some(0.0);
    }

    if rest.is_empty() {
        return None;
    }

    let mut total = 0.0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = rest[..number_end].parse::<f64>().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        total += match &rest[..unit_end] {
            "ns" => number / 1e9,
            "us" | "µs" | "μs" => number / 1e6,
            "ms" => number / 1e3,
            "s" => number,
            "m" => number * 60.0,
            "h" => number * 3600.0,
            _ => return None,
        };
        rest = &rest[unit_end..];
    }

    Some(if negative { -total } else { total })
}
