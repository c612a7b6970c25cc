use humansize::{format_size as humansize_format, BINARY};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScaleError {
    #[error("invalid corpus size: measured {measured} bytes, target {target} bytes")]
    InvalidSize { measured: u64, target: u64 },
}

/// Linearly extrapolates token counts measured on `measured_bytes` of text to
/// `target_bytes`, assuming uniform token density. Counts are truncated.
pub fn scale(
    tokens: &[(String, u64)],
    measured_bytes: u64,
    target_bytes: u64,
) -> Result<Vec<(String, u64)>, ScaleError> {
    if measured_bytes == 0 || target_bytes == 0 {
        return Err(ScaleError::InvalidSize {
            measured: measured_bytes,
            target: target_bytes,
        });
    }
    let factor = target_bytes as f64 / measured_bytes as f64;
    Ok(tokens
        .iter()
        .map(|(name, count)| (name.clone(), (*count as f64 * factor) as u64))
        .collect())
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SizeParseError {
    #[error("invalid size format: {0:?}")]
    Malformed(String),
    #[error("size must be greater than zero: {0:?}")]
    NotPositive(String),
}

/// Parses sizes such as `500MB`, `1.5 tb` or `2048` into bytes.
///
/// Units are binary multiples; a bare number is taken as kilobytes.
pub fn parse_size(input: &str) -> Result<u64, SizeParseError> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| SizeParseError::Malformed(input.to_string()))?;

    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "B" => 1,
        "" | "K" | "KB" => 1 << 10,
        "M" | "MB" => 1 << 20,
        "G" | "GB" => 1 << 30,
        "T" | "TB" => 1 << 40,
        _ => return Err(SizeParseError::Malformed(input.to_string())),
    };

    let bytes = (value * multiplier as f64).round();
    if !bytes.is_finite() || bytes < 1.0 {
        return Err(SizeParseError::NotPositive(input.to_string()));
    }
    Ok(bytes as u64)
}

/// Human readable byte count, e.g. `1.50 GiB`.
pub fn format_size(bytes: u64) -> String {
    humansize_format(bytes, BINARY)
}
