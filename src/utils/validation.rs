use crate::utils::error::{PluginError, Result};
use std::fmt::Display;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn rejected(field: &str, value: impl Display, reason: impl Into<String>) -> PluginError {
    PluginError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Only absolute `http`/`https` URLs can be fetched.
pub fn validate_url(field: &str, raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(rejected(field, raw, "URL cannot be empty"));
    }
    let url = Url::parse(raw).map_err(|e| rejected(field, raw, format!("Invalid URL format: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        let reason = format!("Unsupported URL scheme: {}", url.scheme());
        return Err(rejected(field, raw, reason));
    }
    Ok(url)
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(rejected(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

/// Inclusive bounds check.
pub fn validate_range<T: PartialOrd + Display + Copy>(field: &str, value: T, min: T, max: T) -> Result<()> {
    if value < min || value > max {
        return Err(rejected(field, value, format!("Value must be between {} and {}", min, max)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("url", "https://ipinfo.io/1.2.3.4/json").is_ok());
        assert!(validate_url("url", "http://example.com").is_ok());
        assert!(validate_url("url", "").is_err());
        assert!(validate_url("url", "invalid-url").is_err());
        assert!(validate_url("url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("VAR_EARTHQUAKES_LIMIT", 30, 5, 50).is_ok());
        assert!(validate_range("VAR_EARTHQUAKES_LIMIT", 5, 5, 50).is_ok());
        assert!(validate_range("VAR_EARTHQUAKES_LIMIT", 51, 5, 50).is_err());
        assert!(validate_range("VAR_EARTHQUAKES_RADIUS_MILES", 500.0, 10.0, 500.0).is_ok());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("paths", "~").is_ok());
        assert!(validate_non_empty_string("paths", "   ").is_err());
    }
}
