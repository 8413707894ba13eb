//! Input validation for hierarchy names and webhook URLs.

use std::fmt;

use url::Url;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Webhook URL is not an absolute http(s) URL.
    InvalidUrl(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::InvalidUrl(msg) => write!(f, "Invalid webhook URL: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum length of a region code.
pub const MAX_REGION_LENGTH: usize = 10;

/// Maximum length of a datacenter code.
pub const MAX_DATACENTER_LENGTH: usize = 10;

/// Maximum length of a rack name.
pub const MAX_RACK_LENGTH: usize = 20;

/// Maximum length of a webhook URL.
pub const MAX_WEBHOOK_URL_LENGTH: usize = 512;

/// Validate a hierarchy or service type name against a length limit.
pub fn validate_name(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(())
}

/// Validate a webhook endpoint.
///
/// The URL must be absolute, use `http` or `https`, carry a host, and fit the
/// storage column.
pub fn validate_webhook_url(webhook_url: &str) -> Result<(), ValidationError> {
    validate_name("webhook_url", webhook_url, MAX_WEBHOOK_URL_LENGTH)?;

    let url = Url::parse(webhook_url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    }

    if url.host_str().is_none() {
        return Err(ValidationError::InvalidUrl("missing host".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("region", "FRA", MAX_REGION_LENGTH).is_ok());
        assert!(matches!(
            validate_name("region", "  ", MAX_REGION_LENGTH),
            Err(ValidationError::Empty(_))
        ));
        assert_eq!(
            validate_name("datacenter", "ABCDEFGHIJK", MAX_DATACENTER_LENGTH),
            Err(ValidationError::TooLong {
                field: "datacenter".to_string(),
                max: 10,
                actual: 11,
            })
        );
    }

    #[test]
    fn test_validate_webhook_url_valid() {
        assert!(validate_webhook_url("https://discord.com/api/webhooks/1/abc").is_ok());
        assert!(validate_webhook_url("http://127.0.0.1:9000/hook").is_ok());
    }

    #[test]
    fn test_validate_webhook_url_invalid() {
        assert!(matches!(
            validate_webhook_url(""),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_webhook_url("not a url"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_webhook_url("ftp://example.com/hook"),
            Err(ValidationError::InvalidUrl(_))
        ));

        let long = format!("https://example.com/{}", "a".repeat(600));
        assert!(matches!(
            validate_webhook_url(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }
}
