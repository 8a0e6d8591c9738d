use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::models::{CachePolicy, LoggingConfig, ServerConfig};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Server configuration validator
pub struct ServerConfigValidator;

impl ServerConfigValidator {
    /// Validate the entire server configuration
    pub fn validate(config: &ServerConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_content_type(&config.default_content_type) {
            errors.push(e);
        }

        if config.max_body_bytes == 0 {
            errors.push(ValidationError::InvalidField {
                field: "max_body_bytes".to_string(),
                message: "Must be greater than zero".to_string(),
            });
        }

        if let Err(e) = Self::validate_cache_policy(&config.cache) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_logging(&config.logging) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    /// Validate listen address format
    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "Must be in format 'IP:PORT' (e.g., '127.0.0.1:1997' or '0.0.0.0:8080')"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// The default content type ends up in a `Content-Type` header on every response
    fn validate_content_type(content_type: &str) -> ValidationResult<()> {
        if content_type.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "default_content_type".to_string(),
            });
        }
        if http::HeaderValue::from_str(content_type).is_err() {
            return Err(ValidationError::InvalidField {
                field: "default_content_type".to_string(),
                message: format!("'{content_type}' is not a valid header value"),
            });
        }
        Ok(())
    }

    fn validate_cache_policy(policy: &CachePolicy) -> ValidationResult<()> {
        match policy {
            CachePolicy::Lru { capacity: 0 } => Err(ValidationError::InvalidField {
                field: "cache.capacity".to_string(),
                message: "LRU cache capacity must be greater than zero".to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn validate_logging(logging: &LoggingConfig) -> ValidationResult<()> {
        EnvFilter::try_new(&logging.level)
            .map(|_| ())
            .map_err(|e| ValidationError::InvalidField {
                field: "logging.level".to_string(),
                message: e.to_string(),
            })
    }

    /// Format multiple validation errors into a single message
    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        if errors.is_empty() {
            return "No errors".to_string();
        }

        if errors.len() == 1 {
            return errors[0].to_string();
        }

        let mut message = format!("Found {} validation errors:\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_default_config() {
        assert!(ServerConfigValidator::validate(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn validate_rejects_bad_listen_address() {
        let config = ServerConfig {
            listen_addr: "localhost".to_string(),
            ..ServerConfig::default()
        };
        let err = ServerConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn validate_rejects_zero_lru_capacity() {
        let config = ServerConfig {
            cache: CachePolicy::Lru { capacity: 0 },
            ..ServerConfig::default()
        };
        assert!(ServerConfigValidator::validate(&config).is_err());

        let unbounded = ServerConfig {
            cache: CachePolicy::Unbounded,
            ..ServerConfig::default()
        };
        assert!(ServerConfigValidator::validate(&unbounded).is_ok());
    }

    #[test]
    fn validate_rejects_unusable_content_type() {
        let config = ServerConfig {
            default_content_type: "text/plain\n".to_string(),
            ..ServerConfig::default()
        };
        assert!(ServerConfigValidator::validate(&config).is_err());

        let empty = ServerConfig {
            default_content_type: "  ".to_string(),
            ..ServerConfig::default()
        };
        assert!(ServerConfigValidator::validate(&empty).is_err());
    }

    #[test]
    fn validate_aggregates_errors() {
        let config = ServerConfig {
            listen_addr: "nope".to_string(),
            max_body_bytes: 0,
            ..ServerConfig::default()
        };
        let message = ServerConfigValidator::validate(&config)
            .unwrap_err()
            .to_string();
        assert!(message.contains("Found 2 validation errors"));
    }
}
