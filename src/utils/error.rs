use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Command `{command}` failed with status {status}: {stderr}")]
    Command {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("Missing dependency: {name}")]
    MissingDependency { name: String, hint: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value `{value}` for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Critical => 1,
            _ => 0,
        }
    }
}

impl PluginError {
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        PluginError::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PluginError::ConfigError {
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PluginError::MissingDependency { .. } => ErrorSeverity::Critical,
            PluginError::Http(_) | PluginError::HttpStatus { .. } => ErrorSeverity::Medium,
            PluginError::InvalidConfigValueError { .. } | PluginError::MissingConfigError { .. } => {
                ErrorSeverity::Low
            }
            _ => ErrorSeverity::High,
        }
    }

    /// Short message suitable for a single menu line.
    pub fn user_friendly_message(&self) -> String {
        match self {
            PluginError::Http(e) if e.is_timeout() => "Request timed out".to_string(),
            PluginError::Http(_) => "Network request failed".to_string(),
            PluginError::HttpStatus { status, .. } => format!("Server returned HTTP {}", status),
            PluginError::Command { command, .. } => format!("Failed to execute \"{}\"", command),
            PluginError::Parse { what, .. } => format!("Failed to parse {}", what),
            PluginError::MissingDependency { name, .. } => format!("{} isn't installed", name),
            PluginError::InvalidConfigValueError { field, value, .. } => {
                format!("Invalid value \"{}\" for {}", value, field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PluginError::MissingDependency { hint, .. } => hint.clone(),
            PluginError::Http(_) | PluginError::HttpStatus { .. } => {
                "Check the network connection; the next refresh will try again".to_string()
            }
            PluginError::Io(_) => "Check that the configuration directory is writable".to_string(),
            PluginError::InvalidConfigValueError { .. } | PluginError::MissingConfigError { .. } => {
                "Fix or delete the plugin's .vars.json file".to_string()
            }
            PluginError::Command { .. } => "Run the command in a terminal to see the full error".to_string(),
            _ => "Run the plugin with --verbose for details".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_is_critical() {
        let err = PluginError::MissingDependency {
            name: "Homebrew".to_string(),
            hint: "Install it from https://brew.sh".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().exit_code(), 1);
        assert_eq!(err.user_friendly_message(), "Homebrew isn't installed");
        assert_eq!(err.recovery_suggestion(), "Install it from https://brew.sh");
    }

    #[test]
    fn test_rendered_failures_exit_cleanly() {
        let err = PluginError::HttpStatus {
            url: "https://example.com".to_string(),
            status: 503,
        };
        assert_eq!(err.severity().exit_code(), 0);
        assert_eq!(err.user_friendly_message(), "Server returned HTTP 503");
    }
}
