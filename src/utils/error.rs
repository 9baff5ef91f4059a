use crate::domain::model::VinIssue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourierError {
    #[error("NHTSA request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    #[error("Invalid VIN: {0}")]
    InvalidVin(#[from] VinIssue),

    #[error("VIN decode error: {message}")]
    DecodeError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Io,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI exit code for this severity. `Low` is treated as a warning.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl CourierError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CourierError::ApiError(_) => ErrorCategory::Network,
            CourierError::CsvError(_)
            | CourierError::SerializationError(_)
            | CourierError::DecodeError { .. } => ErrorCategory::Data,
            CourierError::IoError(_) => ErrorCategory::Io,
            CourierError::ConfigValidationError { .. }
            | CourierError::InvalidConfigValueError { .. }
            | CourierError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CourierError::InvalidCoordinate { .. } | CourierError::InvalidVin(_) => {
                ErrorCategory::Input
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常可重試
            CourierError::ApiError(_) => ErrorSeverity::Medium,
            CourierError::CsvError(_)
            | CourierError::SerializationError(_)
            | CourierError::DecodeError { .. }
            | CourierError::InvalidCoordinate { .. }
            | CourierError::InvalidVin(_) => ErrorSeverity::High,
            CourierError::IoError(_)
            | CourierError::ConfigValidationError { .. }
            | CourierError::InvalidConfigValueError { .. }
            | CourierError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CourierError::ApiError(_) => {
                "Check network connectivity or re-run with --offline to use the local tables"
                    .to_string()
            }
            CourierError::CsvError(_) => {
                "Make sure the input CSV has a header row with a 'vin' column".to_string()
            }
            CourierError::IoError(_) => "Check that the file exists and is readable".to_string(),
            CourierError::SerializationError(_) => {
                "The remote service returned an unexpected payload; retry later".to_string()
            }
            CourierError::ConfigValidationError { field, .. }
            | CourierError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' entry in the configuration file", field)
            }
            CourierError::MissingConfigError { field } => {
                format!("Create '{}' or omit --config to run with defaults", field)
            }
            CourierError::InvalidCoordinate { .. } => {
                "Coordinates are 'lat,lng' in degrees, latitude within ±90 and longitude within ±180"
                    .to_string()
            }
            CourierError::InvalidVin(_) => {
                "Re-enter the VIN or try 'courier vin cleanup' on the scanned text".to_string()
            }
            CourierError::DecodeError { .. } => {
                "Enter the vehicle details manually".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CourierError::ApiError(_) => "Could not reach the VIN decoding service".to_string(),
            CourierError::CsvError(e) => format!("Could not process the CSV file: {}", e),
            CourierError::IoError(e) => format!("File access failed: {}", e),
            CourierError::SerializationError(_) => {
                "Received an unreadable response from the VIN decoding service".to_string()
            }
            CourierError::ConfigValidationError { .. }
            | CourierError::InvalidConfigValueError { .. }
            | CourierError::MissingConfigError { .. } => {
                format!("Configuration problem: {}", self)
            }
            CourierError::InvalidCoordinate { message } => {
                format!("Invalid location: {}", message)
            }
            CourierError::InvalidVin(issue) => issue.to_string(),
            CourierError::DecodeError { .. } => {
                "Could not decode this VIN. Please enter vehicle details manually.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CourierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_exit_codes() {
        assert_eq!(ErrorSeverity::Low.exit_code(), 0);
        assert_eq!(ErrorSeverity::Medium.exit_code(), 2);
        assert_eq!(ErrorSeverity::High.exit_code(), 1);
        assert_eq!(ErrorSeverity::Critical.exit_code(), 3);
    }

    #[test]
    fn test_invalid_vin_is_input_error() {
        let err = CourierError::from(VinIssue::Length { actual: 5 });
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.user_friendly_message(),
            "VIN must be 17 characters (currently 5)"
        );
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = CourierError::MissingConfigError {
            field: "courier.toml".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("courier.toml"));
    }
}
