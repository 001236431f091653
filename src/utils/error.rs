use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

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

    #[error("Geocoder error: {message}")]
    GeocoderError { message: String },

    #[error("{entity} not found: {id}")]
    NotFoundError { entity: String, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ServiceError {
    pub fn geocoder(message: impl Into<String>) -> Self {
        ServiceError::GeocoderError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::ConfigValidationError { .. }
            | ServiceError::InvalidConfigValueError { .. }
            | ServiceError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ServiceError::ApiError(_) | ServiceError::GeocoderError { .. } => ErrorCategory::Network,
            ServiceError::CsvError(_) | ServiceError::NotFoundError { .. } => ErrorCategory::Data,
            ServiceError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data if matches!(self, ServiceError::NotFoundError { .. }) => {
                ErrorSeverity::Low
            }
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ServiceError::ApiError(_) | ServiceError::GeocoderError { .. } => {
                "Check network connectivity, the geocoder endpoint and its API key".to_string()
            }
            ServiceError::CsvError(_) => {
                "Check the CSV header and that every row has the expected columns".to_string()
            }
            ServiceError::IoError(_) => "Check that the file exists and is readable".to_string(),
            ServiceError::ConfigValidationError { field, .. }
            | ServiceError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in the configuration file", field)
            }
            ServiceError::MissingConfigError { field } => {
                format!("Add the '{}' setting to the configuration file", field)
            }
            ServiceError::NotFoundError { .. } => "Verify the id and retry".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Geocoding service unavailable: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
