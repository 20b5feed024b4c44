use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Provider error ({status}): {message}")]
    Provider {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Lookup not found: {0}")]
    LookupNotFound(String),

    #[error("Clock {clock_id} not ready after {attempts} polls")]
    ClockAdvanceTimeout { clock_id: String, attempts: u32 },

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl AppError {
    /// Short, stable name of the error kind for log entries.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Provider { .. } => "provider",
            AppError::Http(_) => "http",
            AppError::Decode(_) => "decode",
            AppError::LookupNotFound(_) => "lookup_not_found",
            AppError::ClockAdvanceTimeout { .. } => "clock_advance_timeout",
            AppError::MalformedData(_) => "malformed_data",
            AppError::ConfigError(_) => "config",
            AppError::Io(_) => "io",
            AppError::InternalError(_) => "internal",
        }
    }

    /// Process exit code for this error, following sysexits(3) where one fits.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Provider { .. } | AppError::Http(_) => 69,
            AppError::Decode(_) | AppError::LookupNotFound(_) | AppError::MalformedData(_) => 65,
            AppError::ClockAdvanceTimeout { .. } => 75,
            AppError::ConfigError(_) => 78,
            AppError::Io(_) => 74,
            AppError::InternalError(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        let timeout = AppError::ClockAdvanceTimeout {
            clock_id: "clock_1".to_string(),
            attempts: 3,
        };
        assert_eq!(timeout.exit_code(), 75);
        assert_eq!(timeout.kind(), "clock_advance_timeout");

        let lookup = AppError::LookupNotFound("coupon".to_string());
        assert_eq!(lookup.exit_code(), 65);

        let provider = AppError::Provider {
            status: 402,
            code: Some("card_declined".to_string()),
            message: "Your card was declined.".to_string(),
        };
        assert_eq!(provider.exit_code(), 69);

        let config = AppError::ConfigError(anyhow::anyhow!("missing key"));
        assert_eq!(config.exit_code(), 78);
    }

    #[test]
    fn test_timeout_message_names_clock() {
        let err = AppError::ClockAdvanceTimeout {
            clock_id: "clock_abc".to_string(),
            attempts: 150,
        };
        assert_eq!(err.to_string(), "Clock clock_abc not ready after 150 polls");
    }
}
