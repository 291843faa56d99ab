// src/error.rs

use std::fmt;

/// Fallback shown when the server gives no usable error text.
pub const GENERIC_FAILURE: &str = "Something went wrong while generating your schedule. Please try again.";

/// Fallback shown when the scheduling service cannot be reached at all.
pub const NETWORK_FAILURE: &str = "Could not reach the scheduling service. Please check your connection and try again.";

/// Global Application Error Enum.
/// Every fallible operation in the crate returns this type.
#[derive(Debug)]
pub enum AppError {
    // Caller passed something the form cannot represent (unknown field name, bad script step)
    BadRequest(String),

    // Transport failure: connection refused, timeout, TLS
    Network(String),

    // Non-success HTTP status, with the server's `error` text if it sent one
    Server { status: u16, message: Option<String> },

    // Success status but the body was not the JSON we expect
    InvalidResponse(String),

    // Local file could not be read
    Io(String),

    // Malformed configuration value
    Config(String),
}

impl AppError {
    /// Text for the single blocking notification shown to the user.
    ///
    /// Server-provided messages are surfaced verbatim; everything else maps
    /// to a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Server {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            AppError::Network(_) => NETWORK_FAILURE.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            AppError::Network(msg) => write!(f, "network error: {}", msg),
            AppError::Server { status, message } => match message {
                Some(msg) => write!(f, "server returned {}: {}", status, msg),
                None => write!(f, "server returned {}", status),
            },
            AppError::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
            AppError::Io(msg) => write!(f, "io error: {}", msg),
            AppError::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `reqwest::Error` into the matching variant.
/// Body decoding failures are response problems, everything else is transport.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::Server {
                status: status.as_u16(),
                message: None,
            }
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidResponse(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(err.to_string())
    }
}
