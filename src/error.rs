use thiserror::Error;

use crate::DecodingError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("decoding error: {0}")]
    Decoding(#[from] DecodingError),

    #[error("adapter error: {0}")]
    Adapter(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn config(msg: impl ToString) -> Error {
        Error::Config(msg.to_string())
    }

    pub fn custom(error: Box<dyn std::error::Error>) -> Error {
        Error::Custom(format!("{error}"))
    }

    /// Requests for heights outside the node's retained range come back either
    /// as 404 or as a 400 complaining about the height
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Http { status: 404, .. } => true,
            Error::Http { status: 400, body } => body.contains("height"),
            _ => false,
        }
    }

    /// Failures that mean the node could not be reached or answered badly,
    /// as opposed to a malformed response
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Http { .. })
    }
}

impl From<Box<dyn std::error::Error>> for Error {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        Error::custom(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_not_found() {
        assert!(Error::NotFound("/blocks/1".into()).is_not_found());
        assert!(
            Error::Http {
                status: 404,
                body: String::new()
            }
            .is_not_found()
        );
        assert!(
            Error::Http {
                status: 400,
                body: "height 5 is not available, lowest height is 100".into()
            }
            .is_not_found()
        );
        assert!(
            !Error::Http {
                status: 500,
                body: "height".into()
            }
            .is_not_found()
        );
        assert!(!Error::Config("x".into()).is_not_found());
    }
}
