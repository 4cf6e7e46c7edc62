//! Error types shared by the query pipeline, the formatter and the flattener.

use std::fmt;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
    #[error("malformed {kind} row at index {index}: expected {expected} fields, got {actual}")]
    RowShape {
        kind: &'static str,
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("cannot flatten document: {0}")]
    Flatten(String),
}

/// A parameter lookup that had no value in the parameter index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MissingParam {
    pub iteration_id: String,
    pub arg: String,
}

impl fmt::Display for MissingParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.iteration_id, self.arg)
    }
}

/// Failures while joining metric rows with parameter rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("no matching params found")]
    NoMatchingParams,
    #[error("no value for {} iteration/param pair(s): {}", .0.len(), join_missing(.0))]
    Unmatched(Vec<MissingParam>),
    #[error("conflicting values for param '{arg}' in iteration '{iteration_id}'")]
    Duplicate { iteration_id: String, arg: String },
}

fn join_missing(missing: &[MissingParam]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_lists_every_pair() {
        let err = CorrelationError::Unmatched(vec![
            MissingParam { iteration_id: "i2".into(), arg: "threads".into() },
            MissingParam { iteration_id: "i3".into(), arg: "bs".into() },
        ]);
        assert_eq!(
            err.to_string(),
            "no value for 2 iteration/param pair(s): i2/threads, i3/bs"
        );
    }

    #[test]
    fn test_correlation_error_is_transparent() {
        let err: Error = CorrelationError::NoMatchingParams.into();
        assert_eq!(err.to_string(), "no matching params found");
    }
}
