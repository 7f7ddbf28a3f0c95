use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Every way a pipeline run can fail. None of these are retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider returned HTTP {status}: {body}")]
    Fetch { status: StatusCode, body: String },

    #[error("request to rate provider failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed provider response: {reason}")]
    MalformedResponse { stage: &'static str, reason: String },

    #[error("no exchange rates left to {stage}")]
    EmptyTable { stage: &'static str },

    #[error("can't write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Name of the pipeline stage the error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "config",
            PipelineError::Fetch { .. } | PipelineError::Transport(_) => "fetch",
            PipelineError::MalformedResponse { stage, .. } | PipelineError::EmptyTable { stage } => {
                *stage
            }
            PipelineError::Io { .. } => "export",
        }
    }

    pub(crate) fn malformed(stage: &'static str, reason: impl Into<String>) -> Self {
        PipelineError::MalformedResponse {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_follow_the_pipeline() {
        let err = PipelineError::Fetch {
            status: StatusCode::NOT_FOUND,
            body: "nope".into(),
        };
        assert_eq!(err.stage(), "fetch");
        assert_eq!(err.to_string(), "provider returned HTTP 404 Not Found: nope");

        let err = PipelineError::malformed("fetch", "body is not JSON");
        assert_eq!(err.stage(), "fetch");
        assert_eq!(err.to_string(), "malformed provider response: body is not JSON");
        assert_eq!(PipelineError::malformed("parse", "x").stage(), "parse");

        let err = PipelineError::EmptyTable { stage: "summarize" };
        assert_eq!(err.stage(), "summarize");
        assert_eq!(err.to_string(), "no exchange rates left to summarize");

        let err = PipelineError::io(
            "/missing/out.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.stage(), "export");
        assert_eq!(err.to_string(), "can't write /missing/out.csv: gone");
    }
}
