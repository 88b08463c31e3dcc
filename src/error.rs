use std::time::Duration;

use thiserror::Error;

/// Why a single attempt produced no usable response.
///
/// These never stop a run: the pool logs them and counts the pair as a failure.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("command exited with {status}: {output}")]
    ExitStatus {
        status: std::process::ExitStatus,
        output: String,
    },
}
