use thiserror::Error;

/// Why a single `gh` invocation produced no usable data.
///
/// These never leave the fetcher layer: every source folds them into an
/// empty result after logging.
#[derive(Debug, Error)]
pub enum GhError {
    #[error("gh invocation failed: {stderr}")]
    Process { stderr: String },
    #[error("malformed gh output: {0}")]
    Malformed(#[from] serde_json::Error),
}
