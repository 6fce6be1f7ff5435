use thiserror::Error;

/// Errors surfaced to the user. Every variant carries enough context to
/// act on without re-running with more verbosity.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("repository or release not found on GitHub: {repo}@{tag}")]
    NotFound { repo: String, tag: String },

    #[error("release {repo}@{tag} has no downloadable assets")]
    NoAssets { repo: String, tag: String },

    #[error("failed to download '{asset}' from {url}: {reason}")]
    Download {
        asset: String,
        url: String,
        reason: String,
    },

    #[error("checksum mismatch for '{asset}': expected {expected}, got {actual}")]
    Integrity {
        asset: String,
        expected: String,
        actual: String,
    },

    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn filesystem(path: &std::path::Path, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
