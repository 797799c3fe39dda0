use snafu::{Backtrace, Snafu};

/// Errors raised by the artifact store.
///
/// Read-side conditions (`Missing`, `SchemaMismatch`) are recoverable: the
/// orchestrator falls back to recomputing from source. Write-side failures
/// are fatal to the run, since a computed result that cannot be recorded must
/// be surfaced.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    /// An artifact could not be written (file I/O).
    #[snafu(display("Failed to write artifact {path}: {source}"))]
    Write {
        path: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// An artifact payload could not be serialized.
    #[snafu(display("Failed to encode artifact {path}: {message}"))]
    Encode {
        path: String,
        message: String,
        backtrace: Backtrace,
    },

    /// The artifact is absent, unreadable, or holds no usable rows.
    #[snafu(display("Artifact {path} is missing or unusable"))]
    Missing { path: String },

    /// The artifact exists but no column satisfies a required field's
    /// aliases.
    #[snafu(display("Artifact {path} has no column for required field '{field}'"))]
    SchemaMismatch { path: String, field: &'static str },
}

impl StoreError {
    /// Read-side conditions the orchestrator recovers from by recomputing
    /// from source.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::Missing { .. } | StoreError::SchemaMismatch { .. }
        )
    }
}
