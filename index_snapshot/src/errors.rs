use thiserror::Error;

use crate::artifacts::errors::StoreError;
use crate::composite::CompositeError;

/// Hard failures of a snapshot run.
///
/// Transient upstream emptiness is not an error — it surfaces as
/// [`SnapshotOutcome::NoData`](crate::snapshot::SnapshotOutcome). Only an
/// unusable normalization reference and persistence failures abort a run.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The base-date reference could not be established.
    #[error(transparent)]
    Reference(#[from] CompositeError),

    /// An artifact could not be written (or an unexpected read failure).
    #[error(transparent)]
    Store(#[from] StoreError),
}
