//! # Engine Error Type
//!
//! Unified error surface for engine operations.
//!
//! ## Error Taxonomy
//! ```text
//! Validation      - bad input, rejected before any I/O     (caller fixes input)
//! Business        - rule violation with remediation detail (caller decides)
//! Conflict        - lost race on a guarded write; reported AS the business
//!                   error the guard protects (no separate lock-error type)
//! Infrastructure  - store unreachable / timeout; the operation's fate is
//!                   unknown and MUST NOT be read as success
//! ```
//!
//! Every error exposes a machine-checkable [`ErrorKind`] plus a human-readable
//! Display message. The engine never formats presentation strings beyond that.

use serde::Serialize;
use thiserror::Error;

use caja_core::{CoreError, ValidationError};
use caja_db::DbError;

/// Error returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business-rule or validation failure from the domain layer.
    #[error(transparent)]
    Business(#[from] CoreError),

    /// Infrastructure failure from the persistence layer.
    #[error(transparent)]
    Storage(#[from] DbError),
}

/// Machine-checkable error kinds for hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input validation failed; correct the input and resubmit.
    Validation,

    /// A referenced entity does not exist.
    NotFound,

    /// Not enough stock at the location.
    InsufficientStock,

    /// Customer credit cannot cover the requested debit.
    InsufficientCredit,

    /// Seller has no open shift at the location.
    NoOpenShift,

    /// Seller already has an open shift.
    ShiftAlreadyOpen,

    /// Shift was already closed.
    ShiftAlreadyClosed,

    /// Location is unknown or not operating.
    LocationInactive,

    /// Payment-method rule violation.
    InvalidPayment,

    /// Storage-layer failure; the operation's outcome is unknown.
    Infrastructure,
}

impl EngineError {
    /// The machine-checkable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Business(err) => match err {
                CoreError::Validation(_) => ErrorKind::Validation,
                CoreError::ProductNotFound(_)
                | CoreError::CustomerNotFound(_)
                | CoreError::ShiftNotFound(_) => ErrorKind::NotFound,
                CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
                CoreError::InsufficientCredit { .. } => ErrorKind::InsufficientCredit,
                CoreError::NoOpenShift { .. } => ErrorKind::NoOpenShift,
                CoreError::ShiftAlreadyOpen { .. } => ErrorKind::ShiftAlreadyOpen,
                CoreError::ShiftAlreadyClosed(_) => ErrorKind::ShiftAlreadyClosed,
                CoreError::LocationInactive(_) => ErrorKind::LocationInactive,
                CoreError::InvalidPayment { .. } => ErrorKind::InvalidPayment,
            },
            EngineError::Storage(err) => match err {
                DbError::NotFound { .. } => ErrorKind::NotFound,
                _ => ErrorKind::Infrastructure,
            },
        }
    }

    /// Whether the outcome of the failed operation is unknown (the caller
    /// must verify before retrying).
    pub fn is_infrastructure(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

/// Validation failures are business errors with kind VALIDATION.
impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Business(CoreError::Validation(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
