use snafu::Snafu;

use crate::CodeId;
use crate::store::StoreError;

/// Commands of the [`CodeListController`](crate::CodeListController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Refresh,
    Generate,
    ToggleUsed,
    DeleteCode,
    DeleteAll,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Refresh => "refresh",
            Operation::Generate => "generate",
            Operation::ToggleUsed => "toggle used",
            Operation::DeleteCode => "delete code",
            Operation::DeleteAll => "delete all",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by the [`CodeListController`](crate::CodeListController).
///
/// None of them is fatal: the controller stays usable after any error.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RedeemCodesError {
    #[snafu(display("{source}"))]
    Store { source: StoreError },

    #[snafu(display("Generated {created} of {requested} redeem codes before failing: {source}"))]
    PartialGenerate {
        created: u32,
        requested: u32,
        source: StoreError,
    },

    #[snafu(display("'{input}' is not a whole number of at least 1"))]
    InvalidCount { input: String },

    #[snafu(display("Type {expected} to confirm"))]
    WrongConfirmation { expected: &'static str },

    #[snafu(display("Redeem code '{id}' does not exist"))]
    NotFound { id: CodeId },

    #[snafu(display("A {operation} is already in progress"))]
    Busy { operation: Operation },

    /// The codes were discarded while the command was in flight. Its result was dropped.
    #[snafu(display("The session ended before the {operation} completed"))]
    SessionEnded { operation: Operation },
}

impl RedeemCodesError {
    /// Bad user input, rejected before any remote call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RedeemCodesError::InvalidCount { .. } | RedeemCodesError::WrongConfirmation { .. }
        )
    }

    /// The remote store failed, or refused the request.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RedeemCodesError::Store { .. } | RedeemCodesError::PartialGenerate { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RedeemCodesError::NotFound { .. })
    }

    /// The command was ignored, as the same operation is still in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, RedeemCodesError::Busy { .. })
    }

    pub fn is_session_ended(&self) -> bool {
        matches!(self, RedeemCodesError::SessionEnded { .. })
    }
}

impl From<StoreError> for RedeemCodesError {
    fn from(source: StoreError) -> Self {
        match source {
            StoreError::NotFound { id } => RedeemCodesError::NotFound { id },
            source => RedeemCodesError::Store { source },
        }
    }
}
