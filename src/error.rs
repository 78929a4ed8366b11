//! Error type for join counter contract violations.

use thiserror::Error;

/// Errors reported by [`JoinCounter`](crate::JoinCounter) and
/// [`JoinState`](crate::JoinState).
///
/// Every variant is a caller contract violation. The counter's state is left
/// untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// A construction or completion argument was out of range.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument
        reason: String,
    },

    /// A result slot was reported a second time.
    #[error("slot {index} already reported its completion")]
    DuplicateCompletion {
        /// Index of the slot that was reported twice
        index: usize,
    },

    /// A completion arrived after the join finished or was cancelled.
    #[error("join counter has already completed")]
    CounterAlreadyComplete,

    /// The join was cancelled before every sub-operation reported.
    #[error("join counter was cancelled")]
    Cancelled,
}

impl JoinError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        JoinError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            JoinError::invalid("total must not be negative").to_string(),
            "invalid argument: total must not be negative"
        );
        assert_eq!(
            JoinError::DuplicateCompletion { index: 3 }.to_string(),
            "slot 3 already reported its completion"
        );
        assert_eq!(
            JoinError::CounterAlreadyComplete.to_string(),
            "join counter has already completed"
        );
    }
}
