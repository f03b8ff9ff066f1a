use crate::{CodeId, Operation, RedeemCodesError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message to the user about the outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    pub fn generated(ids: &[CodeId]) -> Self {
        match ids {
            [id] => Self::success(format!("Redeem code generated with ID: {id}")),
            ids => Self::success(format!("Generated {} redeem codes.", ids.len())),
        }
    }

    pub fn deleted_all(count: usize) -> Self {
        Self::success(format!("Deleted all {count} redeem codes."))
    }

    /// Notice for a failed command. Returns `None` for commands ignored while busy and for
    /// commands outlived by their session.
    pub fn failed(operation: Operation, err: &RedeemCodesError) -> Option<Self> {
        if err.is_busy() || err.is_session_ended() {
            return None;
        }
        if err.is_validation() {
            return Some(Self::error(err.to_string()));
        }
        let action = match operation {
            Operation::Refresh => "loading redeem codes",
            Operation::Generate => "generating redeem codes",
            Operation::ToggleUsed => "updating redeem code",
            Operation::DeleteCode => "deleting redeem code",
            Operation::DeleteAll => "deleting all redeem codes",
        };
        Some(Self::error(format!("Error {action}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use assertr::prelude::*;

    #[test]
    fn single_generated_code_is_named() {
        let notice = Notice::generated(&["abc".to_owned()]);
        assert_that(notice.message).is_equal_to("Redeem code generated with ID: abc".to_owned());

        let notice = Notice::generated(&["a".to_owned(), "b".to_owned()]);
        assert_that(notice.message).is_equal_to("Generated 2 redeem codes.".to_owned());
    }

    #[test]
    fn busy_rejections_are_silent() {
        let err = RedeemCodesError::Busy {
            operation: Operation::Generate,
        };
        assert_that(Notice::failed(Operation::Generate, &err).is_none()).is_true();
    }

    #[test]
    fn results_of_ended_sessions_are_silent() {
        let err = RedeemCodesError::SessionEnded {
            operation: Operation::Refresh,
        };
        assert_that(Notice::failed(Operation::Refresh, &err).is_none()).is_true();
    }

    #[test]
    fn store_errors_carry_the_underlying_message() {
        let err = RedeemCodesError::from(StoreError::Unavailable {
            message: "permission denied".to_owned(),
        });
        let notice = Notice::failed(Operation::DeleteCode, &err).unwrap();
        assert_that(notice.is_error()).is_true();
        assert_that(notice.message)
            .is_equal_to("Error deleting redeem code: permission denied".to_owned());
    }
}
