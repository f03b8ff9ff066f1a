use leptos::prelude::*;

/// Lifecycle of a guarded operation: `Idle -> InFlight -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OperationState {
    #[default]
    Idle,
    InFlight,
}

/// Prevents an operation from being entered again while it is still in flight.
///
/// The state is kept in a signal, so that UIs can reactively disable their triggers.
#[derive(Debug, Clone)]
pub(crate) struct OperationGuard {
    state: ArcRwSignal<OperationState>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self {
            state: ArcRwSignal::new(OperationState::Idle),
        }
    }

    /// Tracked read of the current state.
    pub fn state(&self) -> OperationState {
        self.state.get()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.get_untracked() == OperationState::InFlight
    }

    /// Moves to `InFlight`, or returns `None` if the operation already is in flight.
    ///
    /// The returned ticket moves the guard back to `Idle` when dropped, regardless of how the
    /// operation ended.
    #[must_use]
    pub fn try_enter(&self) -> Option<InFlight> {
        if self.is_in_flight() {
            return None;
        }
        self.state.set(OperationState::InFlight);
        Some(InFlight {
            state: self.state.clone(),
        })
    }
}

#[derive(Debug)]
pub(crate) struct InFlight {
    state: ArcRwSignal<OperationState>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.state.set(OperationState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertr::prelude::*;

    #[test]
    fn cannot_be_entered_twice() {
        let guard = OperationGuard::new();
        let ticket = guard.try_enter();
        assert_that(ticket.is_some()).is_true();
        assert_that(guard.try_enter().is_some()).is_false();
        assert_that(guard.state()).is_equal_to(OperationState::InFlight);
    }

    #[test]
    fn dropping_the_ticket_returns_to_idle() {
        let guard = OperationGuard::new();
        {
            let _ticket = guard.try_enter();
        }
        assert_that(guard.state()).is_equal_to(OperationState::Idle);
        assert_that(guard.try_enter().is_some()).is_true();
    }
}
