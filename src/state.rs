use leptos::prelude::*;

use crate::{AuthState, CodeId, CodeRow, CurrentUser, Notice, SortColumn, SortState};

/// Reactive bindings of the redeem code page.
///
/// Created and provided as context by [`init_redeem_codes`](crate::init_redeem_codes). Use
/// ```no_run
/// use leptos_redeem_codes::use_redeem_codes;
///
/// let codes = use_redeem_codes();
/// ```
/// in any component rendered below the component that performed the `init_redeem_codes` call.
///
/// All commands are fire-and-forget. Their outcome is published through `notice`.
#[derive(Debug, Clone, Copy)]
pub struct RedeemCodes {
    /// The roster, ordered by `sort`, with 1-based row numbers.
    pub view: Signal<Vec<CodeRow>>,

    /// `true` once the codes were fetched for the current session.
    pub loaded: Signal<bool>,

    pub sort: Signal<SortState>,

    /// Outcome of the last command, until dismissed or replaced.
    pub notice: Signal<Option<Notice>>,

    pub refreshing: Signal<bool>,

    pub generating: Signal<bool>,

    pub deleting_all: Signal<bool>,

    pub auth_state: Signal<AuthState>,

    /// Derived signal, the signed-in user if there is one.
    pub current_user: Signal<Option<CurrentUser>>,

    /// Fetch the codes again.
    pub refresh: Callback<()>,

    /// Generate codes. Takes the amount as typed by the user.
    pub generate: Callback<String>,

    pub toggle_used: Callback<CodeId>,

    pub delete_code: Callback<CodeId>,

    /// Delete all codes. Takes the confirmation as typed by the user.
    pub delete_all: Callback<String>,

    pub select_sort: Callback<SortColumn>,

    pub sign_out: Callback<()>,

    pub dismiss_notice: Callback<()>,
}

impl RedeemCodes {
    pub fn is_signed_in(&self) -> bool {
        self.auth_state.read().is_signed_in()
    }
}
