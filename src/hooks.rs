use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::{
    AuthSession, CodeId, CodeListController, Notice, Operation, RedeemCodes, RedeemCodesError,
    RemoteStore, SortColumn, UseRedeemCodesOptions,
};

/// Initializes the redeem code page: creates a [`CodeListController`] over `store` and binds it
/// to `session`.
///
/// Codes are fetched when the session reports a signed-in user (see
/// [`UseRedeemCodesOptions::refresh_on_sign_in`]) and discarded when the user signs out.
///
/// The returned [`RedeemCodes`] is also provided as context. Retrieve it with
/// [`use_redeem_codes`] in components rendered below.
pub fn init_redeem_codes<S, A>(options: UseRedeemCodesOptions, store: S, session: A) -> RedeemCodes
where
    S: RemoteStore + Send + Sync + 'static,
    A: AuthSession + Clone + Send + Sync + 'static,
{
    tracing::trace!(collection = %options.collection, "Initializing redeem codes...");

    let controller = CodeListController::new(store, &options);
    let notice = ArcRwSignal::<Option<Notice>>::new(None);

    // Follow the session. Only transitions matter, not repeated reports of the same state.
    {
        let controller = controller.clone();
        let session = session.clone();
        let notice = notice.clone();
        let refresh_on_sign_in = options.refresh_on_sign_in;
        Effect::new(move |was_signed_in: Option<bool>| {
            let signed_in = session.state().is_signed_in();
            match (was_signed_in.unwrap_or(false), signed_in) {
                (false, true) if refresh_on_sign_in => {
                    tracing::trace!("User signed in. Loading redeem codes.");
                    let controller = controller.clone();
                    let notice = notice.clone();
                    spawn_local(async move {
                        let result = controller.refresh().await;
                        report(&notice, Operation::Refresh, result, |_| None);
                    });
                }
                (true, false) => {
                    tracing::trace!("User signed out. Discarding redeem codes.");
                    controller.deactivate();
                    notice.set(None);
                }
                _ => {}
            }
            signed_in
        });
    }

    let refresh = Callback::new({
        let controller = controller.clone();
        let notice = notice.clone();
        move |()| {
            let controller = controller.clone();
            let notice = notice.clone();
            spawn_local(async move {
                let result = controller.refresh().await;
                report(&notice, Operation::Refresh, result, |_| None);
            });
        }
    });

    let generate = Callback::new({
        let controller = controller.clone();
        let notice = notice.clone();
        move |input: String| {
            let controller = controller.clone();
            let notice = notice.clone();
            spawn_local(async move {
                let result = controller.generate_from_input(&input).await;
                report(&notice, Operation::Generate, result, |ids| {
                    Some(Notice::generated(&ids))
                });
            });
        }
    });

    let toggle_used = Callback::new({
        let controller = controller.clone();
        let notice = notice.clone();
        move |id: CodeId| {
            let controller = controller.clone();
            let notice = notice.clone();
            spawn_local(async move {
                let result = controller.toggle_used(&id).await;
                report(&notice, Operation::ToggleUsed, result, |_| None);
            });
        }
    });

    let delete_code = Callback::new({
        let controller = controller.clone();
        let notice = notice.clone();
        move |id: CodeId| {
            let controller = controller.clone();
            let notice = notice.clone();
            spawn_local(async move {
                let result = controller.delete_code(&id).await;
                report(&notice, Operation::DeleteCode, result, |()| None);
            });
        }
    });

    let delete_all = Callback::new({
        let controller = controller.clone();
        let notice = notice.clone();
        move |confirmation: String| {
            let controller = controller.clone();
            let notice = notice.clone();
            spawn_local(async move {
                let result = controller.delete_all(&confirmation).await;
                report(&notice, Operation::DeleteAll, result, |count| {
                    Some(Notice::deleted_all(count))
                });
            });
        }
    });

    let select_sort = Callback::new({
        let controller = controller.clone();
        move |column: SortColumn| controller.select_sort(column)
    });

    let sign_out = Callback::new({
        let controller = controller.clone();
        let session = session.clone();
        let notice = notice.clone();
        move |()| {
            tracing::trace!("Signing out...");
            session.sign_out();
            controller.deactivate();
            notice.set(None);
        }
    });

    let dismiss_notice = Callback::new({
        let notice = notice.clone();
        move |()| notice.set(None)
    });

    let codes = RedeemCodes {
        view: Signal::derive({
            let controller = controller.clone();
            move || controller.sorted_view()
        }),
        loaded: Signal::derive({
            let controller = controller.clone();
            move || controller.is_loaded()
        }),
        sort: Signal::derive({
            let controller = controller.clone();
            move || controller.sort()
        }),
        notice: Signal::derive(move || notice.get()),
        refreshing: Signal::derive({
            let controller = controller.clone();
            move || controller.is_refreshing()
        }),
        generating: Signal::derive({
            let controller = controller.clone();
            move || controller.is_generating()
        }),
        deleting_all: Signal::derive(move || controller.is_deleting_all()),
        auth_state: Signal::derive({
            let session = session.clone();
            move || session.state()
        }),
        current_user: Signal::derive(move || session.current_user()),
        refresh,
        generate,
        toggle_used,
        delete_code,
        delete_all,
        select_sort,
        sign_out,
        dismiss_notice,
    };

    // We guarantee that the RedeemCodes state is provided as context.
    provide_context(codes);

    codes
}

/// Returns the [`RedeemCodes`] provided by [`init_redeem_codes`].
///
/// # Panics
///
/// When no component above called [`init_redeem_codes`].
pub fn use_redeem_codes() -> RedeemCodes {
    expect_context::<RedeemCodes>()
}

pub fn try_use_redeem_codes() -> Option<RedeemCodes> {
    use_context::<RedeemCodes>()
}

/// Publishes the outcome of a command. Keeps the current notice if there is nothing to say.
fn report<T>(
    notice: &ArcRwSignal<Option<Notice>>,
    operation: Operation,
    result: Result<T, RedeemCodesError>,
    on_success: impl FnOnce(T) -> Option<Notice>,
) {
    let next = match result {
        Ok(value) => on_success(value),
        Err(err) => Notice::failed(operation, &err),
    };
    if let Some(next) = next {
        notice.set(Some(next));
    }
}
