use leptos::either::EitherOf3;
use leptos::prelude::*;

use crate::{AuthState, CurrentUser, use_redeem_codes};

/// Show `children` only when a user is signed in, providing the [`CurrentUser`] as context.
///
/// Renders `fallback` when nobody is signed in, and `loading` while the session is still being
/// resolved. Both default to rendering nothing.
///
/// Must be rendered below the component that called
/// [`init_redeem_codes`](crate::init_redeem_codes).
///
/// # Example
/// ```no_run
/// use leptos::prelude::*;
/// use leptos_redeem_codes::components::ShowWhenSignedIn;
///
/// # #[component]
/// # fn Component() -> impl IntoView {
/// view! {
///     <ShowWhenSignedIn
///         loading=|| view! { "Loading..." }
///         fallback=|| view! { "Please sign in." }
///     >
///         <p>"Your redeem codes"</p>
///     </ShowWhenSignedIn>
/// }
/// # }
/// ```
#[component(transparent)]
#[allow(clippy::must_use_candidate)]
pub fn ShowWhenSignedIn(
    /// View to show when nobody is signed in.
    #[prop(into, optional)]
    fallback: Option<ViewFn>,

    /// View to show while the sign-in state is not yet known.
    #[prop(into, optional)]
    loading: Option<ViewFn>,

    children: ChildrenFn,
) -> impl IntoView {
    let codes = use_redeem_codes();

    move || match codes.auth_state.get() {
        AuthState::SignedIn(user) => {
            provide_context(user);
            EitherOf3::<AnyView, AnyView, AnyView>::A(children().into_any())
        }
        AuthState::SignedOut => {
            let _ = take_context::<CurrentUser>();
            EitherOf3::<AnyView, AnyView, AnyView>::B(match &fallback {
                Some(f) => f.run(),
                None => ().into_any(),
            })
        }
        AuthState::Pending => {
            let _ = take_context::<CurrentUser>();
            EitherOf3::<AnyView, AnyView, AnyView>::C(match &loading {
                Some(f) => f.run(),
                None => ().into_any(),
            })
        }
    }
}

/// Header line naming the signed-in user, e.g. "admin@foo.bar Jane Doe".
#[component]
#[allow(clippy::must_use_candidate)]
pub fn CurrentUserLabel() -> impl IntoView {
    let codes = use_redeem_codes();

    move || {
        codes
            .current_user
            .with(|user| user.as_ref().map(CurrentUser::label).unwrap_or_default())
    }
}
