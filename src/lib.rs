//! Manage redeem codes kept in a remote document store.
//!
//! The heart of this crate is the [`CodeListController`]. It owns the local roster of codes,
//! keeps it in sync with a [`RemoteStore`] and derives a sorted view of it for display.
//! Reactive bindings for Leptos are available through [`init_redeem_codes`].
//!
//! ```no_run
//! use leptos_redeem_codes::{parse_count, CodeListController, MemoryStore, UseRedeemCodesOptions};
//!
//! # async fn example() -> Result<(), leptos_redeem_codes::RedeemCodesError> {
//! let controller = CodeListController::new(MemoryStore::new(), &UseRedeemCodesOptions::default());
//! controller.refresh().await?;
//!
//! // Text as typed by the user. Anything but a whole number >= 1 is rejected here.
//! let count = parse_count("3")?;
//! let generated = controller.generate_codes(count).await?;
//! controller.toggle_used(&generated[0]).await?;
//!
//! controller.delete_all("CONFIRM").await?;
//! # Ok(())
//! # }
//! ```
//!
//! With Leptos, create the bindings once (they are provided as context) and render below them:
//!
//! ```no_run
//! use leptos::prelude::*;
//! use leptos_redeem_codes::components::ShowWhenSignedIn;
//! use leptos_redeem_codes::{init_redeem_codes, MemoryStore, TokenSession, UseRedeemCodesOptions};
//!
//! #[component]
//! pub fn Admin(session: TokenSession) -> impl IntoView {
//!     let codes = init_redeem_codes(UseRedeemCodesOptions::default(), MemoryStore::new(), session);
//!
//!     view! {
//!         <ShowWhenSignedIn fallback=|| view! { "Please sign in." }>
//!             <p>{ move || format!("{} codes", codes.view.read().len()) }</p>
//!         </ShowWhenSignedIn>
//!     }
//! }
//! ```

mod code;
pub mod components;
mod config;
mod controller;
mod error;
mod hooks;
mod internal;
mod notice;
mod roster;
mod session;
mod sort;
mod state;
pub mod store;

// Library exports (additional to pub modules).
pub use code::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use hooks::*;
pub use internal::operation_guard::OperationState;
pub use notice::*;
pub use roster::*;
pub use session::*;
pub use sort::*;
pub use state::*;
pub use store::RemoteStore;
pub use store::http::HttpDocumentStore;
pub use store::memory::MemoryStore;
pub mod url {
    pub use url::Url;
}

/// Store-assigned identifier of a redeem code. Also the human-visible code itself.
pub type CodeId = String;

pub type AccessToken = String;
