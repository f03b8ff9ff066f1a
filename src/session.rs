use leptos::prelude::*;

use crate::AccessToken;

/// Identity of the signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
    pub display_name: Option<String>,
}

impl CurrentUser {
    /// Header label of the admin page, e.g. "admin@foo.bar Bob".
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) if !name.is_empty() => format!("{} {}", self.email, name),
            _ => self.email.clone(),
        }
    }
}

/// Authentication state as seen by the redeem code page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// The identity provider did not yet tell us who is signed in.
    #[default]
    Pending,

    SignedIn(CurrentUser),

    SignedOut,
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

/// The hosted identity provider, as far as the redeem code page needs it.
///
/// Implementations backed by reactive state should read it tracked in [`AuthSession::state`],
/// so that the bindings created by [`init_redeem_codes`](crate::init_redeem_codes) follow
/// sign-ins and sign-outs.
pub trait AuthSession {
    fn state(&self) -> AuthState;

    fn current_user(&self) -> Option<CurrentUser> {
        match self.state() {
            AuthState::SignedIn(user) => Some(user),
            AuthState::Pending | AuthState::SignedOut => None,
        }
    }

    /// Token to authorize requests against the remote store with, if any.
    fn access_token(&self) -> Option<AccessToken>;

    fn sign_out(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionData {
    Pending,
    SignedIn {
        user: CurrentUser,
        access_token: AccessToken,
    },
    SignedOut,
}

/// An [`AuthSession`] fed by the application, e.g. from the callback of an identity provider
/// SDK. Starts out [`AuthState::Pending`].
///
/// Cloning is cheap and clones share their state.
#[derive(Debug, Clone)]
pub struct TokenSession {
    data: ArcRwSignal<SessionData>,
}

impl TokenSession {
    pub fn new() -> Self {
        Self {
            data: ArcRwSignal::new(SessionData::Pending),
        }
    }

    pub fn sign_in(&self, user: CurrentUser, access_token: impl Into<AccessToken>) {
        tracing::trace!(email = %user.email, "Signed in");
        self.data.set(SessionData::SignedIn {
            user,
            access_token: access_token.into(),
        });
    }

    /// Records that the identity provider knows of no signed-in user.
    pub fn mark_signed_out(&self) {
        self.data.set(SessionData::SignedOut);
    }
}

impl Default for TokenSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession for TokenSession {
    fn state(&self) -> AuthState {
        match &*self.data.read() {
            SessionData::Pending => AuthState::Pending,
            SessionData::SignedIn { user, .. } => AuthState::SignedIn(user.clone()),
            SessionData::SignedOut => AuthState::SignedOut,
        }
    }

    fn access_token(&self) -> Option<AccessToken> {
        match &*self.data.read_untracked() {
            SessionData::SignedIn { access_token, .. } => Some(access_token.clone()),
            SessionData::Pending | SessionData::SignedOut => None,
        }
    }

    fn sign_out(&self) {
        tracing::trace!("Dropping session data");
        self.data.set(SessionData::SignedOut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertr::prelude::*;

    fn bob() -> CurrentUser {
        CurrentUser {
            email: "bob@foo.bar".to_owned(),
            display_name: Some("Bob".to_owned()),
        }
    }

    #[test]
    fn label_shows_email_and_name() {
        assert_that(bob().label()).is_equal_to("bob@foo.bar Bob".to_owned());

        let anonymous = CurrentUser {
            display_name: None,
            ..bob()
        };
        assert_that(anonymous.label()).is_equal_to("bob@foo.bar".to_owned());
    }

    #[test]
    fn session_lifecycle() {
        let session = TokenSession::new();
        assert_that(session.state()).is_equal_to(AuthState::Pending);
        assert_that(session.access_token().is_none()).is_true();

        session.sign_in(bob(), "token");
        assert_that(session.current_user()).is_equal_to(Some(bob()));
        assert_that(session.access_token()).is_equal_to(Some("token".to_owned()));

        session.sign_out();
        assert_that(session.state()).is_equal_to(AuthState::SignedOut);
        assert_that(session.access_token().is_none()).is_true();
    }
}
