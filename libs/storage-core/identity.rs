use derive_more::{Deref, DerefMut};
use serde_derive::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::todo::AccountId;
use crate::PinFuture;

/// Stable account identity yielded by the hosted auth provider.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub account_id: AccountId,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Profile),
}

impl AuthState {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            AuthState::SignedIn(profile) => Some(profile),
            AuthState::SignedOut => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FederatedProvider {
    Google,
    Github,
}

#[derive(Deref, DerefMut)]
#[deref(forward)]
#[deref_mut(forward)]
pub struct IdentityBox(Box<dyn IdentityProvider>);

impl IdentityBox {
    pub fn new(provider: impl IdentityProvider + 'static) -> Self {
        Self(Box::new(provider))
    }
}

/// Contract of the hosted identity provider: email/password and
/// federated sign-in, with observable sign-in state changes.
pub trait IdentityProvider: Send + Sync {
    fn sign_in_with_password(
        &self,
        email: String,
        password: String,
    ) -> PinFuture<eyre::Result<Profile>>;

    fn sign_in_federated(&self, provider: FederatedProvider) -> PinFuture<eyre::Result<Profile>>;

    fn sign_out(&self) -> PinFuture<eyre::Result<()>>;

    fn current_state(&self) -> AuthState;

    fn watch_state(&self) -> watch::Receiver<AuthState>;
}
