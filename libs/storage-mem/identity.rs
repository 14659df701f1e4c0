use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use doable_storage_core::{AuthState, FederatedProvider, IdentityProvider, PinFuture, Profile};
use tokio::sync::watch;
use ulid::Ulid;

/// In-memory stand-in for the hosted identity provider. Accounts are
/// registered up front and sign-in state changes are observable through
/// a watch channel, mirroring the provider's auth-state listener.
#[derive(Clone)]
pub struct MemIdentity {
    accounts: Arc<Mutex<HashMap<String, StoredAccount>>>,
    state_tx: Arc<watch::Sender<AuthState>>,
}

struct StoredAccount {
    password: String,
    profile: Profile,
}

impl Default for MemIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl MemIdentity {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(AuthState::SignedOut);
        MemIdentity {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Register an account the provider will accept, returns its profile
    pub fn register(&self, email: &str, password: &str, display_name: &str) -> eyre::Result<Profile> {
        let profile = Profile {
            account_id: Ulid::new().to_string(),
            display_name: display_name.to_owned(),
            email: email.to_owned(),
            photo_url: None,
        };
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| eyre::eyre!("account registry poisoned: {e}"))?;
        accounts.insert(
            email.to_owned(),
            StoredAccount {
                password: password.to_owned(),
                profile: profile.clone(),
            },
        );
        Ok(profile)
    }
}

impl IdentityProvider for MemIdentity {
    fn sign_in_with_password(
        &self,
        email: String,
        password: String,
    ) -> PinFuture<eyre::Result<Profile>> {
        Box::pin(async move {
            let accounts = self
                .accounts
                .lock()
                .map_err(|e| eyre::eyre!("account registry poisoned: {e}"))?;
            let account = accounts
                .get(&email)
                .filter(|account| account.password == password)
                .ok_or_else(|| eyre::eyre!("invalid credentials for '{email}'"))?;

            let profile = account.profile.clone();
            self.state_tx.send_replace(AuthState::SignedIn(profile.clone()));
            Ok(profile)
        })
    }

    fn sign_in_federated(&self, provider: FederatedProvider) -> PinFuture<eyre::Result<Profile>> {
        Box::pin(async move {
            let email = match provider {
                FederatedProvider::Google => "user@google.example",
                FederatedProvider::Github => "user@github.example",
            };
            let mut accounts = self
                .accounts
                .lock()
                .map_err(|e| eyre::eyre!("account registry poisoned: {e}"))?;
            let profile = match accounts.get(email) {
                Some(account) => account.profile.clone(),
                None => {
                    let profile = Profile {
                        account_id: Ulid::new().to_string(),
                        display_name: "Federated User".to_owned(),
                        email: email.to_owned(),
                        photo_url: None,
                    };
                    accounts.insert(
                        email.to_owned(),
                        StoredAccount {
                            password: String::new(),
                            profile: profile.clone(),
                        },
                    );
                    profile
                }
            };

            self.state_tx.send_replace(AuthState::SignedIn(profile.clone()));
            Ok(profile)
        })
    }

    fn sign_out(&self) -> PinFuture<eyre::Result<()>> {
        Box::pin(async move {
            self.state_tx.send_replace(AuthState::SignedOut);
            Ok(())
        })
    }

    fn current_state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    fn watch_state(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn password_sign_in_yields_the_registered_profile() {
        let identity = MemIdentity::new();
        let registered = identity.register("ada@example.com", "pw", "Ada").unwrap();

        let profile = identity
            .sign_in_with_password("ada@example.com".to_owned(), "pw".to_owned())
            .await
            .unwrap();

        assert_eq!(profile, registered);
        assert_eq!(identity.current_state().profile(), Some(&profile));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_and_state_stays_signed_out() {
        let identity = MemIdentity::new();
        identity.register("ada@example.com", "pw", "Ada").unwrap();

        let result = identity
            .sign_in_with_password("ada@example.com".to_owned(), "nope".to_owned())
            .await;

        assert!(result.is_err());
        assert_eq!(identity.current_state(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn watchers_observe_sign_in_and_sign_out() {
        let identity = MemIdentity::new();
        identity.register("ada@example.com", "pw", "Ada").unwrap();
        let mut state = identity.watch_state();

        identity
            .sign_in_with_password("ada@example.com".to_owned(), "pw".to_owned())
            .await
            .unwrap();
        state.changed().await.unwrap();
        assert!(state.borrow().profile().is_some());

        identity.sign_out().await.unwrap();
        state.changed().await.unwrap();
        assert_eq!(*state.borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn federated_sign_in_reuses_the_same_account() {
        let identity = MemIdentity::new();

        let first = identity
            .sign_in_federated(FederatedProvider::Google)
            .await
            .unwrap();
        let second = identity
            .sign_in_federated(FederatedProvider::Google)
            .await
            .unwrap();

        assert_eq!(first.account_id, second.account_id);
    }
}
