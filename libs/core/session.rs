use doable_storage::{AuthState, FederatedProvider, IdentityProvider, Profile};
use tokio::sync::watch;

use crate::Core;

impl Core {
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> eyre::Result<Profile> {
        let profile = self
            .identity
            .sign_in_with_password(email.to_owned(), password.to_owned())
            .await?;
        tracing::info!(account_id = %profile.account_id, "signed in");
        Ok(profile)
    }

    pub async fn sign_in_federated(&self, provider: FederatedProvider) -> eyre::Result<Profile> {
        let profile = self.identity.sign_in_federated(provider).await?;
        tracing::info!(account_id = %profile.account_id, "signed in");
        Ok(profile)
    }

    pub async fn sign_out(&self) -> eyre::Result<()> {
        self.identity.sign_out().await?;
        tracing::info!("signed out");
        Ok(())
    }

    pub fn current_profile(&self) -> Option<Profile> {
        self.identity.current_state().profile().cloned()
    }

    pub fn watch_auth(&self) -> watch::Receiver<AuthState> {
        self.identity.watch_state()
    }
}
