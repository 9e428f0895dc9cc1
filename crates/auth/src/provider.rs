use crate::models::{ConfigIdentityProvider, IdentityProvider, ProviderState, SignInStep};
use crate::AuthError;
use parking_lot::Mutex;
use snapvault_config::Config;
use snapvault_utils::sha1_hex;

impl ConfigIdentityProvider {
    pub fn new(config: &Config) -> Self {
        let users = config
            .users
            .iter()
            .map(|user| (user.username.clone(), user.clone()))
            .collect();

        Self {
            region: config.auth.region.clone(),
            users,
            state: Mutex::new(ProviderState::default()),
        }
    }

    /// Stable id for `username`: "{region}:{sha1(username)}"
    pub fn identity_for(&self, username: &str) -> String {
        format!("{}:{}", self.region, sha1_hex(username))
    }

    fn is_confirmed(&self, state: &ProviderState, username: &str) -> bool {
        state.confirmed.contains(username)
            || self.users.get(username).is_some_and(|user| user.confirmed)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for ConfigIdentityProvider {
    async fn sign_in(&self, username: &str, password: &str) -> Result<SignInStep, AuthError> {
        let user = self
            .users
            .get(username)
            .ok_or(AuthError::InvalidCredentials)?;

        if !sha1_hex(password).eq_ignore_ascii_case(&user.password_sha1) {
            tracing::debug!("Password mismatch for {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        let mut state = self.state.lock();
        if self.is_confirmed(&state, username) {
            state.current = Some(username.to_string());
            state.pending_confirmation = None;
            Ok(SignInStep::Done)
        } else {
            state.pending_confirmation = Some(username.to_string());
            Ok(SignInStep::ConfirmWithEmail)
        }
    }

    async fn confirm_sign_in(&self, email: &str) -> Result<SignInStep, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::EmailRequired);
        }

        let mut state = self.state.lock();
        let username = state
            .pending_confirmation
            .take()
            .ok_or(AuthError::NothingToConfirm)?;

        tracing::info!("Confirmed first sign-in for {}", username);
        state.confirmed.insert(username.clone());
        state.current = Some(username);
        Ok(SignInStep::Done)
    }

    async fn identity_id(&self) -> Result<String, AuthError> {
        let state = self.state.lock();
        let username = state.current.as_deref().ok_or(AuthError::NotSignedIn)?;
        Ok(self.identity_for(username))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut state = self.state.lock();
        state.current.take().ok_or(AuthError::NotSignedIn)?;
        Ok(())
    }
}
