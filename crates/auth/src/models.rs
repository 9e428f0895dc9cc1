use crate::AuthError;
use parking_lot::Mutex;
use snapvault_config::UserConfig;
use std::collections::{HashMap, HashSet};

/// What the identity service wants next after a sign-in attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInStep {
    Done,
    /// First login: confirm with an email before the session is issued
    ConfirmWithEmail,
}

/// Managed identity service, only consumed for a stable per-user id
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, username: &str, password: &str) -> Result<SignInStep, AuthError>;

    async fn confirm_sign_in(&self, email: &str) -> Result<SignInStep, AuthError>;

    /// Identity id of the signed-in user, used to namespace remote storage
    async fn identity_id(&self) -> Result<String, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// A completed login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub username: String,
    pub identity_id: String,
    pub first_time: bool,
}

/// Identity provider backed by the `[[users]]` table of the config file
pub struct ConfigIdentityProvider {
    pub(crate) region: String,
    pub(crate) users: HashMap<String, UserConfig>,
    pub(crate) state: Mutex<ProviderState>,
}

#[derive(Debug, Default)]
pub(crate) struct ProviderState {
    pub(crate) current: Option<String>,
    pub(crate) pending_confirmation: Option<String>,
    pub(crate) confirmed: HashSet<String>,
}
