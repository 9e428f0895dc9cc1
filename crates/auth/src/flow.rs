use crate::models::{IdentityProvider, Login, SignInStep};
use crate::AuthError;
use snapvault_events::{AppEvent, EventBus};

/// Full login flow of the login screen.
///
/// Returning users finish after `sign_in`; first-time users need a non-empty
/// `email` to confirm. Every outcome is reported on `events`.
pub async fn authenticate(
    provider: &dyn IdentityProvider,
    events: &EventBus,
    username: &str,
    password: &str,
    email: &str,
) -> Result<Login, AuthError> {
    match run_login(provider, username, password, email).await {
        Ok(login) => {
            events.emit(AppEvent::SignedIn {
                username: login.username.clone(),
                first_time: login.first_time,
            });
            Ok(login)
        }
        Err(AuthError::EmailRequired) => {
            events.emit(AppEvent::ConfirmationRequired {
                username: username.to_string(),
            });
            Err(AuthError::EmailRequired)
        }
        Err(e) => {
            events.emit(AppEvent::SignInRejected {
                reason: e.to_string(),
            });
            Err(e)
        }
    }
}

async fn run_login(
    provider: &dyn IdentityProvider,
    username: &str,
    password: &str,
    email: &str,
) -> Result<Login, AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let first_time = match provider.sign_in(username, password).await? {
        SignInStep::Done => false,
        SignInStep::ConfirmWithEmail => {
            if email.is_empty() {
                return Err(AuthError::EmailRequired);
            }
            match provider.confirm_sign_in(email).await? {
                SignInStep::Done => true,
                SignInStep::ConfirmWithEmail => return Err(AuthError::EmailRequired),
            }
        }
    };

    let identity_id = provider.identity_id().await?;
    tracing::info!("Signed in {} as {}", username, identity_id);

    Ok(Login {
        username: username.to_string(),
        identity_id,
        first_time,
    })
}

pub async fn sign_out(provider: &dyn IdentityProvider, events: &EventBus) -> Result<(), AuthError> {
    match provider.sign_out().await {
        Ok(()) => {
            events.emit(AppEvent::SignedOut);
            Ok(())
        }
        Err(e) => {
            events.emit(AppEvent::SignOutFailed {
                error: e.to_string(),
            });
            Err(e)
        }
    }
}
