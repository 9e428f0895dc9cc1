use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please provide credentials in order to login")]
    MissingCredentials,

    #[error("Authentication failed. Please try again")]
    InvalidCredentials,

    #[error("Are you a new user? Please provide your email if you are logging in for the first time")]
    EmailRequired,

    #[error("No sign-in is waiting for confirmation")]
    NothingToConfirm,

    #[error("No user is signed in")]
    NotSignedIn,
}
