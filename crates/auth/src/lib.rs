mod errors;
mod flow;
mod models;
mod provider;

pub use errors::AuthError;
pub use flow::{authenticate, sign_out};
pub use models::{ConfigIdentityProvider, IdentityProvider, Login, SignInStep};
