//! Services layer: the login pipeline and its collaborators.

mod directory;
pub mod error;
mod google;
mod jwt;
mod login;
mod reconcile;

pub use directory::{DirectoryError, InMemoryDirectory, PgDirectory, UserDirectory};
pub use error::{GENERIC_LOGIN_ERROR, LoginError};
pub use google::{GoogleProvider, IdentityProvider, ProviderClaims, ProviderError};
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims};
pub use login::{CallbackOutcome, CallbackParams, GoogleLoginService};
pub use reconcile::IdentityReconciler;
