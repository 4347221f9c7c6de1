pub mod auth;

pub use auth::{AuthenticatedUser, BearerToken, CredentialRejection, JwtAuth};
