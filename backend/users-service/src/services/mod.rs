mod auth;
mod users;

pub use auth::{AuthService, OAUTH_STATE_TTL};
pub use users::{AuthSession, UserService};
