//! User store
//!
//! Emails are unique among live users, compared case-insensitively.

mod users;

pub use users::PgUserRepository;

use crate::domain::{NewUser, ProfileChanges, User};
use anyhow::Result;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns `None` if a live user already owns the email
    async fn create(&self, user: NewUser) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns `None` if the user does not exist
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Option<User>>;
}
