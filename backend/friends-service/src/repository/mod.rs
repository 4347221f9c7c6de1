mod postgres_repository;
mod r#trait;

pub use postgres_repository::PgFriendRepository;
pub use r#trait::FriendRepository;
