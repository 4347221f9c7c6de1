pub mod user;

pub use user::{NewUser, ProfileChanges, Provider, ProviderProfile, User};
