pub mod models;
pub mod visibility;

pub use models::{Comment, Like, NewComment, NewPost, Post, PostChanges, PostView};
pub use visibility::{is_visible_to, Visibility, VisibleContent};
