mod posts;

pub use posts::{PostQuery, PostService};
