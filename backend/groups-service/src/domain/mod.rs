pub mod models;

pub use models::{
    placeholder_user_name, Group, GroupChanges, GroupDetails, GroupMember, GroupPost,
    GroupPostComment, GroupPostDetails, GroupPostLike, MemberRole, NewGroup,
};
