use super::groups::group_service_server::GroupService as GroupServiceRpc;
use super::groups::*;
use crate::domain::{placeholder_user_name, GroupDetails, GroupMember, GroupPostDetails};
use crate::services::GroupService;
use grpc_jwt_propagation::{AccessPolicy, Caller};
use pagination::Page;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

/// Methods callable without a bearer token
pub const PUBLIC_METHODS: &[&str] = &["GetGroups", "GetGroup", "GetGroupMembers"];

pub struct GroupServiceImpl {
    service: Arc<GroupService>,
    policy: AccessPolicy,
}

impl GroupServiceImpl {
    pub fn new(service: Arc<GroupService>) -> Self {
        Self {
            service,
            policy: AccessPolicy::new(PUBLIC_METHODS),
        }
    }
}

#[allow(clippy::result_large_err)]
fn parse_group_id(value: &str) -> Result<Uuid, Status> {
    if value.is_empty() {
        return Err(Status::invalid_argument("group ID is required"));
    }
    Uuid::parse_str(value).map_err(|_| Status::invalid_argument("invalid group ID"))
}

#[allow(clippy::result_large_err)]
fn viewer(caller: Caller, body_user_id: &str) -> Result<Option<Uuid>, Status> {
    match caller {
        Caller::Anonymous => Ok(None),
        Caller::User(_) => caller.acting_as(body_user_id).map(Some),
    }
}

fn count_to_i32(count: i64) -> i32 {
    i32::try_from(count.max(0)).unwrap_or(i32::MAX)
}

fn group_to_response(details: &GroupDetails) -> GroupResponse {
    let group = &details.group;
    GroupResponse {
        group_id: group.id.to_string(),
        name: group.name.clone(),
        description: group.description.clone(),
        avatar: group.avatar.clone(),
        creator_id: group.creator_id.to_string(),
        members_count: count_to_i32(details.members_count),
        posts_count: count_to_i32(details.posts_count),
        is_member: details.is_member,
        created_at: group.created_at.to_rfc3339(),
        updated_at: group.updated_at.to_rfc3339(),
    }
}

fn member_to_response(member: &GroupMember) -> GroupMemberResponse {
    GroupMemberResponse {
        user_id: member.user_id.to_string(),
        name: placeholder_user_name(member.user_id),
        avatar: String::new(),
        role: member.role.clone(),
        joined_at: member.joined_at.to_rfc3339(),
    }
}

fn post_to_response(details: &GroupPostDetails, viewer_id: Option<Uuid>) -> GroupPostResponse {
    let post = &details.post;
    GroupPostResponse {
        post_id: post.id.to_string(),
        group_id: post.group_id.to_string(),
        author_id: post.author_id.to_string(),
        author_name: placeholder_user_name(post.author_id),
        author_avatar: String::new(),
        content: post.content.clone(),
        media: details.media.clone(),
        likes_count: count_to_i32(details.likes.len() as i64),
        comments_count: count_to_i32(details.comments_count),
        is_liked: details.is_liked_by(viewer_id),
        comments: details
            .comments
            .iter()
            .map(|comment| GroupPostComment {
                comment_id: comment.id.to_string(),
                author_id: comment.user_id.to_string(),
                content: comment.content.clone(),
                created_at: comment.created_at.to_rfc3339(),
            })
            .collect(),
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

fn page_totals<T>(page: &Page<T>) -> (i32, i32, i32) {
    (count_to_i32(page.total_count), page.page, page.total_pages)
}

#[tonic::async_trait]
impl GroupServiceRpc for GroupServiceImpl {
    async fn create_group(
        &self,
        request: Request<CreateGroupRequest>,
    ) -> Result<Response<GroupResponse>, Status> {
        let caller = self.policy.authorize(&request, "CreateGroup")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;

        info!(user_id = %user_id, name = %req.name, "CreateGroup request received");

        let details = self
            .service
            .create_group(user_id, &req.name, &req.description, &req.avatar)
            .await?;

        Ok(Response::new(group_to_response(&details)))
    }

    async fn get_group(
        &self,
        request: Request<GetGroupRequest>,
    ) -> Result<Response<GroupResponse>, Status> {
        let caller = self.policy.authorize(&request, "GetGroup")?;
        let req = request.into_inner();
        let group_id = parse_group_id(&req.group_id)?;
        let viewer_id = viewer(caller, &req.user_id)?;

        let details = self.service.get_group(group_id, viewer_id).await?;

        Ok(Response::new(group_to_response(&details)))
    }

    async fn get_groups(
        &self,
        request: Request<GetGroupsRequest>,
    ) -> Result<Response<GetGroupsResponse>, Status> {
        let caller = self.policy.authorize(&request, "GetGroups")?;
        let req = request.into_inner();
        let viewer_id = viewer(caller, &req.user_id)?;

        let page = self
            .service
            .get_groups(viewer_id, &req.query, req.page, req.limit)
            .await?;
        let (total_count, page_number, total_pages) = page_totals(&page);

        Ok(Response::new(GetGroupsResponse {
            groups: page.items.iter().map(group_to_response).collect(),
            total_count,
            page: page_number,
            total_pages,
        }))
    }

    async fn update_group(
        &self,
        request: Request<UpdateGroupRequest>,
    ) -> Result<Response<GroupResponse>, Status> {
        let caller = self.policy.authorize(&request, "UpdateGroup")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let group_id = parse_group_id(&req.group_id)?;

        let details = self
            .service
            .update_group(group_id, user_id, &req.name, &req.description, &req.avatar)
            .await?;

        Ok(Response::new(group_to_response(&details)))
    }

    async fn delete_group(
        &self,
        request: Request<DeleteGroupRequest>,
    ) -> Result<Response<DeleteGroupResponse>, Status> {
        let caller = self.policy.authorize(&request, "DeleteGroup")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let group_id = parse_group_id(&req.group_id)?;

        self.service.delete_group(group_id, user_id).await?;

        Ok(Response::new(DeleteGroupResponse { success: true }))
    }

    async fn join_group(
        &self,
        request: Request<JoinGroupRequest>,
    ) -> Result<Response<JoinGroupResponse>, Status> {
        let caller = self.policy.authorize(&request, "JoinGroup")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let group_id = parse_group_id(&req.group_id)?;

        let members_count = self.service.join_group(group_id, user_id).await?;

        Ok(Response::new(JoinGroupResponse {
            success: true,
            members_count: count_to_i32(members_count),
        }))
    }

    async fn leave_group(
        &self,
        request: Request<LeaveGroupRequest>,
    ) -> Result<Response<LeaveGroupResponse>, Status> {
        let caller = self.policy.authorize(&request, "LeaveGroup")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let group_id = parse_group_id(&req.group_id)?;

        let members_count = self.service.leave_group(group_id, user_id).await?;

        Ok(Response::new(LeaveGroupResponse {
            success: true,
            members_count: count_to_i32(members_count),
        }))
    }

    async fn get_group_members(
        &self,
        request: Request<GetGroupMembersRequest>,
    ) -> Result<Response<GetGroupMembersResponse>, Status> {
        self.policy.authorize(&request, "GetGroupMembers")?;
        let req = request.into_inner();
        let group_id = parse_group_id(&req.group_id)?;

        let page = self
            .service
            .get_group_members(group_id, req.page, req.limit)
            .await?;
        let (total_count, page_number, total_pages) = page_totals(&page);

        Ok(Response::new(GetGroupMembersResponse {
            members: page.items.iter().map(member_to_response).collect(),
            total_count,
            page: page_number,
            total_pages,
        }))
    }

    async fn create_group_post(
        &self,
        request: Request<CreateGroupPostRequest>,
    ) -> Result<Response<GroupPostResponse>, Status> {
        let caller = self.policy.authorize(&request, "CreateGroupPost")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let group_id = parse_group_id(&req.group_id)?;

        let details = self
            .service
            .create_group_post(group_id, user_id, &req.content, &req.media)
            .await?;

        Ok(Response::new(post_to_response(&details, Some(user_id))))
    }

    async fn get_group_posts(
        &self,
        request: Request<GetGroupPostsRequest>,
    ) -> Result<Response<GetGroupPostsResponse>, Status> {
        let caller = self.policy.authorize(&request, "GetGroupPosts")?;
        let req = request.into_inner();
        let user_id = caller.acting_as(&req.user_id)?;
        let group_id = parse_group_id(&req.group_id)?;

        let page = self
            .service
            .get_group_posts(group_id, Some(user_id), req.page, req.limit)
            .await?;
        let (total_count, page_number, total_pages) = page_totals(&page);

        Ok(Response::new(GetGroupPostsResponse {
            posts: page
                .items
                .iter()
                .map(|details| post_to_response(details, Some(user_id)))
                .collect(),
            total_count,
            page: page_number,
            total_pages,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_id() {
        assert_eq!(
            parse_group_id("").unwrap_err().message(),
            "group ID is required"
        );
        assert_eq!(
            parse_group_id("nope").unwrap_err().code(),
            tonic::Code::InvalidArgument
        );
        let id = Uuid::new_v4();
        assert_eq!(parse_group_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_public_methods() {
        let policy = AccessPolicy::new(PUBLIC_METHODS);
        assert!(policy.is_public("GetGroups"));
        assert!(policy.is_public("GetGroup"));
        assert!(!policy.is_public("GetGroupPosts"));
        assert!(!policy.is_public("JoinGroup"));
    }
}
