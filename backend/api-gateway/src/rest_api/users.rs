use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::{credentials, or_empty, require_user};
use crate::clients::proto::users::{AuthRequest, GetProfileRequest, UpdateProfileRequest};
use crate::clients::ServiceClients;
use crate::error::ApiResult;
use grpc_jwt_propagation::JwtClientInterceptor;

/// A provider access token to exchange for a service token
#[derive(Debug, Deserialize, Validate)]
pub struct AuthBody {
    #[validate(length(min = 1, message = "provider is required"))]
    pub provider: String,
    #[validate(length(min = 1, message = "access_token is required"))]
    pub access_token: String,
}

impl From<AuthBody> for AuthRequest {
    fn from(body: AuthBody) -> Self {
        AuthRequest {
            provider: body.provider,
            access_token: body.access_token,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileBody {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2048))]
    pub avatar: Option<String>,
}

#[post("/users/register")]
pub async fn register(
    clients: web::Data<ServiceClients>,
    body: web::Json<AuthBody>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    let session = clients
        .users(JwtClientInterceptor::anonymous())
        .register(AuthRequest::from(body.into_inner()))
        .await?
        .into_inner();
    Ok(HttpResponse::Created().json(session))
}

#[post("/users/login")]
pub async fn login(
    clients: web::Data<ServiceClients>,
    body: web::Json<AuthBody>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    let session = clients
        .users(JwtClientInterceptor::anonymous())
        .login(AuthRequest::from(body.into_inner()))
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(session))
}

#[get("/users/me")]
pub async fn get_me(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;

    let profile = clients
        .users(credentials(&http_req)?)
        .get_profile(GetProfileRequest {
            user_id: user_id.to_string(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(profile))
}

#[put("/users/me")]
pub async fn update_me(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
    body: web::Json<UpdateProfileBody>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    body.validate()?;

    let profile = clients
        .users(credentials(&http_req)?)
        .update_profile(UpdateProfileRequest {
            user_id: user_id.to_string(),
            name: or_empty(&body.name),
            avatar: or_empty(&body.avatar),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(profile))
}
