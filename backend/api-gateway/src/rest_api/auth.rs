use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;

use super::require_user;
use crate::clients::proto::users::{OAuthCallbackRequest, OAuthLoginRequest, SignoutRequest};
use crate::clients::ServiceClients;
use crate::error::{ApiError, ApiResult};
use crate::middleware::BearerToken;

/// Query string the provider redirects back with
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

impl From<CallbackQuery> for OAuthCallbackRequest {
    fn from(query: CallbackQuery) -> Self {
        OAuthCallbackRequest {
            code: query.code,
            state: query.state,
        }
    }
}

#[get("/auth/google")]
pub async fn google_login(clients: web::Data<ServiceClients>) -> ApiResult<HttpResponse> {
    let response = clients
        .auth()
        .google_login(OAuthLoginRequest {})
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(response))
}

#[get("/auth/google/callback")]
pub async fn google_callback(
    clients: web::Data<ServiceClients>,
    query: web::Query<CallbackQuery>,
) -> ApiResult<HttpResponse> {
    let session = clients
        .auth()
        .google_callback(OAuthCallbackRequest::from(query.into_inner()))
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(session))
}

#[get("/auth/microsoft")]
pub async fn microsoft_login(clients: web::Data<ServiceClients>) -> ApiResult<HttpResponse> {
    let response = clients
        .auth()
        .microsoft_login(OAuthLoginRequest {})
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(response))
}

#[get("/auth/microsoft/callback")]
pub async fn microsoft_callback(
    clients: web::Data<ServiceClients>,
    query: web::Query<CallbackQuery>,
) -> ApiResult<HttpResponse> {
    let session = clients
        .auth()
        .microsoft_callback(OAuthCallbackRequest::from(query.into_inner()))
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(session))
}

#[post("/auth/signout")]
pub async fn signout(
    http_req: HttpRequest,
    clients: web::Data<ServiceClients>,
) -> ApiResult<HttpResponse> {
    let user_id = require_user(&http_req)?;
    let token = http_req
        .extensions()
        .get::<BearerToken>()
        .map(|BearerToken(token)| token.clone())
        .ok_or_else(ApiError::unauthenticated)?;

    let response = clients
        .auth()
        .signout(SignoutRequest { token })
        .await?
        .into_inner();

    info!(user_id = %user_id, "User signed out");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": response.success })))
}
