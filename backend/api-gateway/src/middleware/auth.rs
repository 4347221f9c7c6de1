//! Optional-auth JWT middleware
//!
//! Every request reaches its handler. A valid bearer token stores the caller
//! id and the raw token in the request extensions. A missing header leaves
//! the request anonymous. A malformed or invalid token is recorded as a
//! [`CredentialRejection`]: public routes serve the request anonymously and
//! routes that need a caller answer 401 with the recorded reason.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use crypto_core::JwtCodec;
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use tracing::debug;
use uuid::Uuid;

/// Caller id taken from a validated token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

/// The validated token, without the "Bearer " prefix
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Why a presented `Authorization` header was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialRejection(pub &'static str);

pub struct JwtAuth {
    codec: JwtCodec,
}

impl JwtAuth {
    pub fn new(codec: JwtCodec) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthService {
            service,
            codec: self.codec.clone(),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: S,
    codec: JwtCodec,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match bearer_token(&req) {
            Ok(None) => {}
            Ok(Some(token)) => match self.codec.user_id_from_token(&token) {
                Ok(user_id) => {
                    req.extensions_mut().insert(AuthenticatedUser(user_id));
                    req.extensions_mut().insert(BearerToken(token));
                }
                Err(e) => {
                    debug!(error = %e, path = %req.path(), "Rejected bearer token");
                    req.extensions_mut()
                        .insert(CredentialRejection("Invalid or expired token"));
                }
            },
            Err(reason) => {
                debug!(reason, path = %req.path(), "Malformed authorization header");
                req.extensions_mut().insert(CredentialRejection(reason));
            }
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}

/// `Ok(None)` when no header is present
fn bearer_token(req: &ServiceRequest) -> Result<Option<String>, &'static str> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| "Invalid authorization header")?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or("Authorization must use Bearer scheme")?
        .trim();

    if token.is_empty() {
        return Err("Missing bearer token");
    }
    Ok(Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpMessage, HttpRequest, HttpResponse};
    use crypto_core::Claims;

    const SECRET: &str = "gateway-test-secret";

    async fn whoami(req: HttpRequest) -> HttpResponse {
        let extensions = req.extensions();
        match (
            extensions.get::<AuthenticatedUser>().copied(),
            extensions.get::<CredentialRejection>().copied(),
        ) {
            (Some(AuthenticatedUser(id)), _) => HttpResponse::Ok().body(id.to_string()),
            (None, Some(CredentialRejection(reason))) => HttpResponse::Ok().body(reason),
            (None, None) => HttpResponse::Ok().body("anonymous"),
        }
    }

    fn codec() -> JwtCodec {
        JwtCodec::new(SECRET).unwrap()
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .wrap(JwtAuth::new(codec()))
                    .route("/whoami", web::get().to(whoami)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_valid_token_records_caller() {
        let app = app!();
        let user_id = Uuid::new_v4();
        let token = codec().issue_token(user_id).unwrap();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, user_id.to_string());
    }

    #[actix_web::test]
    async fn test_missing_header_is_anonymous() {
        let app = app!();

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, "anonymous");
    }

    #[actix_web::test]
    async fn test_expired_token_recorded_as_rejection() {
        let app = app!();
        let now = chrono::Utc::now().timestamp();
        let expired = codec()
            .encode_claims(&Claims {
                sub: Uuid::new_v4().to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", expired)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, "Invalid or expired token");
    }

    #[actix_web::test]
    async fn test_foreign_signature_recorded_as_rejection() {
        let app = app!();
        let token = JwtCodec::new("another-secret")
            .unwrap()
            .issue_token(Uuid::new_v4())
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body = test::read_body(resp).await;
        assert_eq!(body, "Invalid or expired token");
    }

    #[actix_web::test]
    async fn test_malformed_header_recorded_as_rejection() {
        let app = app!();

        for value in ["Basic dXNlcjpwYXNz", "token-without-scheme"] {
            let req = test::TestRequest::get()
                .uri("/whoami")
                .insert_header(("Authorization", value))
                .to_request();
            let body = test::call_and_read_body(&app, req).await;
            assert_eq!(body, "Authorization must use Bearer scheme", "header {value:?}");
        }

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Bearer "))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_ne!(body, "anonymous");
    }
}
