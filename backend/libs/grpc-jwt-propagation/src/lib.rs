//! Credential validation and propagation for the gRPC services
//!
//! ## Core Components
//!
//! - **JwtClaims**: validated identity of the caller
//! - **JwtServerInterceptor**: inspects the `authorization` and `friend_ids`
//!   metadata of every incoming request and stores the outcome in request
//!   extensions
//! - **AccessPolicy**: per-service allow-list of methods that accept
//!   anonymous callers; resolves the `Caller` for a handler
//! - **JwtClientInterceptor**: forwards the caller's bearer token and friend
//!   ids on outgoing calls (used by the gateway)
//! - **JwtClaimsExt**: request extension trait for handlers
//!
//! ## Server Side
//!
//! ```rust,no_run
//! use grpc_jwt_propagation::{AccessPolicy, JwtServerInterceptor};
//! use crypto_core::JwtCodec;
//!
//! # fn example() -> anyhow::Result<()> {
//! let codec = JwtCodec::new(&std::env::var("JWT_SECRET")?)?;
//! let interceptor = JwtServerInterceptor::new(codec);
//! let policy = AccessPolicy::new(&["GetPost", "GetPosts", "GetComments"]);
//! // let service = PostServiceServer::with_interceptor(PostServiceImpl::new(.., policy), interceptor);
//! # Ok(())
//! # }
//! ```
//!
//! A handler then resolves its caller:
//!
//! ```rust,ignore
//! let caller = self.policy.authorize(&request, "CreatePost")?;
//! let user_id = caller.acting_as(&request.get_ref().user_id)?;
//! ```
//!
//! ## Failure Modes
//!
//! - No token on a protected method = `Status::unauthenticated`
//! - Malformed or invalid token on a protected method = `Status::unauthenticated`
//! - Token subject differs from the `user_id` in the body = `Status::permission_denied`

mod claims;
mod client;
mod extensions;
mod metadata;
mod policy;
mod server;

pub use claims::JwtClaims;
pub use client::JwtClientInterceptor;
pub use extensions::JwtClaimsExt;
pub use metadata::{parse_friend_ids, FriendIds, FRIEND_IDS_METADATA_KEY};
pub use policy::{AccessPolicy, Caller};
pub use server::{CredentialRejection, JwtServerInterceptor};

// Re-export tonic Status for convenience
pub use tonic::Status;
