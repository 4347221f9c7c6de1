//! Per-method access policy
//!
//! Each service declares which of its RPCs may be called without a token.
//! Handlers call [`AccessPolicy::authorize`] first and get back the [`Caller`].

use crate::extensions::JwtClaimsExt;
use std::collections::HashSet;
use tonic::{Request, Status};
use uuid::Uuid;

/// Identity of whoever is calling a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(Uuid),
}

impl Caller {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(*id),
        }
    }

    pub fn require_user(&self) -> Result<Uuid, Status> {
        self.user_id()
            .ok_or_else(|| Status::unauthenticated("Missing authorization header"))
    }

    /// Resolve the acting user for a mutation that also carries a `user_id`
    /// in its body. An empty body id defers to the token; a different one is
    /// refused.
    pub fn acting_as(&self, body_user_id: &str) -> Result<Uuid, Status> {
        let user_id = self.require_user()?;
        let body_user_id = body_user_id.trim();

        if body_user_id.is_empty() {
            return Ok(user_id);
        }

        match Uuid::parse_str(body_user_id) {
            Ok(id) if id == user_id => Ok(user_id),
            _ => Err(Status::permission_denied(
                "user_id does not match authenticated user",
            )),
        }
    }
}

/// Set of methods that accept anonymous callers
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    public_methods: HashSet<&'static str>,
}

impl AccessPolicy {
    pub fn new(public_methods: &[&'static str]) -> Self {
        Self {
            public_methods: public_methods.iter().copied().collect(),
        }
    }

    pub fn is_public(&self, method: &str) -> bool {
        self.public_methods.contains(method)
    }

    /// Decide who the caller is for `method`.
    ///
    /// Public methods never fail: a refused token just makes the caller
    /// anonymous. Every other method requires valid claims.
    pub fn authorize<T>(&self, request: &Request<T>, method: &str) -> Result<Caller, Status> {
        if self.is_public(method) {
            return Ok(request
                .optional_claims()
                .map(|claims| Caller::User(claims.user_id))
                .unwrap_or(Caller::Anonymous));
        }

        let claims = request.jwt_claims()?;
        Ok(Caller::User(claims.user_id))
    }
}
