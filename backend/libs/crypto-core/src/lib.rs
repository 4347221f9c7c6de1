//! Token primitives shared by the gateway and the backend services.

pub mod jwt;

pub use jwt::{Claims, JwtCodec};
