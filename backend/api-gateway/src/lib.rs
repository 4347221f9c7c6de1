pub mod clients;
pub mod config;
pub mod error;
pub mod middleware;
pub mod rest_api;
