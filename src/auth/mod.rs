//! Authentication Module
//! Mission: Stateless bearer-token auth in front of the resource handlers

pub mod api;
pub mod middleware;
pub mod models;
pub mod token;
pub mod user_store;

pub use middleware::{auth_middleware, AuthUser};
pub use token::{TokenCodec, TokenError};
pub use user_store::UserStore;
