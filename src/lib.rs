//! DevConnector Backend Library
//!
//! Social-profile REST API: registration and login with stateless bearer
//! tokens, member profiles, and a post feed. Exposes the router and stores
//! for use by the binary and tests.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod posts;
pub mod profile;
pub mod storage;
pub mod validation;

pub use app::{build_router, AppState};
