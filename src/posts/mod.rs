//! Posts Module
//! Mission: A simple member feed with likes and comments

pub mod api;
pub mod models;
pub mod store;

pub use store::PostStore;
