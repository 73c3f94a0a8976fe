//! Cross-cutting HTTP middleware.
//!
//! Authentication lives in `auth::middleware`; this module holds request
//! logging.

pub mod logging;

pub use logging::request_logging;
