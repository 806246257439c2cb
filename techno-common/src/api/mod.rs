//! API module for shared HTTP functionality
//!
//! # Contents
//!
//! - `types`: values exchanged with the directory and the session authority
//! - `headers`: credential headers on inbound and forwarded requests
//! - `guard`: axum middleware turning verdicts into HTTP responses
//!
//! Only `guard` decides status codes. Everything else returns values and
//! errors to the caller.

pub mod guard;
pub mod headers;
pub mod types;

pub use guard::{require_service_profile, require_session, GuardError};
pub use headers::{
    extract_service_profile, extract_token, inject_service_profile, inject_token,
    SERVICE_PROFILE_HEADER,
};
pub use types::AuthErrorResponse;
