//! # Techno Common Library
//!
//! Shared code for services that sit behind the techno directory and session
//! authority:
//! - Service location lookup (Resolver)
//! - Token and service-profile validation (Validator)
//! - Header helpers for inbound and forwarded credentials
//! - Axum guards mapping validation outcomes to HTTP responses
//! - Configuration loading
//! - Date utilities

pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod resolver;
pub mod time;
pub mod validator;

mod client;

pub use access::ServiceAccess;
pub use api::types::{
    ApiConfig, CallContext, ResolveTarget, ServiceProfile, SessionEnvelope, SharedSecret,
};
pub use config::{SessionContract, TechnoConfig};
pub use error::{Call, ClientError, Error, Result};
pub use resolver::Resolver;
pub use validator::{Validator, Verdict};
