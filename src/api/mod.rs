//! Strato REST API plumbing
//!
//! - [`auth`] - keystone password auth and token caching
//! - [`client`] - main API client with per-service URL builders
//! - [`http`] - HTTP utilities shared by every resource client

pub mod auth;
pub mod client;
pub mod http;
