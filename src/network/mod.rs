//! HTTP networking module
//!
//! Provides the HTTP client shared by search backends, page fetches and
//! collaborator APIs.

mod client;
mod user_agent;

pub use client::HttpClient;
pub use user_agent::{accept_json, generate_user_agent};
