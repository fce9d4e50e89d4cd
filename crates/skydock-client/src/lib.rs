//! HTTP access to the Skydock backend's chat endpoints.
//!
//! [`ApiClient`] is the single concrete implementation of the
//! [`skydock_chat::ChatTransport`] and [`skydock_session::SessionSource`]
//! seams. The rest of the backend surface (projects, deployments, domains,
//! env vars, tokens) is not exposed here.

/// The backend API client.
pub mod api;

pub use api::ApiClient;
