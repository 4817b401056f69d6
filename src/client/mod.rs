//! Network implementations of the remote collaborator traits.

pub mod http;

pub use http::HttpPortalClient;
