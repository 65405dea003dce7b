//! Request middleware and extractors.

pub mod auth;
pub mod client_meta;
