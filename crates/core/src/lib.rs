//! Maquette domain core.
//!
//! Pure logic shared by the database and API crates: the HTML/CSS
//! validation scanners and their severity policy, the content sanitizer,
//! the rate-limiter abstraction, and common types. Nothing in this crate
//! touches the database or the network.

pub mod error;
pub mod pagination;
pub mod rate_limit;
pub mod sanitize;
pub mod types;
pub mod validation;
