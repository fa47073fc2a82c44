//! HTTP middleware.

pub mod caller;
pub mod errors;
