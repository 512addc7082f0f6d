//! Compute backends the coordinator can be wired to.

pub mod http;
pub mod local;
pub mod router;
