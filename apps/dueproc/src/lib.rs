//! # dueproc
//!
//! Library half of the dueproc binary: the CLI, the HTTP API and the
//! file-backed case source. Exposed as a library so integration tests can
//! drive the router and the source directly.

pub mod api;
pub mod cli;
pub mod source;
