//! Interceptor MCP tools.

pub mod fetch;
pub mod register;
pub mod status;

pub use fetch::{ShellFetchParams, fetch_impl};
pub use register::{ShellRegisterParams, register_impl};
pub use status::status_impl;
