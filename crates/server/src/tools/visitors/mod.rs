//! Visitor counter MCP tools.

pub mod track;

pub use track::{VisitorTrackParams, track_impl};
