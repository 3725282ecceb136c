//! Review store MCP tools.

pub mod list;
pub mod moderate;
pub mod submit;

pub use list::{ReviewsListParams, list_impl};
pub use moderate::{ModerationAction, ReviewModerateParams, moderate_impl};
pub use submit::{ReviewSubmitParams, submit_impl};
