//! Endpoint façades over the request engine.

mod gists;
mod issue_comments;
mod pull_requests;
mod repositories;
mod review_comments;

pub use gists::*;
pub use issue_comments::*;
pub use pull_requests::*;
pub use repositories::*;
pub use review_comments::*;
