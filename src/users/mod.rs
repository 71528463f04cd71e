//! User update flow.
//!
//! - [`UpdateUserHandler`] - lookup, uniqueness check, merge, and replace
//! - [`resolve_user_id`] - route binding with last-path-segment fallback
//! - [`merge_user`] / [`is_truthy`] - field overlay rules
//! - [`UserDocument`] / [`UserPatch`] - stored document and request body views

pub mod handler;
pub mod identifier;
pub mod merge;
pub mod model;

pub use handler::UpdateUserHandler;
pub use identifier::resolve_user_id;
pub use merge::{is_truthy, merge_user};
pub use model::{USER_TYPE, UserDocument, UserPatch};
