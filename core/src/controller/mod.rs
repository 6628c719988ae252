//! Stateful controllers driving the resource client.
//!
//! Each controller catches failures at its own boundary: the error message
//! is kept for display and the `Result` is still returned to the caller.

pub mod bulk;
pub mod form;
pub mod list;

pub use bulk::{confirmation_prompt, BulkActions, BulkOutcome, Confirm, DirectorySink, DownloadSink};
pub use form::{FormController, FormMode};
pub use list::ListController;
