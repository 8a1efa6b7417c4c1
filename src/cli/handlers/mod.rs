//! Command handlers for the CLI.
//!
//! Handlers receive the backend to work on; they never pick one themselves.

mod add;
mod check;
mod completions;
mod delete;
mod list;
mod serve;
mod view_edit;


pub use add::handle_add;
pub use check::handle_check;
pub use completions::handle_completions;
pub use delete::handle_delete;
pub use list::{handle_list, handle_search};
pub use serve::handle_serve;
pub use view_edit::{handle_edit, handle_view};

// Re-export for tests
#[cfg(test)]
pub(crate) use add::handle_add_impl;
#[cfg(test)]
pub(crate) use view_edit::handle_edit_impl;
