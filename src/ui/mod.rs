//! Terminal UI components.
//!
//! The editor pane draws the document plus ghost text for a visible
//! suggestion; the footer carries toasts and the status bar.

mod overlays;
mod render;
mod status;

pub use render::{line_number_width, render};
pub use status::suggestion_status;

#[cfg(test)]
mod tests;
