//! Rope-backed draft buffer.
//!
//! Holds the canonical document text and the cursor. Ghost text never lives
//! here; it is layered on top by [`crate::suggest::overlay`].

mod buffer;

pub use buffer::{Cursor, Direction, EditorBuffer};
