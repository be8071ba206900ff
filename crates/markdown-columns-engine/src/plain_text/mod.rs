//! A render host that turns markdown into wrapped lines of text.
//!
//! Heights are line counts, so the whole engine can run without a display:
//! the terminal viewer draws these columns directly, and integration tests
//! lay real markdown out with them.

pub mod column;
pub mod renderer;

pub use column::{TextColumn, TextTarget, wrap_line};
pub use renderer::{LineStyle, PlainTextRenderer, TextLine, TextNode};
