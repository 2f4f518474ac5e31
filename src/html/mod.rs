// Minimal HTML document model: enough to find rating widgets, read their
// text and rewrite inline styles without disturbing the rest of the markup.

pub mod dom;
pub mod entities;
pub mod selector;
pub mod style;
pub mod tokenizer;

pub use dom::{Document, Element, ElementId};
pub use selector::Selector;
