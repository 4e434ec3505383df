pub mod markdown;
pub mod text;

pub use markdown::{format_entities, is_inside_markdown_link};
pub use text::is_empty_or_whitespace;
