pub mod markdown_renderer;
pub mod summary;
