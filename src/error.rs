//! Error type shared by the store, the renderers and the request handlers.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    /// Missing post or tag. Carries a short description of what was looked up.
    #[error("{0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("template error: {0}")]
    Template(String),

    #[error("markdown error: {0}")]
    Markdown(String),

    #[error("mail error: {0}")]
    Mail(String),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ramhorns::Error> for BlogError {
    fn from(value: ramhorns::Error) -> Self {
        BlogError::Template(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
