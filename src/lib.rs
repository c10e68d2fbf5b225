pub mod config;
pub mod content;
pub mod error;
pub mod forms;
pub mod logger;
pub mod mailer;
pub mod models;
pub mod paginator;
pub mod query_string;
pub mod server;
pub mod store;
pub mod text_utils;
mod view;
#[cfg(test)]
mod test_data;
