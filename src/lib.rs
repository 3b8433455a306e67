pub mod api;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod logging;
pub mod record_view;
pub mod store;
