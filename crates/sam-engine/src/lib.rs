pub mod browser;
pub mod chat;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod formatter;
pub mod notes;
pub mod services;

pub use sam_common::{ClassifiedCommand, CommandKind, classify};
