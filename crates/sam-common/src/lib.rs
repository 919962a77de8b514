pub mod classifier;
pub mod command;
pub mod sites;

pub use classifier::classify;
pub use command::{ClassifiedCommand, CommandKind, ParseKindError};
