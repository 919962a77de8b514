use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of things a message can ask the assistant to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    #[serde(alias = "open_website", alias = "open")]
    Website,
    #[serde(alias = "youtube_search")]
    Youtube,
    #[serde(alias = "google_search")]
    Google,
    Amazon,
    Github,
    #[serde(alias = "stack_overflow")]
    Stackoverflow,
    Weather,
    News,
    #[serde(alias = "notes_save")]
    NoteSave,
    #[serde(alias = "notes_read")]
    NoteRead,
    Help,
    Exit,
    Clear,
    Scroll,
    Click,
    Extract,
    Screenshot,
    Chat,
}

impl CommandKind {
    pub const ALL: [CommandKind; 18] = [
        CommandKind::Website,
        CommandKind::Youtube,
        CommandKind::Google,
        CommandKind::Amazon,
        CommandKind::Github,
        CommandKind::Stackoverflow,
        CommandKind::Weather,
        CommandKind::News,
        CommandKind::NoteSave,
        CommandKind::NoteRead,
        CommandKind::Help,
        CommandKind::Exit,
        CommandKind::Clear,
        CommandKind::Scroll,
        CommandKind::Click,
        CommandKind::Extract,
        CommandKind::Screenshot,
        CommandKind::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Website => "website",
            CommandKind::Youtube => "youtube",
            CommandKind::Google => "google",
            CommandKind::Amazon => "amazon",
            CommandKind::Github => "github",
            CommandKind::Stackoverflow => "stackoverflow",
            CommandKind::Weather => "weather",
            CommandKind::News => "news",
            CommandKind::NoteSave => "note_save",
            CommandKind::NoteRead => "note_read",
            CommandKind::Help => "help",
            CommandKind::Exit => "exit",
            CommandKind::Clear => "clear",
            CommandKind::Scroll => "scroll",
            CommandKind::Click => "click",
            CommandKind::Extract => "extract",
            CommandKind::Screenshot => "screenshot",
            CommandKind::Chat => "chat",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown command type: {0}")]
pub struct ParseKindError(pub String);

impl FromStr for CommandKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// A message after classification: what to do, plus the arguments pulled out
/// of the text. Built fresh for every message and dropped after dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCommand {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl ClassifiedCommand {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            parameters: BTreeMap::new(),
        }
    }

    /// The universal fallback: hand the whole message to the chat model.
    pub fn chat(message: impl Into<String>) -> Self {
        Self::new(CommandKind::Chat).with_param("message", message)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Parameter value, or the empty string when it was never extracted.
    pub fn param_or_empty(&self, name: &str) -> &str {
        self.param(name).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in CommandKind::ALL {
            assert_eq!(kind.as_str().parse::<CommandKind>(), Ok(kind));
        }
        assert!("teleport".parse::<CommandKind>().is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let cmd = ClassifiedCommand::new(CommandKind::NoteSave).with_param("note", "buy milk");
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "note_save", "parameters": {"note": "buy milk"}})
        );
    }

    #[test]
    fn test_deserialize_accepts_aliases_and_missing_parameters() {
        let cmd: ClassifiedCommand = serde_json::from_str(r#"{"type": "open_website"}"#).unwrap();
        assert_eq!(cmd.kind, CommandKind::Website);
        assert!(cmd.parameters.is_empty());
        assert_eq!(cmd.param_or_empty("website"), "");
    }
}
