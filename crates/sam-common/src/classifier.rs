//! Rule-based intent classification for free-text messages.
//!
//! Rules are tried in a fixed order (navigation, searches, page actions,
//! information, notes, session control) and the first rule with a matching
//! alternative wins. Text that no rule claims becomes a `chat` command
//! carrying the original message untouched.

use crate::command::{ClassifiedCommand, CommandKind};
use crate::sites::KNOWN_SITES;
use regex::Regex;
use std::sync::LazyLock;

/// Trailing whitespace and sentence punctuation accepted after a command.
const END: &str = r"[\s?.!]*$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cleanup {
    /// Keep the capture as typed, minus surrounding whitespace.
    Trim,
    /// Also drop trailing `?!.` and one pair of surrounding quotes.
    Query,
}

impl Cleanup {
    fn apply(self, raw: &str) -> String {
        match self {
            Cleanup::Trim => raw.trim().to_string(),
            Cleanup::Query => clean_query(raw),
        }
    }
}

fn clean_query(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches(['?', '!', '.']).trim_end();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// One command kind and the pattern alternatives that trigger it.
///
/// Capture group `n` fills `params[n - 1]`; a group that did not take part in
/// the match still yields the parameter, as an empty string.
struct TriggerRule {
    kind: CommandKind,
    params: &'static [&'static str],
    cleanup: Cleanup,
    alternatives: Vec<Regex>,
}

impl TriggerRule {
    fn new(
        kind: CommandKind,
        params: &'static [&'static str],
        cleanup: Cleanup,
        alternatives: Vec<String>,
    ) -> Self {
        let alternatives = alternatives
            .iter()
            .map(|pattern| Regex::new(&format!("(?i){}", pattern)).unwrap())
            .collect();
        Self {
            kind,
            params,
            cleanup,
            alternatives,
        }
    }

    fn apply(&self, text: &str) -> Option<ClassifiedCommand> {
        let caps = self.alternatives.iter().find_map(|re| re.captures(text))?;
        let mut command = ClassifiedCommand::new(self.kind);
        for (idx, name) in self.params.iter().enumerate() {
            let raw = caps.get(idx + 1).map(|m| m.as_str()).unwrap_or_default();
            command = command.with_param(*name, self.cleanup.apply(raw));
        }
        Some(command)
    }
}

fn known_site_alternation() -> String {
    KNOWN_SITES
        .iter()
        .map(|(name, _)| regex::escape(name).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

/// Search triggers shared by the shopping/code sites: "search <site> for x",
/// "<site> search for x" and "find x on <site>".
fn site_search(site: &str) -> Vec<String> {
    vec![
        format!(r"\bsearch\s+(?:on\s+)?{site}\s+for\b\s*(.*?){END}"),
        format!(r"\b{site}\s+search\b(?:\s+for\b)?\s*(.*?){END}"),
        format!(r"^(?:find|look\s+for|search\s+for)\s+(.*?)\s+on\s+{site}{END}"),
    ]
}

static RULES: LazyLock<Vec<TriggerRule>> = LazyLock::new(|| {
    let known = known_site_alternation();
    vec![
        TriggerRule::new(
            CommandKind::Website,
            &["website"],
            Cleanup::Query,
            vec![
                format!(r"^open\s+website\b\s*(.*?){END}"),
                format!(r"^open\s+(https?://\S+){END}"),
                format!(r"^open\s+((?:www\.)?[\w-]+(?:\.[\w-]+)+(?:[/?#]\S*)?){END}"),
                format!(r"^open\s+({known}){END}"),
                format!(r"^go\s+to\s+(.*?){END}"),
                format!(r"^visit\s+(.*?){END}"),
            ],
        ),
        TriggerRule::new(
            CommandKind::Youtube,
            &["query"],
            Cleanup::Query,
            vec![
                format!(r"\bsearch\s+(?:on\s+)?youtube\s+for\b\s*(.*?){END}"),
                format!(r"\byoutube\s+search\b(?:\s+for\b)?\s*(.*?){END}"),
                format!(r"\bfind\s+on\s+youtube\b\s*(.*?){END}"),
                format!(r"\bsearch\s+youtube\b\s*(.*?){END}"),
                format!(
                    r"\b(?:play|watch|find|look\s+for|search\s+for)\s+(.*?)\s+on\s+youtube{END}"
                ),
            ],
        ),
        TriggerRule::new(
            CommandKind::Amazon,
            &["query"],
            Cleanup::Query,
            site_search("amazon"),
        ),
        TriggerRule::new(
            CommandKind::Github,
            &["query"],
            Cleanup::Query,
            site_search("github"),
        ),
        TriggerRule::new(
            CommandKind::Stackoverflow,
            &["query"],
            Cleanup::Query,
            site_search(r"stack\s*overflow"),
        ),
        TriggerRule::new(
            CommandKind::Google,
            &["query"],
            Cleanup::Query,
            vec![
                format!(r"\bsearch\s+(?:on\s+)?google\s+for\b\s*(.*?){END}"),
                format!(r"\bgoogle\s+search\b(?:\s+for\b)?\s*(.*?){END}"),
                format!(r"\bsearch\s+google\b\s*(.*?){END}"),
                format!(r"^google\s+(?:for\s+)?(.*?){END}"),
                format!(r"^search\s+(?:the\s+web\s+|online\s+)?for\s+(.*?){END}"),
            ],
        ),
        TriggerRule::new(
            CommandKind::Scroll,
            &["direction", "amount"],
            Cleanup::Trim,
            vec![
                format!(
                    r"^scroll(?:\s+the\s+page)?\s+(up|down)(?:\s+(?:by\s+)?(\d+)(?:\s+times?)?)?{END}"
                ),
                format!(r"^scroll(?:\s+the\s+page)?(){END}"),
            ],
        ),
        TriggerRule::new(
            CommandKind::Click,
            &["target"],
            Cleanup::Query,
            vec![format!(
                r"^click\b(?:\s+on)?(?:\s+the)?\s*(.*?)(?:\s+button)?{END}"
            )],
        ),
        TriggerRule::new(
            CommandKind::Extract,
            &[],
            Cleanup::Trim,
            vec![
                format!(r"^extract\s+(?:the\s+)?text(?:\s+from\s+(?:the\s+|this\s+)?page)?{END}"),
                format!(r"^(?:get|read)\s+(?:the\s+)?page\s+text{END}"),
            ],
        ),
        TriggerRule::new(
            CommandKind::Screenshot,
            &[],
            Cleanup::Trim,
            vec![
                format!(r"^(?:take\s+a\s+)?screenshot{END}"),
                format!(r"^capture\s+(?:the\s+)?(?:screen|page){END}"),
            ],
        ),
        TriggerRule::new(
            CommandKind::Weather,
            &["location"],
            Cleanup::Query,
            vec![
                format!(r"\bweather\s+(?:like\s+)?(?:today\s+)?(?:in|at|for)\s+(.*?){END}"),
                format!(r"\b(?:temperature|forecast)\s+(?:in|at|for)\s+(.*?){END}"),
                format!(
                    r"^(?:what(?:'s|\s+is)\s+the\s+|how(?:'s|\s+is)\s+the\s+)?weather(?:\s+like)?(?:\s+today)?(){END}"
                ),
            ],
        ),
        TriggerRule::new(
            CommandKind::News,
            &[],
            Cleanup::Trim,
            vec![format!(
                r"^(?:(?:show|give|get|read|tell)(?:\s+me)?\s+)?(?:the\s+)?(?:latest\s+|top\s+|today'?s\s+)?(?:news|headlines)(?:\s+headlines)?{END}"
            )],
        ),
        TriggerRule::new(
            CommandKind::NoteSave,
            &["note"],
            Cleanup::Trim,
            vec![
                // Notes may span lines, so `.` has to cross newlines.
                r"(?s)^save\s+(?:a\s+)?note\b\s*:?\s*(.*)$".to_string(),
                r"(?s)^take\s+a\s+note\b\s*:?\s*(.*)$".to_string(),
                r"(?s)^(?:add\s+(?:a\s+)?)?note\s*:\s*(.*)$".to_string(),
            ],
        ),
        TriggerRule::new(
            CommandKind::NoteRead,
            &[],
            Cleanup::Trim,
            vec![
                format!(
                    r"^(?:(?:show|get|read|list|view)\s+(?:me\s+)?)?(?:all\s+)?(?:my\s+)?(?:saved\s+)?notes{END}"
                ),
            ],
        ),
        TriggerRule::new(
            CommandKind::Help,
            &[],
            Cleanup::Trim,
            vec![
                format!(r"^(?:show\s+(?:me\s+)?(?:the\s+)?)?help(?:\s+me)?{END}"),
                format!(r"^what\s+can\s+you\s+do{END}"),
                format!(r"^(?:list\s+)?commands{END}"),
            ],
        ),
        TriggerRule::new(
            CommandKind::Clear,
            &[],
            Cleanup::Trim,
            vec![format!(
                r"^clear(?:\s+(?:the\s+)?(?:chat|conversation|screen))?(?:\s+history)?{END}"
            )],
        ),
        TriggerRule::new(
            CommandKind::Exit,
            &[],
            Cleanup::Trim,
            vec![format!(
                r"^(?:exit|quit|close|bye|goodbye)(?:\s+(?:the\s+)?(?:assistant|app|application))?{END}"
            )],
        ),
    ]
});

/// Classify a message. Never fails: unmatched text falls back to `chat`
/// with the original message, verbatim, as the `message` parameter.
pub fn classify(text: &str) -> ClassifiedCommand {
    let subject = text.trim();
    RULES
        .iter()
        .find_map(|rule| rule.apply(subject))
        .unwrap_or_else(|| ClassifiedCommand::chat(text))
}

/// Command kinds in the order their rules are tried; `chat` is implied last.
pub fn rule_order() -> Vec<CommandKind> {
    RULES.iter().map(|rule| rule.kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_query() {
        assert_eq!(clean_query("  cooking videos?! "), "cooking videos");
        assert_eq!(clean_query("\"rust lifetimes\""), "rust lifetimes");
        assert_eq!(clean_query("'a'"), "a");
        assert_eq!(clean_query(""), "");
    }

    #[test]
    fn test_every_pattern_compiles() {
        // Forces the lazy table; a bad pattern panics here instead of at runtime.
        assert_eq!(RULES.len(), rule_order().len());
    }
}
