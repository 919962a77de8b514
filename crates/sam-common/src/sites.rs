//! Well-known sites and the search engines the assistant can drive.

use crate::command::CommandKind;

/// Bare names that `open <name>` resolves to a full address.
pub const KNOWN_SITES: &[(&str, &str)] = &[
    ("youtube", "https://www.youtube.com"),
    ("google", "https://www.google.com"),
    ("amazon", "https://www.amazon.com"),
    ("github", "https://github.com"),
    ("stackoverflow", "https://stackoverflow.com"),
    ("stack overflow", "https://stackoverflow.com"),
    ("wikipedia", "https://www.wikipedia.org"),
    ("gmail", "https://mail.google.com"),
    ("reddit", "https://www.reddit.com"),
];

pub fn known_site_url(name: &str) -> Option<&'static str> {
    let wanted = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    KNOWN_SITES
        .iter()
        .find(|(site, _)| *site == wanted)
        .map(|(_, url)| *url)
}

/// Turn whatever the user typed after "open" into something a browser accepts.
pub fn normalize_url(target: &str) -> String {
    let target = target.trim();
    if let Some(url) = known_site_url(target) {
        return url.to_string();
    }
    let lower = target.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSite {
    YouTube,
    Google,
    Amazon,
    GitHub,
    StackOverflow,
}

impl SearchSite {
    pub fn for_kind(kind: CommandKind) -> Option<Self> {
        match kind {
            CommandKind::Youtube => Some(SearchSite::YouTube),
            CommandKind::Google => Some(SearchSite::Google),
            CommandKind::Amazon => Some(SearchSite::Amazon),
            CommandKind::Github => Some(SearchSite::GitHub),
            CommandKind::Stackoverflow => Some(SearchSite::StackOverflow),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchSite::YouTube => "YouTube",
            SearchSite::Google => "Google",
            SearchSite::Amazon => "Amazon",
            SearchSite::GitHub => "GitHub",
            SearchSite::StackOverflow => "Stack Overflow",
        }
    }

    fn search_base(&self) -> &'static str {
        match self {
            SearchSite::YouTube => "https://www.youtube.com/results?search_query=",
            SearchSite::Google => "https://www.google.com/search?q=",
            SearchSite::Amazon => "https://www.amazon.com/s?k=",
            SearchSite::GitHub => "https://github.com/search?q=",
            SearchSite::StackOverflow => "https://stackoverflow.com/search?q=",
        }
    }

    /// Results page for `query`, form-encoded so spaces become `+`.
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
        format!("{}{}", self.search_base(), encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com/a"), "http://example.com/a");
        assert_eq!(normalize_url("  YouTube "), "https://www.youtube.com");
        assert_eq!(normalize_url("stack   overflow"), "https://stackoverflow.com");
    }

    #[test]
    fn test_search_url_encodes_query() {
        assert_eq!(
            SearchSite::Google.search_url("python tutorials"),
            "https://www.google.com/search?q=python+tutorials"
        );
        assert_eq!(
            SearchSite::YouTube.search_url("c++ & rust"),
            "https://www.youtube.com/results?search_query=c%2B%2B+%26+rust"
        );
    }

    #[test]
    fn test_every_search_kind_has_a_site() {
        let searchable = CommandKind::ALL
            .into_iter()
            .filter(|k| SearchSite::for_kind(*k).is_some())
            .count();
        assert_eq!(searchable, 5);
    }
}
