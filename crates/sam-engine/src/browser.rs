use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::str::FromStr;
use thiserror::Error;
use tokio::process::Command;
use tracing::info;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("web automation is disabled")]
    Disabled,
    #[error("{0} is not supported by this browser")]
    NotSupported(String),
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
    },
    #[error("no browser command configured")]
    NoCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl FromStr for ScrollDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(ScrollDirection::Up),
            "down" => Ok(ScrollDirection::Down),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollDirection::Up => f.write_str("up"),
            ScrollDirection::Down => f.write_str("down"),
        }
    }
}

/// Where browser-backed commands end up. Only `open` is required; page-level
/// actions need a driven browser and default to `NotSupported`.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Show `url` to the user.
    async fn open(&mut self, url: &str) -> Result<(), BrowserError>;

    async fn scroll(&mut self, _direction: ScrollDirection, _times: u32) -> Result<(), BrowserError> {
        Err(BrowserError::NotSupported("scroll".into()))
    }

    /// Click the element whose visible text matches `target`.
    async fn click(&mut self, _target: &str) -> Result<(), BrowserError> {
        Err(BrowserError::NotSupported("click".into()))
    }

    async fn extract_text(&mut self) -> Result<String, BrowserError> {
        Err(BrowserError::NotSupported("extract_text".into()))
    }

    /// PNG bytes of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, BrowserError> {
        Err(BrowserError::NotSupported("screenshot".into()))
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Hands URLs to the desktop's default browser.
pub struct SystemBrowser {
    program: String,
    args: Vec<String>,
}

impl SystemBrowser {
    /// `command` overrides the platform opener, e.g. `firefox --new-tab`.
    pub fn new(command: Option<&str>) -> Result<Self, BrowserError> {
        let (program, args) = match command {
            Some(command) => {
                let mut parts = command.split_whitespace().map(String::from);
                let program = parts.next().ok_or(BrowserError::NoCommand)?;
                (program, parts.collect())
            }
            None => opener_for(std::env::consts::OS),
        };
        Ok(Self { program, args })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector handed to the program for `url`.
    fn argv(&self, url: &str) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push(url.to_string());
        argv
    }
}

/// Default URL opener per OS. None of these go through a shell, so URLs
/// containing `&`, `|` or `^` reach the opener as a single argument.
fn opener_for(os: &str) -> (String, Vec<String>) {
    match os {
        "macos" => ("open".to_string(), Vec::new()),
        "windows" => (
            "rundll32".to_string(),
            vec!["url.dll,FileProtocolHandler".to_string()],
        ),
        _ => ("xdg-open".to_string(), Vec::new()),
    }
}

#[async_trait]
impl Browser for SystemBrowser {
    async fn open(&mut self, url: &str) -> Result<(), BrowserError> {
        info!(program = %self.program, url, "opening url");
        let status = Command::new(&self.program)
            .args(self.argv(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| BrowserError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BrowserError::Exit {
                program: self.program.clone(),
                status,
            })
        }
    }
}

/// Stand-in used when web automation is switched off.
pub struct DisabledBrowser;

#[async_trait]
impl Browser for DisabledBrowser {
    async fn open(&mut self, _url: &str) -> Result<(), BrowserError> {
        Err(BrowserError::Disabled)
    }

    async fn scroll(&mut self, _direction: ScrollDirection, _times: u32) -> Result<(), BrowserError> {
        Err(BrowserError::Disabled)
    }

    async fn click(&mut self, _target: &str) -> Result<(), BrowserError> {
        Err(BrowserError::Disabled)
    }

    async fn extract_text(&mut self) -> Result<String, BrowserError> {
        Err(BrowserError::Disabled)
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BrowserError> {
        Err(BrowserError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_command_is_split() {
        let browser = SystemBrowser::new(Some("firefox --new-tab")).unwrap();
        assert_eq!(browser.program(), "firefox");
        assert_eq!(browser.args, vec!["--new-tab".to_string()]);
    }

    #[test]
    fn test_windows_opener_bypasses_cmd() {
        let (program, args) = opener_for("windows");
        assert_eq!(program, "rundll32");
        let browser = SystemBrowser { program, args };

        let url = "https://example.com/?a=1&calc|whoami^";
        assert_eq!(
            browser.argv(url),
            vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()]
        );
        assert_ne!(browser.program(), "cmd");
    }

    #[test]
    fn test_unix_openers() {
        assert_eq!(opener_for("macos").0, "open");
        assert_eq!(opener_for("linux"), ("xdg-open".to_string(), Vec::new()));
    }

    #[test]
    fn test_blank_command_is_rejected() {
        assert!(matches!(
            SystemBrowser::new(Some("   ")),
            Err(BrowserError::NoCommand)
        ));
    }

    #[test]
    fn test_scroll_direction_parse() {
        assert_eq!("Down".parse(), Ok(ScrollDirection::Down));
        assert_eq!(" up ".parse(), Ok(ScrollDirection::Up));
        assert!("sideways".parse::<ScrollDirection>().is_err());
    }

    #[tokio::test]
    async fn test_disabled_browser_refuses_everything() {
        let mut browser = DisabledBrowser;
        assert!(!browser.is_enabled());
        assert!(matches!(browser.open("https://example.com").await, Err(BrowserError::Disabled)));
        assert!(matches!(browser.screenshot().await, Err(BrowserError::Disabled)));
    }

    #[tokio::test]
    async fn test_missing_program_reports_launch_error() {
        let mut browser = SystemBrowser::new(Some("sam-definitely-not-a-real-browser")).unwrap();
        let err = browser.open("https://example.com").await.unwrap_err();
        assert!(matches!(err, BrowserError::Launch { .. }));
    }
}
