use crate::browser::{Browser, BrowserError, DisabledBrowser, ScrollDirection, SystemBrowser};
use crate::chat::{ChatClient, ChatError};
use crate::config::SamConfig;
use crate::formatter;
use crate::notes::{NoteError, NoteStore};
use crate::services::{
    self, NewsApiClient, NewsError, NewsProvider, OpenWeatherClient, WeatherError, WeatherProvider,
};
use sam_common::sites::{SearchSite, normalize_url};
use sam_common::{ClassifiedCommand, CommandKind, classify};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Something the user has to supply; rendered as a prompt.
    #[error("{0}")]
    MissingParameter(String),
    #[error("{}", describe_browser_failure(.action, .source))]
    Browser {
        action: String,
        #[source]
        source: BrowserError,
    },
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    News(#[from] NewsError),
    #[error("Error saving note: {0}")]
    SaveNote(#[source] NoteError),
    #[error("Error retrieving notes: {0}")]
    ReadNotes(#[source] NoteError),
    #[error("Error saving screenshot: {0}")]
    Screenshot(#[source] std::io::Error),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("Failed to set up HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

fn describe_browser_failure(action: &str, error: &BrowserError) -> String {
    match error {
        BrowserError::Disabled => format!("I would {action}, but web automation is disabled."),
        BrowserError::NotSupported(_) => {
            format!("Browser automation is not available. Cannot {action}.")
        }
        other => format!("Failed to {action}. Error: {other}"),
    }
}

/// What the chat loop should do after showing a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Conversation history was wiped; the transcript may be cleared too.
    Clear,
    Exit,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub command: ClassifiedCommand,
    pub text: String,
    pub outcome: Outcome,
    pub success: bool,
}

/// Routes classified messages to the collaborator that can answer them.
pub struct Dispatcher {
    browser: Box<dyn Browser>,
    weather: Box<dyn WeatherProvider>,
    news: Box<dyn NewsProvider>,
    notes: NoteStore,
    chat: ChatClient,
    screenshot_dir: PathBuf,
    ai_routing: bool,
}

impl Dispatcher {
    pub fn new(
        browser: Box<dyn Browser>,
        weather: Box<dyn WeatherProvider>,
        news: Box<dyn NewsProvider>,
        notes: NoteStore,
        chat: ChatClient,
    ) -> Self {
        Self {
            browser,
            weather,
            news,
            notes,
            chat,
            screenshot_dir: PathBuf::from("."),
            ai_routing: false,
        }
    }

    /// Build the real collaborators described by `config`.
    pub fn from_config(config: &SamConfig) -> Result<Self, DispatchError> {
        let http = services::http_client(config.assistant.request_timeout_secs)?;

        let browser: Box<dyn Browser> = if config.browser.enabled {
            match SystemBrowser::new(config.browser.command.as_deref()) {
                Ok(browser) => Box::new(browser),
                Err(e) => {
                    warn!(error = %e, "browser unavailable, web automation disabled");
                    Box::new(DisabledBrowser)
                }
            }
        } else {
            Box::new(DisabledBrowser)
        };

        info!(
            web_automation = browser.is_enabled(),
            ai_routing = config.assistant.ai_routing,
            "assistant ready"
        );

        let dispatcher = Self::new(
            browser,
            Box::new(OpenWeatherClient::new(http.clone(), &config.weather)),
            Box::new(NewsApiClient::new(http.clone(), &config.news)),
            NoteStore::new(config.notes.path.clone()),
            ChatClient::from_config(http, &config.chat),
        )
        .with_screenshot_dir(config.browser.screenshot_dir.clone())
        .with_ai_routing(config.assistant.ai_routing);

        Ok(dispatcher)
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    pub fn with_ai_routing(mut self, enabled: bool) -> Self {
        self.ai_routing = enabled;
        self
    }

    pub fn chat(&self) -> &ChatClient {
        &self.chat
    }

    /// Classify and answer one message. Failures come back as reply text.
    pub async fn handle(&mut self, text: &str) -> Reply {
        let command = classify(text);
        debug!(kind = %command.kind, params = ?command.parameters, "classified message");
        let command = self.route(command).await;
        self.dispatch(command).await
    }

    /// Let the model re-route messages the rules left as chat.
    async fn route(&self, command: ClassifiedCommand) -> ClassifiedCommand {
        if !self.ai_routing || command.kind != CommandKind::Chat {
            return command;
        }
        let message = command.param_or_empty("message");
        let routed = self.chat.analyze_command(message).await;
        match routed.kind {
            CommandKind::Chat | CommandKind::Exit => command,
            kind => {
                info!(%kind, "model re-routed message");
                routed
            }
        }
    }

    pub async fn dispatch(&mut self, command: ClassifiedCommand) -> Reply {
        match self.execute(&command).await {
            Ok((text, outcome)) => Reply {
                command,
                text,
                outcome,
                success: true,
            },
            Err(e) => {
                match &e {
                    DispatchError::MissingParameter(_) => debug!(kind = %command.kind, "missing parameter"),
                    other => warn!(kind = %command.kind, error = %other, "command failed"),
                }
                Reply {
                    command,
                    text: e.to_string(),
                    outcome: Outcome::Continue,
                    success: false,
                }
            }
        }
    }

    async fn execute(&mut self, command: &ClassifiedCommand) -> Result<(String, Outcome), DispatchError> {
        let text = match command.kind {
            CommandKind::Website => self.open_website(command.param_or_empty("website")).await?,
            CommandKind::Youtube
            | CommandKind::Google
            | CommandKind::Amazon
            | CommandKind::Github
            | CommandKind::Stackoverflow => self.search(command).await?,
            CommandKind::Weather => self.weather(command.param_or_empty("location")).await?,
            CommandKind::News => formatter::format_headlines(&self.news.top_headlines().await?),
            CommandKind::NoteSave => self.save_note(command.param_or_empty("note")).await?,
            CommandKind::NoteRead => {
                let notes = self.notes.list().await.map_err(DispatchError::ReadNotes)?;
                formatter::format_notes(&notes)
            }
            CommandKind::Help => formatter::help_text(),
            CommandKind::Clear => {
                self.chat.clear_history();
                return Ok(("Conversation history cleared.".to_string(), Outcome::Clear));
            }
            CommandKind::Exit => {
                return Ok(("Goodbye! Closing the assistant...".to_string(), Outcome::Exit));
            }
            CommandKind::Scroll => self.scroll(command).await?,
            CommandKind::Click => self.click(command.param_or_empty("target")).await?,
            CommandKind::Extract => {
                let action = "extract text from the page";
                let text = self
                    .browser
                    .extract_text()
                    .await
                    .map_err(|source| browser_error(action, source))?;
                if text.trim().is_empty() {
                    "The page has no visible text.".to_string()
                } else {
                    text
                }
            }
            CommandKind::Screenshot => self.screenshot().await?,
            CommandKind::Chat => self.chat.ask(command.param_or_empty("message")).await?,
        };
        Ok((text, Outcome::Continue))
    }

    async fn open_website(&mut self, target: &str) -> Result<String, DispatchError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(missing("Please specify a website to open."));
        }
        let url = normalize_url(target);
        self.browser
            .open(&url)
            .await
            .map_err(|source| browser_error(format!("open {url}"), source))?;
        Ok(format!("Opening {url}..."))
    }

    async fn search(&mut self, command: &ClassifiedCommand) -> Result<String, DispatchError> {
        let Some(site) = SearchSite::for_kind(command.kind) else {
            return Err(missing(format!("{} is not a search command.", command.kind)));
        };
        let query = command.param_or_empty("query").trim();
        if query.is_empty() {
            return Err(missing(format!(
                "Please specify what to search for on {}.",
                site.name()
            )));
        }
        let url = site.search_url(query);
        self.browser
            .open(&url)
            .await
            .map_err(|source| browser_error(format!("search {} for '{query}'", site.name()), source))?;
        Ok(format!("Searching {} for '{query}'...", site.name()))
    }

    async fn weather(&self, location: &str) -> Result<String, DispatchError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(missing("Please specify a city for weather information."));
        }
        let report = self.weather.current(location).await?;
        Ok(formatter::format_weather(&report))
    }

    async fn save_note(&self, content: &str) -> Result<String, DispatchError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(missing("Please provide content for your note."));
        }
        let note = self
            .notes
            .append(content)
            .await
            .map_err(DispatchError::SaveNote)?;
        Ok(format!("Note saved: {}", note.content))
    }

    async fn scroll(&mut self, command: &ClassifiedCommand) -> Result<String, DispatchError> {
        let direction: ScrollDirection = command
            .param_or_empty("direction")
            .parse()
            .map_err(|_| missing("Please specify whether to scroll up or down."))?;
        let amount = command.param_or_empty("amount").trim();
        let times = if amount.is_empty() {
            1
        } else {
            match amount.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(missing(
                        "Please specify how far to scroll, e.g. 'scroll down 3'.",
                    ));
                }
            }
        };
        self.browser
            .scroll(direction, times)
            .await
            .map_err(|source| browser_error(format!("scroll {direction}"), source))?;
        let unit = if times == 1 { "time" } else { "times" };
        Ok(format!("Scrolled {direction} {times} {unit}."))
    }

    async fn click(&mut self, target: &str) -> Result<String, DispatchError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(missing("Please specify what to click."));
        }
        self.browser
            .click(target)
            .await
            .map_err(|source| browser_error(format!("click '{target}'"), source))?;
        Ok(format!("Clicked '{target}'."))
    }

    async fn screenshot(&mut self) -> Result<String, DispatchError> {
        let action = "take a screenshot";
        let png = self
            .browser
            .screenshot()
            .await
            .map_err(|source| browser_error(action, source))?;

        tokio::fs::create_dir_all(&self.screenshot_dir)
            .await
            .map_err(DispatchError::Screenshot)?;
        let path = self
            .screenshot_dir
            .join(format!("screenshot_{}.png", chrono::Utc::now().timestamp()));
        tokio::fs::write(&path, png)
            .await
            .map_err(DispatchError::Screenshot)?;
        info!(path = %path.display(), "screenshot saved");
        Ok(format!("Screenshot saved as {}", path.display()))
    }
}

fn missing(prompt: impl Into<String>) -> DispatchError {
    DispatchError::MissingParameter(prompt.into())
}

fn browser_error(action: impl Into<String>, source: BrowserError) -> DispatchError {
    DispatchError::Browser {
        action: action.into(),
        source,
    }
}
