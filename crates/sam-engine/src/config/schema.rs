use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamConfig {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// An explicit key from the config file wins; otherwise read the named
/// environment variable. Blank values count as missing.
fn resolve_api_key(explicit: &Option<String>, env_var: &str) -> Option<String> {
    fn non_blank(key: &str) -> Option<String> {
        let key = key.trim();
        (!key.is_empty()).then(|| key.to_string())
    }

    explicit
        .as_deref()
        .and_then(non_blank)
        .or_else(|| std::env::var(env_var).ok().as_deref().and_then(non_blank))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Ask the chat model to classify messages the rules leave as chat.
    #[serde(default)]
    pub ai_routing: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            ai_routing: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Number of user/assistant exchanges kept as context.
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_chat_key_env")]
    pub api_key_env: String,
}

impl ChatConfig {
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: default_chat_api_url(),
            model: default_chat_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_history_turns: default_max_history_turns(),
            system_prompt: default_system_prompt(),
            api_key: None,
            api_key_env: default_chat_key_env(),
        }
    }
}

fn default_chat_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_max_history_turns() -> usize {
    10
}

fn default_system_prompt() -> String {
    "You are a helpful AI assistant integrated into a personal automation tool. \
     Provide concise, accurate responses. If asked to perform a task that requires \
     web automation (like opening websites or searching), explain that you'll pass \
     the command to the automation system."
        .to_string()
}

fn default_chat_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_weather_key_env")]
    pub api_key_env: String,
}

impl WeatherConfig {
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: default_weather_api_url(),
            units: Units::default(),
            api_key: None,
            api_key_env: default_weather_key_env(),
        }
    }
}

fn default_weather_api_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_weather_key_env() -> String {
    "WEATHER_API_KEY".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_api_url")]
    pub api_url: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_news_key_env")]
    pub api_key_env: String,
}

impl NewsConfig {
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: default_news_api_url(),
            country: default_country(),
            max_articles: default_max_articles(),
            api_key: None,
            api_key_env: default_news_key_env(),
        }
    }
}

fn default_news_api_url() -> String {
    "https://newsapi.org/v2/top-headlines".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_max_articles() -> usize {
    5
}

fn default_news_key_env() -> String {
    "NEWS_API_KEY".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_notes_path")]
    pub path: PathBuf,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            path: default_notes_path(),
        }
    }
}

fn default_notes_path() -> PathBuf {
    PathBuf::from("notes.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_browser_enabled")]
    pub enabled: bool,
    /// Program used to open URLs, e.g. `firefox --new-tab`. Defaults to the
    /// platform opener.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: default_browser_enabled(),
            command: None,
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

fn default_browser_enabled() -> bool {
    true
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from(".")
}
