pub mod news;
pub mod weather;

pub use news::{Headline, NewsApiClient, NewsError, NewsProvider};
pub use weather::{OpenWeatherClient, WeatherError, WeatherProvider, WeatherReport};

use std::time::Duration;

/// One client shared by every outbound integration.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("sam/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Pull a human-readable message out of an API error body.
pub(crate) fn error_message(body: &serde_json::Value) -> String {
    body.get("message")
        .or_else(|| body.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
        .to_string()
}
