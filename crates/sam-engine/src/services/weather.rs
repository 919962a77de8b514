use crate::config::schema::{Units, WeatherConfig};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "Weather API key not configured. Please add it to the config file or set the {0} environment variable."
    )]
    MissingApiKey(String),
    #[error("Error getting weather: {0}")]
    Api(String),
    #[error("Error getting weather information: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Error getting weather information: unexpected response ({0})")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub units: Units,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherReport, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: MainReadings,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

/// Turn an OpenWeatherMap body into a report. `ok` is whether the HTTP
/// status was a success; error bodies carry a `message` field.
pub fn parse_current(
    city: &str,
    units: Units,
    ok: bool,
    body: serde_json::Value,
) -> Result<WeatherReport, WeatherError> {
    if !ok {
        return Err(WeatherError::Api(super::error_message(&body)));
    }
    let current: CurrentWeather = serde_json::from_value(body)?;
    let description = current
        .weather
        .into_iter()
        .next()
        .map(|c| c.description)
        .unwrap_or_default();
    Ok(WeatherReport {
        city: city.to_string(),
        description,
        temperature: current.main.temp,
        feels_like: current.main.feels_like,
        humidity: current.main.humidity,
        wind_speed: current.wind.speed,
        units,
    })
}

pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    api_key_env: String,
    units: Units,
}

impl OpenWeatherClient {
    pub fn new(http: reqwest::Client, config: &WeatherConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key(),
            api_key_env: config.api_key_env.clone(),
            units: config.units,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| WeatherError::MissingApiKey(self.api_key_env.clone()))?;

        info!(city, "fetching current weather");
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("q", city),
                ("appid", api_key),
                ("units", self.units.as_str()),
            ])
            .send()
            .await?;

        let ok = response.status().is_success();
        let body: serde_json::Value = response.json().await?;
        parse_current(city, self.units, ok, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_success_body() {
        let body = json!({
            "weather": [{"description": "light rain", "main": "Rain"}],
            "main": {"temp": 12.5, "feels_like": 11.0, "humidity": 81},
            "wind": {"speed": 4.6},
            "name": "Tokyo"
        });
        let report = parse_current("Tokyo", Units::Metric, true, body).unwrap();
        assert_eq!(report.city, "Tokyo");
        assert_eq!(report.description, "light rain");
        assert_eq!(report.humidity, 81.0);
        assert_eq!(report.wind_speed, 4.6);
    }

    #[test]
    fn test_parse_error_body_uses_api_message() {
        let body = json!({"cod": "404", "message": "city not found"});
        let err = parse_current("Atlantis", Units::Metric, false, body).unwrap_err();
        assert_eq!(err.to_string(), "Error getting weather: city not found");
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_current("Tokyo", Units::Metric, true, json!({"weather": []})).unwrap_err();
        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let config = WeatherConfig {
            api_key_env: "SAM_TEST_WEATHER_KEY_UNSET".to_string(),
            ..WeatherConfig::default()
        };
        let client = OpenWeatherClient::new(reqwest::Client::new(), &config);
        let err = client.current("Tokyo").await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey(_)));
        assert!(err.to_string().starts_with("Weather API key not configured."));
    }
}
