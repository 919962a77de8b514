use sam_engine::config::schema::Units;
use sam_engine::config::{ConfigError, ConfigLoader, SamConfig};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = SamConfig::default();
    assert!(!config.assistant.ai_routing);
    assert_eq!(config.assistant.request_timeout_secs, 30);
    assert_eq!(config.chat.model, "gpt-4o");
    assert_eq!(config.chat.max_tokens, 1000);
    assert_eq!(config.chat.max_history_turns, 10);
    assert_eq!(config.chat.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.weather.units, Units::Metric);
    assert_eq!(config.weather.api_key_env, "WEATHER_API_KEY");
    assert_eq!(config.news.country, "us");
    assert_eq!(config.news.max_articles, 5);
    assert_eq!(config.news.api_key_env, "NEWS_API_KEY");
    assert_eq!(config.notes.path.to_str(), Some("notes.json"));
    assert!(config.browser.enabled);
}

#[tokio::test]
async fn test_yaml_overrides_merge_with_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "assistant:\n  ai_routing: true\nchat:\n  model: gpt-4o-mini\n  max_history_turns: 4\n  api_key: sk-test\nweather:\n  units: imperial\nbrowser:\n  enabled: false\n  command: firefox --new-tab\n"
    )
    .unwrap();

    let config = ConfigLoader::load_from(file.path()).await.unwrap();
    assert!(config.assistant.ai_routing);
    assert_eq!(config.chat.model, "gpt-4o-mini");
    assert_eq!(config.chat.max_history_turns, 4);
    assert_eq!(config.chat.temperature, 0.7);
    assert_eq!(config.chat.api_key(), Some("sk-test".to_string()));
    assert_eq!(config.weather.units, Units::Imperial);
    assert!(!config.browser.enabled);
    assert_eq!(config.browser.command.as_deref(), Some("firefox --new-tab"));
    assert_eq!(config.news.max_articles, 5);
}

#[tokio::test]
async fn test_key_from_named_env_var() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "news:\n  api_key_env: SAM_CONFIG_TEST_NEWS_KEY").unwrap();
    let config = ConfigLoader::load_from(file.path()).await.unwrap();

    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var("SAM_CONFIG_TEST_NEWS_KEY", "news-key") };
    assert_eq!(config.news.api_key(), Some("news-key".to_string()));
}

#[tokio::test]
async fn test_empty_file_gives_defaults() {
    let file = NamedTempFile::new().unwrap();
    let config = ConfigLoader::load_from(file.path()).await.unwrap();
    assert_eq!(config.chat.model, "gpt-4o");
}

#[tokio::test]
async fn test_errors() {
    let missing = ConfigLoader::load_from(std::path::Path::new("/definitely/not/here/sam.yaml")).await;
    assert!(matches!(missing, Err(ConfigError::Io(_))));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "chat:\n  max_tokens: lots").unwrap();
    let bad = ConfigLoader::load_from(file.path()).await;
    assert!(matches!(bad, Err(ConfigError::Parse(_))));
}
