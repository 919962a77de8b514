use crate::notes::Note;
use crate::services::{Headline, WeatherReport};

pub const ASSISTANT_NAME: &str = "Sam.AI";

pub const BANNER: &[&str] = &[
    "Sam.AI personal assistant",
    "Type 'help' to see what I can do, 'exit' to quit.",
];

pub fn help_text() -> String {
    format!(
        "{name} Commands:

Web:
• open website [url] - Open a website (also: go to, visit)
• search youtube for [query] - Search YouTube
• search google for [query] - Search Google
• search amazon for [query] - Search Amazon
• search github for [query] - Search GitHub
• search stack overflow for [query] - Search Stack Overflow

Page:
• scroll up/down [times] - Scroll the current page
• click [text] - Click an element by its text
• extract text - Read the text of the current page
• take a screenshot - Save a screenshot of the current page

Information:
• weather in [city] - Get current weather
• news - Get the latest headlines

Notes:
• save note [text] - Save a note
• show my notes - List saved notes

System:
• help - Show this help message
• clear - Clear the conversation history
• exit - Close the assistant

Anything else is answered by the AI model.",
        name = ASSISTANT_NAME
    )
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn format_weather(report: &WeatherReport) -> String {
    let temp = report.units.temperature_symbol();
    format!(
        "Weather in {city}:\n\
         • Condition: {condition}\n\
         • Temperature: {t}{temp} (feels like {fl}{temp})\n\
         • Humidity: {h}%\n\
         • Wind Speed: {w} {speed}",
        city = report.city,
        condition = capitalize(&report.description),
        t = report.temperature,
        fl = report.feels_like,
        h = report.humidity,
        w = report.wind_speed,
        speed = report.units.speed_symbol(),
    )
}

pub fn format_headlines(headlines: &[Headline]) -> String {
    if headlines.is_empty() {
        return "No news articles found.".to_string();
    }
    let mut output = String::from("Latest News Headlines:\n\n");
    for (i, headline) in headlines.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}\n   Source: {}\n\n",
            i + 1,
            headline.title,
            headline.source
        ));
    }
    output.trim_end().to_string()
}

pub fn format_notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "You don't have any saved notes yet.".to_string();
    }
    let mut output = String::from("Your Notes:\n\n");
    for (i, note) in notes.iter().enumerate() {
        output.push_str(&format!("{}. [{}] {}\n\n", i + 1, note.timestamp, note.content));
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Units;

    #[test]
    fn test_weather_report_layout() {
        let report = WeatherReport {
            city: "Tokyo".to_string(),
            description: "scattered clouds".to_string(),
            temperature: 21.5,
            feels_like: 20.0,
            humidity: 60.0,
            wind_speed: 3.2,
            units: Units::Metric,
        };
        assert_eq!(
            format_weather(&report),
            "Weather in Tokyo:\n• Condition: Scattered clouds\n• Temperature: 21.5°C (feels like 20°C)\n• Humidity: 60%\n• Wind Speed: 3.2 m/s"
        );
    }

    #[test]
    fn test_imperial_units() {
        let report = WeatherReport {
            city: "Austin".to_string(),
            description: "clear sky".to_string(),
            temperature: 90.0,
            feels_like: 95.0,
            humidity: 40.0,
            wind_speed: 5.0,
            units: Units::Imperial,
        };
        let text = format_weather(&report);
        assert!(text.contains("90°F (feels like 95°F)"));
        assert!(text.ends_with("5 mph"));
    }

    #[test]
    fn test_headlines_numbered_with_sources() {
        let headlines = vec![
            Headline {
                title: "Rust 2.0 announced".to_string(),
                source: "The Register".to_string(),
            },
            Headline {
                title: "Crabs everywhere".to_string(),
                source: "BBC".to_string(),
            },
        ];
        assert_eq!(
            format_headlines(&headlines),
            "Latest News Headlines:\n\n1. Rust 2.0 announced\n   Source: The Register\n\n2. Crabs everywhere\n   Source: BBC"
        );
        assert_eq!(format_headlines(&[]), "No news articles found.");
    }

    #[test]
    fn test_notes_listing() {
        let notes = vec![Note {
            timestamp: "2024-05-01 09:30:00".to_string(),
            content: "buy milk".to_string(),
        }];
        assert_eq!(format_notes(&notes), "Your Notes:\n\n1. [2024-05-01 09:30:00] buy milk");
        assert_eq!(format_notes(&[]), "You don't have any saved notes yet.");
    }

    #[test]
    fn test_help_mentions_every_command_group() {
        let help = help_text();
        for needle in ["open website", "youtube", "weather", "news", "save note", "show my notes", "clear", "exit"] {
            assert!(help.contains(needle), "help is missing {needle}");
        }
    }
}
