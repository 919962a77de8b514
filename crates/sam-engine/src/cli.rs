use crate::dispatcher::{Dispatcher, Outcome, Reply};
use std::error::Error;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

pub enum FileErrorMode {
    Plain,
    WithLine,
}

pub struct FileOptions {
    pub stop_on_error: bool,
    pub error_mode: FileErrorMode,
}

pub struct ReplOptions<'a> {
    pub banner_lines: &'a [&'a str],
    pub prompt: &'a str,
    /// Prefix for assistant replies, e.g. `"Sam.AI: "`.
    pub reply_prefix: &'a str,
    pub handle_ctrl_c: bool,
    pub ctrl_c_message: Option<&'a str>,
    /// Wipe the terminal when the conversation is cleared.
    pub clear_screen: bool,
}

fn show_reply(output: OutputHandlers, prefix: &str, reply: &Reply) {
    let text = format!("{}{}", prefix, reply.text);
    if reply.success {
        (output.out)(&text);
    } else {
        (output.err)(&text);
    }
}

/// Feed every non-empty, non-`#` line of a script through the dispatcher.
/// Stops early on an exit command.
pub async fn run_file(
    dispatcher: &mut Dispatcher,
    output: OutputHandlers,
    path: &str,
    options: FileOptions,
) -> Result<(), Box<dyn Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let reply = dispatcher.handle(trimmed).await;
        if reply.success {
            (output.out)(&reply.text);
        } else {
            match options.error_mode {
                FileErrorMode::Plain => (output.err)(&format!("Error: {}", reply.text)),
                FileErrorMode::WithLine => {
                    (output.err)(&format!("Error executing line '{}': {}", trimmed, reply.text))
                }
            }
            if options.stop_on_error {
                return Err(io::Error::other(reply.text).into());
            }
        }

        if reply.outcome == Outcome::Exit {
            break;
        }
    }
    Ok(())
}

/// Possible outcomes from reading a single REPL line.
enum ReadLineResult {
    /// A non-empty input line to process.
    Input(String),
    /// Empty line -- skip and re-prompt.
    Skip,
    /// EOF or Ctrl-C -- terminate the loop.
    Exit,
    /// I/O error while reading.
    Error(io::Error),
}

async fn read_line(
    reader: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
    handle_ctrl_c: bool,
    ctrl_c_message: Option<&str>,
    output: OutputHandlers,
) -> ReadLineResult {
    if handle_ctrl_c {
        tokio::select! {
            line = reader.next_line() => classify_line(line),
            _ = tokio::signal::ctrl_c() => {
                if let Some(message) = ctrl_c_message {
                    (output.out)(message);
                }
                ReadLineResult::Exit
            }
        }
    } else {
        classify_line(reader.next_line().await)
    }
}

fn classify_line(result: Result<Option<String>, io::Error>) -> ReadLineResult {
    match result {
        Ok(Some(input)) => {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                ReadLineResult::Skip
            } else {
                ReadLineResult::Input(trimmed.to_string())
            }
        }
        Ok(None) => ReadLineResult::Exit,
        Err(e) => ReadLineResult::Error(e),
    }
}

/// Interactive chat loop. One message is in flight at a time.
pub async fn run_repl(
    dispatcher: &mut Dispatcher,
    output: OutputHandlers,
    options: ReplOptions<'_>,
) -> Result<(), Box<dyn Error>> {
    for line in options.banner_lines {
        (output.out)(line);
    }

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = io::stdout();

    loop {
        print!("{}", options.prompt);
        stdout.flush()?;

        match read_line(
            &mut reader,
            options.handle_ctrl_c,
            options.ctrl_c_message,
            output,
        )
        .await
        {
            ReadLineResult::Input(line) => {
                let reply = dispatcher.handle(&line).await;
                match reply.outcome {
                    Outcome::Exit => {
                        show_reply(output, options.reply_prefix, &reply);
                        break;
                    }
                    Outcome::Clear if options.clear_screen => {
                        print!("\x1B[2J\x1B[H");
                        stdout.flush()?;
                        show_reply(output, options.reply_prefix, &reply);
                    }
                    _ => show_reply(output, options.reply_prefix, &reply),
                }
            }
            ReadLineResult::Skip => continue,
            ReadLineResult::Exit => break,
            ReadLineResult::Error(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert!(matches!(classify_line(Ok(Some("   ".into()))), ReadLineResult::Skip));
        assert!(matches!(classify_line(Ok(None)), ReadLineResult::Exit));
        match classify_line(Ok(Some("  weather in Oslo \n".into()))) {
            ReadLineResult::Input(line) => assert_eq!(line, "weather in Oslo"),
            _ => panic!("expected input"),
        }
    }
}
