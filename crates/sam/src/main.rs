use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use sam_engine::cli::{self, FileErrorMode, FileOptions, OutputHandlers, ReplOptions};
use sam_engine::config::ConfigLoader;
use sam_engine::dispatcher::Dispatcher;
use sam_engine::formatter::{ASSISTANT_NAME, BANNER};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sam", version, about = "Sam.AI personal assistant")]
struct Args {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Config file (defaults to ./sam.yaml, then ~/.sam/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Script to execute, one message per line (non-interactive mode)
    #[arg(long)]
    file: Option<String>,

    /// Keep running a script after a failed line
    #[arg(long, requires = "file")]
    keep_going: bool,

    /// Never launch a browser; describe web actions instead
    #[arg(long)]
    no_browser: bool,

    /// More log output on stderr (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Mode {
    /// Interactive chat session (default)
    Chat,
    /// Print how a message would be classified, as JSON
    Classify {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries the conversation; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(Mode::Classify { text }) = &args.mode {
        let command = sam_common::classify(&text.join(" "));
        println!("{}", serde_json::to_string_pretty(&command)?);
        return Ok(());
    }

    let mut config = ConfigLoader::load(args.config.as_deref())
        .await
        .context("failed to load configuration")?;
    if args.no_browser {
        config.browser.enabled = false;
    }
    debug!(
        ai_routing = config.assistant.ai_routing,
        browser = config.browser.enabled,
        "configuration loaded"
    );

    let mut dispatcher =
        Dispatcher::from_config(&config).context("failed to set up the assistant")?;

    let output = OutputHandlers {
        out: |msg| println!("{}", msg),
        err: |msg| println!("{}", msg),
    };

    if let Some(file_path) = args.file {
        info!(file = %file_path, "running script");
        let options = FileOptions {
            stop_on_error: !args.keep_going,
            error_mode: FileErrorMode::WithLine,
        };
        cli::run_file(&mut dispatcher, output, &file_path, options)
            .await
            .map_err(|e| anyhow!("Error executing file {}: {}", file_path, e))?;
    } else {
        let reply_prefix = format!("{}: ", ASSISTANT_NAME);
        let repl_options = ReplOptions {
            banner_lines: BANNER,
            prompt: "You: ",
            reply_prefix: &reply_prefix,
            handle_ctrl_c: true,
            ctrl_c_message: Some("\nGoodbye!"),
            clear_screen: true,
        };
        cli::run_repl(&mut dispatcher, output, repl_options)
            .await
            .map_err(|e| anyhow!("Error during session: {}", e))?;
    }

    Ok(())
}
