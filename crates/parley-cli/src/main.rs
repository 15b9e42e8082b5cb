//! parley CLI: terminal chat with a streaming assistant

use clap::{Parser, Subcommand};
use parley_engine::{
    Config, Conversation, ConversationEvent, ConversationOptions, MessageStatus, ResponseMode,
    SimulatedResponder, DEFAULT_CONFIG_PATH,
};
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Terminal chat with a streaming assistant
#[derive(Parser)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Tui,

    /// Send one prompt and print the response
    Ask {
        /// The prompt to send
        prompt: String,

        /// Wait for the whole response instead of streaming fragments
        #[arg(long)]
        no_stream: bool,
    },

    /// Print the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let config = load_config(&cli.config);
            // The TUI owns the terminal, so logs go to a file
            let _guard = init_file_logging(cli.verbose, &config.log_dir);
            cmd_tui(&config);
        }
        Commands::Ask { prompt, no_stream } => {
            init_stderr_logging(cli.verbose);
            let config = load_config(&cli.config);
            cmd_ask(&config, &prompt, no_stream);
        }
        Commands::Config { json } => {
            init_stderr_logging(cli.verbose);
            let config = load_config(&cli.config);
            cmd_config(&config, &cli.config, json);
        }
        Commands::Init => {
            init_stderr_logging(cli.verbose);
            cmd_init(&cli.config);
        }
    }
}

fn load_config(path: &Path) -> Config {
    match Config::load_or_default(path) {
        Ok(config) => config,
        Err(e) => fail(format!("failed to load {}: {e}", path.display())),
    }
}

/// Print an error and exit with status 1.
fn fail(message: impl Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn env_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn init_stderr_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn init_file_logging(verbose: u8, log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: logging disabled, cannot create {}: {e}", log_dir.display());
        return None;
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "parley.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    Some(guard)
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(format!("failed to create tokio runtime: {e}")),
    }
}

fn cmd_tui(config: &Config) {
    let responder = Arc::new(SimulatedResponder::new(&config.responder));
    let rt = runtime();
    if let Err(e) = rt.block_on(parley_tui::run_tui(config, responder)) {
        fail(e);
    }
}

fn cmd_ask(config: &Config, prompt: &str, no_stream: bool) {
    let rt = runtime();
    if let Err(e) = rt.block_on(ask(config, prompt, no_stream)) {
        fail(e);
    }
}

async fn ask(config: &Config, prompt: &str, no_stream: bool) -> Result<(), String> {
    let responder = Arc::new(SimulatedResponder::new(&config.responder));
    let mut options = ConversationOptions::from(config);
    if no_stream {
        options.mode = ResponseMode::Complete;
    }

    let mut conversation = Conversation::new(responder, options);
    let message_id = conversation.submit(prompt).map_err(|e| e.to_string())?;
    info!(%message_id, mode = ?options.mode, "asking");

    let mut stdout = std::io::stdout();
    while conversation.is_busy() {
        match conversation.next_event().await {
            Some(ConversationEvent::Chunk { chunk, .. }) => {
                debug!(index = chunk.index, "fragment");
                print!("{}", chunk.text);
                let _ = stdout.flush();
            }
            Some(_) => {}
            None => break,
        }
    }

    let message = conversation
        .message(message_id)
        .ok_or_else(|| "response was lost".to_string())?;
    match &message.status {
        MessageStatus::Done => {
            if options.mode == ResponseMode::Complete {
                print!("{}", message.content);
            }
            println!();
            Ok(())
        }
        MessageStatus::Failed { reason } => {
            if !message.content.is_empty() {
                println!();
            }
            Err(format!("response failed: {reason}"))
        }
        MessageStatus::Cancelled => Err("response was cancelled".to_string()),
        MessageStatus::Streaming => Err("response did not finish".to_string()),
    }
}

fn cmd_config(config: &Config, path: &Path, json: bool) {
    if json {
        match serde_json::to_string_pretty(config) {
            Ok(text) => println!("{text}"),
            Err(e) => fail(format!("failed to serialize config: {e}")),
        }
        return;
    }

    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };

    println!("Configuration: {source}\n");
    println!("  responder.mode                 {:?}", config.responder.mode);
    println!(
        "  responder.chunk_delay_ms       {}",
        config.responder.chunk_delay_ms
    );
    println!(
        "  responder.completion_delay_ms  {}",
        config.responder.completion_delay_ms
    );
    println!("  busy_policy                    {:?}", config.busy_policy);
    println!("  ui.tick_rate_ms                {}", config.ui.tick_rate_ms);
    println!("  ui.theme                       {:?}", config.ui.theme);
    println!("  log_dir                        {}", config.log_dir.display());
}

fn cmd_init(path: &Path) {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return;
    }

    match Config::default().save(path) {
        Ok(()) => {
            info!(path = %path.display(), "wrote default config");
            println!("Created {}", path.display());
        }
        Err(e) => fail(format!("failed to write config: {e}")),
    }
}
