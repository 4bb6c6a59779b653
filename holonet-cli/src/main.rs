// holonet-cli/src/main.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

use holonet_core::{
    agent::Conversation,
    config::RuntimeConfig,
    search::SearchClient,
    tools::{starships::StarshipLookup, vehicle_search::VehicleSearch, ToolRegistry},
    TurnOutput,
};

const PIRATE_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. You will talk like a pirate.";
const STAR_WARS_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that helps find information about starships and vehicles in Star Wars.";

const QUIT_COMMAND: &str = "/q";
const CLEAR_COMMAND: &str = "/clear";

#[derive(Parser, Debug)]
#[command(name = "holonet", author, version, about = "Console chat assistant demos", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plain chat with the pirate assistant (no tools)
    Chat,
    /// Chat with the Star Wars assistant, with starship lookup and
    /// vehicle search tools available (default)
    Ask,
}

fn init_logging(verbosity: u8) -> Result<()> {
    let default_level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_registry(
    with_tools: bool,
    config: &RuntimeConfig,
    http_client: &reqwest::Client,
) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    if !with_tools {
        return Ok(registry);
    }

    registry.register(Arc::new(StarshipLookup::new(
        http_client.clone(),
        config.swapi_base_url.clone(),
    )));

    let search_config = config
        .search_config()
        .context("The 'ask' mode needs the search collaborator")?;
    let search_client = SearchClient::new(http_client.clone(), search_config);
    registry.register(Arc::new(VehicleSearch::new(
        http_client.clone(),
        config.clone(),
        search_client,
    )));

    Ok(registry)
}

fn print_turn(output: &TurnOutput) {
    for answer in &output.answers {
        println!("{}", "Assistant:".cyan().bold());
        println!("{}", answer);
    }
    if let Some(usage) = &output.usage {
        println!(
            "{}",
            format!(
                "Usage: number of prompt token is {}, number of completion token is {}, \
                 and number of total tokens in request and response is {}.",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            )
            .dimmed()
        );
    }
    println!();
}

async fn run_repl(mut conversation: Conversation, intro: &str) -> Result<()> {
    println!("{}", intro.cyan());
    println!(
        "{}",
        format!(
            "Enter {} to quit, {} to clear the conversation history.",
            QUIT_COMMAND, CLEAR_COMMAND
        )
        .cyan()
    );

    let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;
    loop {
        let line = match editor.readline(&format!("{} ", "You:".green().bold())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read console input"),
        };
        let line = line.trim();

        if line == QUIT_COMMAND {
            break;
        }
        if line == CLEAR_COMMAND {
            conversation.clear();
            println!("{}", "Cleared history".cyan());
            continue;
        }
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} thinking...")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = conversation.submit(line).await;
        spinner.finish_and_clear();

        let output = result.context("Turn failed")?;
        debug!(
            tool_invocations = output.tool_invocations.len(),
            "Turn completed."
        );
        for invocation in &output.tool_invocations {
            println!(
                "{}",
                format!(
                    "Function name: {}, arguments: {}.",
                    invocation.tool_name, invocation.arguments
                )
                .yellow()
            );
        }
        print_turn(&output);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = RuntimeConfig::from_env()?;
    let http_client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    let (with_tools, system_prompt, intro) = match cli.command {
        Some(Commands::Chat) => (
            false,
            PIRATE_SYSTEM_PROMPT,
            "Enter a question to the pirate assistant.",
        ),
        Some(Commands::Ask) | None => (
            true,
            STAR_WARS_SYSTEM_PROMPT,
            "Enter a question to the star wars assistant.",
        ),
    };

    let registry = build_registry(with_tools, &config, &http_client)?;
    info!(
        with_tools,
        model = %config.model_name,
        "Starting conversation."
    );

    let conversation = Conversation::new(config, Arc::new(registry), http_client, system_prompt);
    run_repl(conversation, intro).await
}
