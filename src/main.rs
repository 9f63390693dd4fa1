use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use web_summarizer::config::{AgentRuntimeConfig, Config, LoggingConfig};
use web_summarizer::tools::WebsiteContentTool;
use web_summarizer::{
    JokerAgent, LlmProvider, Progress, TextAgent, ToolRegistry, WeatherAgent,
    WebsiteSummarizerWorkflow,
};

const SEPARATOR_WIDTH: usize = 60;

const DEFAULT_URL: &str = "https://google.com";
const DEFAULT_JOKE_PROMPT: &str = "Tell me a joke about a pirate";
const DEFAULT_WEATHER_PROMPTS: [&str; 3] = [
    "What's the weather like in Seattle?",
    "Can you tell me the weather in New York?",
    "How's the weather in Tokyo today?",
];

/// Web Summarizer - chain LLM agents to fetch a website and summarize it
#[derive(Parser, Debug)]
#[command(name = "web-summarizer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.config/web-summarizer/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Azure AI endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Chat deployment name
    #[arg(long, global = true)]
    deployment: Option<String>,

    /// Only print results, not progress
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch websites and summarize them with a two-agent workflow
    Summarize {
        #[arg(default_value = DEFAULT_URL)]
        urls: Vec<String>,
    },
    /// Ask the joker agent for a joke
    Joke {
        #[arg(default_value = DEFAULT_JOKE_PROMPT)]
        prompt: String,
    },
    /// Ask the weather agent questions that trigger its tool
    Weather { prompts: Vec<String> },
    /// Fetch a website's extracted text without calling the LLM
    Fetch { url: String },
}

fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

fn banner(title: &str) {
    println!("{}", separator());
    println!("{}", title);
    println!("{}", separator());
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let log_file = std::fs::File::create(&logging.file)
        .with_context(|| format!("Failed to create log file {}", logging.file.display()))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(log_file).with_ansi(false))
        .init();
    Ok(())
}

fn print_progress(progress: Progress) {
    match progress {
        Progress::Started { url } => println!("🌐 URL: {}\n", url),
        Progress::FetchingContent => {
            println!("📥 Step 1: Get Content Agent - Fetching website content...")
        },
        Progress::ContentRetrieved { chars, preview } => {
            println!("✓ Content retrieved successfully ({} characters)", chars);
            println!("   Preview: {}\n", preview);
        },
        Progress::Summarizing => {
            println!("📝 Step 2: Summarize Content Agent - Creating summary...")
        },
        Progress::SummaryReady => println!("✓ Summary generated\n"),
    }
}

async fn summarize(config: &Config, urls: &[String], verbose: bool) -> Result<()> {
    let provider = Arc::new(LlmProvider::connect(config.llm.clone()).await?);
    let workflow = WebsiteSummarizerWorkflow::from_config(provider, config);

    banner("Website Summarizer - Multi-Agent Workflow Demo");
    println!();

    for url in urls {
        let result = if verbose {
            workflow.run_with_progress(url, print_progress).await
        } else {
            workflow.run(url).await
        };

        match result {
            Ok(summary) => {
                println!("📋 Summary:");
                println!("{}", summary);
                println!();
            },
            Err(e) => {
                tracing::error!("Workflow failed for {}: {:#}", url, e);
                println!("❌ Error processing {}: {:#}", url, e);
            },
        }
        println!("{}", separator());
        println!();
    }
    Ok(())
}

async fn joke(config: &Config, prompt: &str) -> Result<()> {
    let provider = Arc::new(LlmProvider::connect(config.llm.clone()).await?);
    let agent = JokerAgent::new(provider, AgentRuntimeConfig::from_config(config));
    println!("{}", agent.run(prompt).await?);
    Ok(())
}

async fn weather(config: &Config, prompts: Vec<String>) -> Result<()> {
    let provider = Arc::new(LlmProvider::connect(config.llm.clone()).await?);
    let agent = WeatherAgent::new(provider, AgentRuntimeConfig::from_config(config));

    let prompts = if prompts.is_empty() {
        DEFAULT_WEATHER_PROMPTS.iter().map(|p| p.to_string()).collect()
    } else {
        prompts
    };

    banner("Weather Agent with Function Calling Demo");
    for prompt in prompts {
        println!("\n🔵 User: {}", prompt);
        println!("🤖 Agent: {}", agent.run(&prompt).await?);
    }
    println!("\n{}", separator());
    Ok(())
}

async fn fetch(config: &Config, url: &str) -> Result<()> {
    let tools = ToolRegistry::website_content(config.fetch.clone());
    let content = tools
        .execute(WebsiteContentTool::NAME, json!({ "url": url }))
        .await;
    println!("{}", content);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files (local first, then home directory)
    // Errors are ignored - files are optional
    let _ = dotenvy::from_filename(".env");
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".env"));
    }

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();

    // Apply CLI overrides
    if let Some(endpoint) = args.endpoint {
        config.llm.endpoint = endpoint;
    }
    if let Some(deployment) = args.deployment {
        config.llm.deployment = deployment;
    }
    let verbose = config.workflow.verbose && !args.quiet;

    init_logging(&config.logging)?;
    info!(
        "Starting with endpoint {} deployment {}",
        config.llm.endpoint, config.llm.deployment
    );

    match args.command {
        Command::Summarize { urls } => summarize(&config, &urls, verbose).await,
        Command::Joke { prompt } => joke(&config, &prompt).await,
        Command::Weather { prompts } => weather(&config, prompts).await,
        Command::Fetch { url } => fetch(&config, &url).await,
    }
}
