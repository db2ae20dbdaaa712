//! # Developer Tools Research Agent (CLI)
//!
//! ```bash
//! cargo run -- "vector databases"
//! cargo run -- --json "headless CMS"
//! cargo run            # interactive mode
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use devtools_research_agent::{report, Config, RunState, Workflow};

#[derive(Parser, Debug)]
#[command(
    name = "devtools-research-agent",
    version,
    about = "Researches developer tools for a query and recommends the best fit",
    long_about = r#"
Developer Tools Research Agent

For a query such as "vector databases" the agent:
  1. Finds comparison articles and extracts candidate tools
  2. Researches up to 4 candidates on their official sites
  3. Summarizes a short recommendation

Requires OPENAI_API_KEY and FIRECRAWL_API_KEY (environment or .env file).

EXAMPLES:
  devtools-research-agent "vector databases"
  devtools-research-agent --json "feature flag services"
  devtools-research-agent            # interactive mode
"#
)]
struct Args {
    /// Query to research. Omit for interactive mode.
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    /// OpenAI model to use (overrides MODEL env var)
    #[arg(short = 'm', long = "model", env = "MODEL")]
    model: Option<String>,

    /// Print the full run state as JSON instead of a report
    #[arg(long = "json", default_value = "false")]
    json: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    let mut config = Config::from_env()?;
    if let Some(model) = args.model {
        info!(model = %model, "Using model from command line");
        config.model = model;
    }
    config.validate()?;

    info!(
        model = %config.model,
        firecrawl = %config.firecrawl_api_url,
        max_tools = config.max_tools,
        "Configuration loaded"
    );

    let workflow = Workflow::from_config(&config).context("Failed to build research workflow")?;

    match args.query {
        Some(query) => {
            let state = workflow.run(&query).await.map_err(|e| {
                error!(error = %e, "Research failed");
                e
            })?;
            print_state(&state, args.json)?;
        }
        None => interactive(&workflow, args.json).await?,
    }

    Ok(())
}

/// Read queries from stdin until `quit`, `exit` or EOF.
async fn interactive(workflow: &Workflow, json: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Developer Tools Research Agent (type 'quit' to exit)");

    loop {
        stdout.write_all(b"\nDeveloper tools query: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();

        if query.is_empty() {
            continue;
        }
        if is_exit_command(query) {
            break;
        }

        match workflow.run(query).await {
            Ok(state) => print_state(&state, json)?,
            Err(e) => {
                error!(error = %e, "Research failed");
                eprintln!("\nResearch failed: {}", e);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "quit" | "exit")
}

fn print_state(state: &RunState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else {
        println!("\n{}", report::render(state));
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only results. `RUST_LOG` wins over
/// `--verbose` when set.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
