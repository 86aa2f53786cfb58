//! One-shot security review of a single source file or zip archive.

mod render;
mod source;
mod validate;

use anyhow::Context;
use clap::Parser;
use scan_llm::{CompletionClient, OpenAiCompletionClient, PromptTemplate};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Review a source file for security vulnerabilities and print the findings table.
#[derive(Parser, Debug)]
#[command(name = "scan-cli", version)]
#[command(after_help = "Supported file types: .zip,.js,.jsx,.ts,.tsx,.py,.java,.cpp,.c,.cs,.go,.rb,.php\n\
Credentials: LLM_API_KEY or OPENAI_API_KEY (a .env file is read if present).")]
struct Args {
    /// Print the raw HTML table instead of plain text.
    #[arg(long)]
    html: bool,

    /// File to analyze.
    file: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenv::dotenv();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<String> {
    let ext = validate::validate_extension(&args.file)?;
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("error reading file {}", args.file.display()))?;
    let client = OpenAiCompletionClient::from_env()
        .context("LLM_API_KEY (or OPENAI_API_KEY) is not set")?;
    tracing::debug!(model = client.model(), file = %args.file.display(), "starting analysis");
    analyze(&client, &ext, bytes, args.html).await
}

/// Single synchronous review: no deadline, no retries.
async fn analyze(
    client: &dyn CompletionClient,
    ext: &str,
    bytes: Vec<u8>,
    html: bool,
) -> anyhow::Result<String> {
    let code = source::extract_source(ext, bytes)?;
    let messages = PromptTemplate::cli().render(&code);
    let report = client
        .complete_with_messages(&messages)
        .await
        .context("analysis failed")?;
    Ok(if html {
        report
    } else {
        render::html_to_text(&report)
    })
}
