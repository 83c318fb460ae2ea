use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener::config::Config;
use screener::llm_client::LlmClient;
use screener::qa;
use screener::sheets::auth::AuthProvider;
use screener::sheets::SheetsClient;

/// Interactive Q&A agent over a Google Sheets worksheet.
///
/// The agent asks for a sheet ID or URL and an optional worksheet name
/// (empty = first sheet), prints a summary of the data, then answers
/// free-text questions about it. Commands inside the loop:
/// `summary` re-prints the data summary, `refresh` re-fetches from the
/// sheet, `quit`/`exit`/`q` leaves.
#[derive(Debug, Parser)]
#[command(name = "sheets-agent", version)]
struct Args {}

#[tokio::main]
async fn main() -> Result<()> {
    let _args = Args::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("Google Sheets Q&A Agent");
    println!("{:=<60}", "");

    let http = reqwest::Client::new();
    let auth = AuthProvider::from_files(
        http.clone(),
        Path::new(&config.google_credentials_file),
        Path::new(&config.google_token_file),
    )
    .context(
        "Could not load Google credentials. Create a Google Cloud project, enable the \
         Sheets API, and save a service account key or OAuth client file as credentials.json",
    )?;
    let mut sheets = SheetsClient::new(http, auth);
    let llm = LlmClient::new(config.anthropic_api_key.clone());

    let sheet_input = prompt_line("Sheet ID or URL: ")?;
    if sheet_input.is_empty() {
        bail!("No sheet ID/URL provided");
    }
    let worksheet_input = prompt_line("Worksheet name (press Enter for first sheet): ")?;
    let worksheet = if worksheet_input.is_empty() {
        None
    } else {
        Some(worksheet_input.as_str())
    };

    let mut dataset = sheets.fetch(&sheet_input, worksheet, true).await?;

    println!("\nDATA SUMMARY");
    println!("{:=<60}", "");
    println!("{}", dataset.summary());

    println!("\nAsk questions about the data (type 'quit' to exit)");
    println!("{:=<60}", "");

    loop {
        let line = prompt_line("\nYour question: ")?;
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "summary" => {
                println!("\n{}", dataset.summary());
            }
            "refresh" => {
                info!("Refreshing data...");
                match sheets.fetch(&sheet_input, worksheet, false).await {
                    Ok(refreshed) => {
                        dataset = refreshed;
                        println!("Data refreshed");
                    }
                    Err(e) => eprintln!("Refresh failed: {e}"),
                }
            }
            _ => match qa::answer_question(&llm, &dataset, &line).await {
                Ok(answer) => println!("\nAnswer:\n{answer}"),
                Err(e) => eprintln!("Could not get an answer: {e}"),
            },
        }
    }

    Ok(())
}

/// Prints a prompt and reads one trimmed line from stdin.
fn prompt_line(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}
