//! Command-line client that uploads a document to a running plagscan server.
//!
//! Prints the JSON report on success. Error responses are printed to stderr and the process
//! exits with status 1.
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "plagscan-submit",
    about = "Upload a PDF or DOCX to a plagscan server and print the report"
)]
struct Cli {
    /// Document to check.
    file: PathBuf,
    /// Base URL of the plagscan server.
    #[arg(long, default_value = "http://127.0.0.1:4100")]
    url: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let bytes = tokio::fs::read(&cli.file)
        .await
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let filename = cli
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .context("file path has no usable file name")?
        .to_string();

    let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
    let endpoint = format!("{}/check_plagiarism/", cli.url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&endpoint)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("failed to reach {endpoint}"))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .context("server returned a non-JSON response")?;

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        bail!("server returned {status}: {message}");
    }

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
