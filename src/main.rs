// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Validate the configuration (depth, root) - bad config aborts with
//    exit code 2 before any traversal starts
// 3. Build the fetcher, the diagnostics sink and the counting engine
// 4. Run one traversal and print the total (text or JSON)
//
// Exit codes:
//   0 = traversal completed (individual broken pages just count as zero)
//   2 = configuration or startup error
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod count; // src/count/ - the traversal engine and visited set
mod diag; // src/diag.rs - diagnostics sink
mod fetch; // src/fetch/ - page fetching (http, https, file)
mod inspect; // src/inspect/ - image and link extraction

use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use count::ImageCounter;
use diag::Diagnostics;
use fetch::WebFetcher;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::{bail, Result};
use serde::Serialize;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Configuration/startup failure: report it and exit with code 2
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();

    // Configuration errors are the only failures that may abort the run
    if cli.max_depth == 0 {
        bail!("--max-depth must be at least 1");
    }

    // Turn the root argument (URL or local path/folder) into an absolute
    // resource identifier
    let root = fetch::normalize_root(&cli.root)?;

    println!("🔍 Counting images reachable from: {root}");
    println!("📊 Max depth: {}", cli.max_depth);

    let diagnostics = if cli.diagnostics {
        Diagnostics::stdout()
    } else {
        Diagnostics::disabled()
    };

    let fetcher = WebFetcher::new()?;
    let engine = ImageCounter::new(fetcher, cli.max_depth, diagnostics);

    // Run the traversal. This never fails: pages that cannot be fetched or
    // parsed simply contribute zero.
    let total_images = engine.count(&root).await;

    let summary = CountSummary {
        root,
        max_depth: cli.max_depth,
        total_images,
    };
    print_summary(&summary, cli.json)?;

    Ok(0)
}

// What one completed run reports
//
// #[derive(Serialize)] lets serde_json turn this into JSON for --json
#[derive(Debug, Serialize)]
struct CountSummary {
    /// The normalized root identifier the traversal started from
    root: String,
    /// The configured depth limit
    max_depth: usize,
    /// Total images found across every page visited
    total_images: usize,
}

// Prints the summary either as human-readable text or JSON
fn print_summary(summary: &CountSummary, json: bool) -> Result<()> {
    if json {
        // Serialize the summary to JSON and print
        let json_output = serde_json::to_string_pretty(summary)?;
        println!("{json_output}");
    } else {
        println!();
        println!(
            "🖼️  {} total image(s) are reachable from {}",
            summary.total_images, summary.root
        );
    }
    Ok(())
}
