// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// There is deliberately no global options singleton anywhere in this
// program: the parsed Cli value is turned into plain values in main.rs and
// handed to the engine explicitly. That keeps independent traversals (and
// the tests) from stepping on each other.
// =============================================================================

use clap::Parser;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "image-census",
    version = "0.1.0",
    about = "Counts all images reachable from a web page or local folder",
    long_about = "image-census starts at a root page (a URL or a local file/folder), counts the \
                  images on it, then follows its hyperlinks and keeps counting, down to a \
                  configurable depth. Each page is visited at most once, and a page that fails \
                  to load simply counts as zero instead of aborting the run."
)]
pub struct Cli {
    /// Root to start counting from: a URL (https://example.com) or a local
    /// path. A folder is treated as its index.html.
    ///
    /// This is a positional argument (required, no flag needed)
    pub root: String,

    /// Maximum traversal depth (default: 2)
    ///
    /// The root page is depth 1, the pages it links to are depth 2, etc.
    /// Depth 1 = count only the root page's images, links are not followed.
    ///
    /// #[arg(long, default_value_t = 2)] creates --max-depth flag with default value
    #[arg(long, default_value_t = 2)]
    pub max_depth: usize,

    /// Print per-page diagnostics while counting
    ///
    /// Shows depth-limit hits, already-visited skips, per-page image counts
    /// and per-page failures. Off by default.
    #[arg(long)]
    pub diagnostics: bool,

    /// Output the result summary in JSON format instead of plain text
    ///
    /// This is an optional flag: --json
    #[arg(long)]
    pub json: bool,
}
