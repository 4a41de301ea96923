//! CLI module - Command-line interface for Shelfmark
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Shelfmark - Article bookmarks with AI summaries and book recommendations
#[derive(Parser)]
#[command(name = "shelfmark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server (default)
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// List saved articles, newest first
    #[command(alias = "ls", alias = "l")]
    List,

    /// Search saved articles by keyword
    #[command(alias = "s")]
    Search {
        /// Keywords; every one must appear in the title or summary
        keyword: Vec<String>,
    },

    /// Show book recommendations for the saved articles
    #[command(alias = "rec")]
    Recommend,
}

pub use commands::*;
