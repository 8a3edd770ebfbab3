//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use taskdesk_core::views::DEFAULT_PER_PAGE;

/// taskdesk command-line client.
#[derive(Parser, Debug)]
#[command(name = "taskdesk", about = "Manage tasks on a taskdesk backend", version)]
pub struct Cli {
    /// Settings file (defaults to `~/.taskdesk/settings.json`).
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Backend base URL (overrides settings and environment).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List tasks, one page at a time.
    List {
        /// Only tasks in this category.
        #[arg(long)]
        category: Option<String>,

        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Tasks per page.
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },

    /// Show one task.
    Show {
        /// Task id.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        id: u64,
    },

    /// Create a task.
    Add {
        /// Task title.
        #[arg(long)]
        title: String,

        /// Category value (see `taskdesk categories`).
        #[arg(long)]
        category: String,
    },

    /// Change a task's title and/or category.
    Edit {
        /// Task id.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        id: u64,

        /// New title.
        #[arg(long)]
        title: Option<String>,

        /// New category.
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a task.
    Rm {
        /// Task id.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        id: u64,
    },

    /// Show task counts per category.
    Stats,

    /// List the category catalogue.
    Categories,

    /// Store the bearer token used for API requests.
    Login {
        /// Bearer token.
        #[arg(long)]
        token: String,
    },

    /// Forget the stored token.
    Logout,
}

impl Command {
    /// Whether the command talks to the backend.
    pub fn needs_backend(&self) -> bool {
        !matches!(self, Self::Categories | Self::Login { .. } | Self::Logout)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
