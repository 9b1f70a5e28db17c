//! # taskman - personal task tracker
//!
//! Records tasks with a description, category, priority (0 for none, 1-5
//! ascending) and a due time given as hours from now, and keeps them in a
//! single flat file between runs.
//!
//! ## Quick Start
//!
//! ```bash
//! taskman add "buy milk" --category errand --priority 2 --due-in 24
//! taskman add "write report" -c work -p 5 --due-in 8
//! taskman complete 2
//! taskman list
//! ```
//!
//! ## Storage
//!
//! Tasks live in `~/.taskman/tasks.txt` unless `--file` points elsewhere.
//! The file holds one task per line:
//!
//! ```text
//! id|description|category|priority|dueDateEpochSeconds|completedFlag
//! ```
//!
//! Every change rewrites the whole file through a temporary file and a
//! rename. Lines that cannot be read are skipped and reported as warnings.

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod manager;
pub mod record;
pub mod task;

use cli::{resolve_store_path, Cli};
use cmd::*;
use manager::TaskManager;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Completions never touch the task file, so the store is opened per command.
    let file = cli.file;
    let open = || TaskManager::open(resolve_store_path(file));

    match cli.command {
        Commands::Add { description, category, priority, due_in } =>
            cmd_add(&mut open(), description, category, priority, due_in),

        Commands::Edit { id, desc, category, priority, due_in } =>
            cmd_edit(&mut open(), id, desc, category, priority, due_in),

        Commands::Delete { id } => cmd_delete(&mut open(), id),

        Commands::Complete { id } => cmd_complete(&mut open(), id),

        Commands::List { pending, format } => cmd_list(&open(), pending, format),

        Commands::View { id } => cmd_view(&open(), id),

        Commands::Backup => cmd_backup(open().path()),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}
