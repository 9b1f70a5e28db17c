use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::cmd::Commands;

const DATA_DIR: &str = ".taskman";
const DEFAULT_FILE: &str = "tasks.txt";

/// Personal task tracker backed by a single flat file.
/// Storage defaults to ~/.taskman/tasks.txt or a path passed via --file.
#[derive(Parser)]
#[command(name = "taskman", version, about = "Personal task tracker")]
pub struct Cli {
    /// Path to the task file.
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Resolve the backing file, creating `~/.taskman` when it is used.
///
/// Falls back to `./tasks.txt` when no home directory is known.
pub fn resolve_store_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    let Ok(home) = std::env::var("HOME") else {
        return PathBuf::from(DEFAULT_FILE);
    };
    let data_dir = PathBuf::from(home).join(DATA_DIR);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
        std::process::exit(1);
    }
    data_dir.join(DEFAULT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ListFormat;

    #[test]
    fn test_explicit_path_wins() {
        let path = PathBuf::from("/tmp/somewhere/tasks.txt");
        assert_eq!(resolve_store_path(Some(path.clone())), path);
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "taskman", "--file", "t.txt", "add", "buy milk", "--category", "errand", "--priority",
            "2", "--due-in", "24",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("t.txt")));
        match cli.command {
            Commands::Add { description, category, priority, due_in } => {
                assert_eq!(description, "buy milk");
                assert_eq!(category, "errand");
                assert_eq!(priority, 2);
                assert_eq!(due_in, 24);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_negative_values() {
        let cli = Cli::try_parse_from([
            "taskman", "edit", "3", "--priority=-1", "--due-in=-2",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit { id, priority, due_in, desc, category } => {
                assert_eq!(id, 3);
                assert_eq!(priority, Some(-1));
                assert_eq!(due_in, Some(-2));
                assert!(desc.is_none() && category.is_none());
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["taskman", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::List { pending, format } => {
                assert!(!pending);
                assert_eq!(format, ListFormat::Table);
            }
            _ => panic!("expected list"),
        }
    }
}
